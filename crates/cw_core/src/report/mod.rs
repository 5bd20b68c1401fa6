use crate::domain::{AnalysisMode, ContractAnalysis, RiskLevel};

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn or_dash(v: Option<&str>) -> &str {
    match v {
        Some(s) if !s.trim().is_empty() => s,
        _ => "-",
    }
}

/// Markdown block quote; every line gets the `> ` marker.
fn block_quote(s: &str) -> String {
    s.trim()
        .lines()
        .map(|l| format!("> {l}").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn bullet_list(out: &mut String, items: &[String], empty_line: &str) {
    if items.is_empty() {
        out.push_str(empty_line);
        out.push('\n');
        return;
    }
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

/// Render an analysis as a Markdown report.
///
/// Output is deterministic: sections appear in a fixed order and every list keeps the order the
/// model returned, so rendered reports are snapshot-testable.
pub fn render_markdown(analysis: &ContractAnalysis, mode: AnalysisMode) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Contract analysis: {}\n\n", analysis.document_type));
    out.push_str(&format!("Mode: **{}**\n\n", mode.as_str()));
    out.push_str(&format!(
        "Risk score: **{}/100** ({} risk)\n\n",
        analysis.risk_score,
        analysis.risk_band().as_str()
    ));
    if !analysis.document_type_explanation.trim().is_empty() {
        out.push_str(&format!("_{}_\n\n", analysis.document_type_explanation));
    }

    out.push_str("## Summary\n\n");
    out.push_str(&analysis.summary);
    out.push_str("\n\n");

    out.push_str("## Parties\n\n");
    bullet_list(&mut out, &analysis.parties_involved, "No parties identified.");
    out.push('\n');

    if let Some(narrative) = analysis
        .comparison_analysis
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        let heading = match mode {
            AnalysisMode::Compare => "Version assessment",
            AnalysisMode::Explain => "Answer",
            AnalysisMode::Audit | AnalysisMode::Rewrite => "Analysis",
        };
        out.push_str(&format!("## {heading}\n\n{narrative}\n\n"));
    }

    if analysis.has_version_diff() {
        out.push_str("## Version diff\n\n");
        out.push_str("| Change | Clause | Description | Impact | Negotiation tip |\n");
        out.push_str("|---|---|---|---|---|\n");
        for d in analysis.version_comparison.iter().flatten() {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                d.change_type.as_str(),
                escape_cell(or_dash(d.clause_reference.as_deref())),
                escape_cell(&d.description),
                escape_cell(&d.impact),
                escape_cell(&d.negotiation_tip)
            ));
        }
        out.push('\n');
    }

    out.push_str("## Risks\n\n");
    out.push_str(&format!(
        "High: **{}** | Medium: **{}** | Low: **{}**\n\n",
        analysis.count_risks(RiskLevel::High),
        analysis.count_risks(RiskLevel::Medium),
        analysis.count_risks(RiskLevel::Low)
    ));
    if analysis.risks.is_empty() {
        out.push_str("No risks identified.\n\n");
    }
    for r in &analysis.risks {
        out.push_str(&format!(
            "### [{}] {}\n\n{}\n\n> Recommendation: {}\n\n",
            r.risk_level.as_str(),
            r.clause_reference,
            r.description,
            r.recommendation
        ));
    }

    out.push_str("## Obligations\n\n");
    if analysis.obligations.is_empty() {
        out.push_str("No obligations identified.\n\n");
    } else {
        out.push_str("| Obligation | Responsible party | Due | Penalty |\n");
        out.push_str("|---|---|---|---|\n");
        for o in &analysis.obligations {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&o.description),
                escape_cell(&o.responsible_party),
                escape_cell(or_dash(o.due_date.as_deref())),
                escape_cell(or_dash(o.penalty.as_deref()))
            ));
        }
        out.push('\n');
    }

    out.push_str("## Financial terms\n\n");
    if analysis.financial_terms.is_empty() {
        out.push_str("No financial terms identified.\n\n");
    } else {
        out.push_str("| Category | Amount | Details |\n");
        out.push_str("|---|---|---|\n");
        for t in &analysis.financial_terms {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&t.category),
                escape_cell(or_dash(t.amount.as_deref())),
                escape_cell(&t.details)
            ));
        }
        out.push('\n');
    }

    out.push_str("## Compliance checklist\n\n");
    if analysis.compliance_checks.is_empty() {
        out.push_str("No compliance checks returned.\n");
    }
    for c in &analysis.compliance_checks {
        out.push_str(&format!(
            "- **{}** {}: {}\n",
            c.status.as_str(),
            c.category,
            c.details
        ));
    }
    out.push('\n');

    out.push_str("## Missing clauses\n\n");
    bullet_list(&mut out, &analysis.missing_clauses, "None detected.");
    out.push('\n');

    out.push_str("## Recommendations\n\n");
    bullet_list(
        &mut out,
        &analysis.general_recommendations,
        "No recommendations returned.",
    );
    out.push('\n');

    out.push_str("## Suggested rewrites\n\n");
    if analysis.auto_fixes.is_empty() {
        out.push_str("No rewrites suggested.\n");
    }
    for f in &analysis.auto_fixes {
        out.push_str(&format!("### {}\n\n", f.clause_reference));
        if let Some(original) = f.original_text.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push_str(&format!("Original:\n\n{}\n\n", block_quote(original)));
        }
        out.push_str(&format!(
            "Rewrite:\n\n{}\n\nWhy: {}\n\n",
            block_quote(&f.fixed_text),
            f.explanation
        ));
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push('\n');
    out
}
