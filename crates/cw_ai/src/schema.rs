use cw_core::validate::REQUIRED_FIELDS;
use serde_json::{json, Value};

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn enum_string(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

fn string_array(description: &str) -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
}

fn object_array(properties: Value, required: &[&str], description: Option<&str>) -> Value {
    let mut v = json!({
        "type": "ARRAY",
        "items": { "type": "OBJECT", "properties": properties, "required": required }
    });
    if let Some(d) = description {
        v["description"] = json!(d);
    }
    v
}

/// Output schema sent with every analysis request (provider OpenAPI subset).
///
/// The same shape is enforced locally by `cw_core::validate` on the way back.
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": string("A concise executive summary of the contract."),
            "documentType": string("Type of document (e.g., NDA, SLA, Employment Agreement, SaaS Contract)."),
            "documentTypeExplanation": string("One sentence on what this contract type typically covers."),
            "riskScore": {
                "type": "INTEGER",
                "description": "Overall risk from 0 (safe) to 100 (extremely risky)."
            },
            "partiesInvolved": string_array("Parties named in the contract."),
            "risks": object_array(
                json!({
                    "clauseReference": string("Section or clause number, e.g. 'Clause 4.2'."),
                    "riskLevel": enum_string(&["HIGH", "MEDIUM", "LOW"]),
                    "description": string("Why this clause is risky."),
                    "recommendation": string("How to mitigate the risk.")
                }),
                &["clauseReference", "riskLevel", "description", "recommendation"],
                None,
            ),
            "obligations": object_array(
                json!({
                    "description": { "type": "STRING" },
                    "dueDate": string("Date or timeframe, if any."),
                    "responsibleParty": { "type": "STRING" },
                    "penalty": string("Consequence of non-performance.")
                }),
                &["description", "responsibleParty"],
                None,
            ),
            "financialTerms": object_array(
                json!({
                    "category": string("e.g. Payment, Retainer, Penalty, Renewal Cost."),
                    "amount": { "type": "STRING" },
                    "details": { "type": "STRING" }
                }),
                &["category", "details"],
                None,
            ),
            "missingClauses": string_array("Standard clauses that are conspicuously absent."),
            "complianceChecks": object_array(
                json!({
                    "category": string("e.g. Data Privacy (GDPR/CCPA), IP Rights, Termination, Liability, Consumer Protection."),
                    "status": enum_string(&["PASS", "WARNING", "FAIL"]),
                    "details": string("Reason for the status.")
                }),
                &["category", "status", "details"],
                Some("Checklist of critical legal and compliance categories."),
            ),
            "versionComparison": object_array(
                json!({
                    "changeType": enum_string(&["ADDED", "REMOVED", "MODIFIED"]),
                    "clauseReference": { "type": "STRING" },
                    "description": string("What changed."),
                    "impact": string("Legal or financial impact of the change."),
                    "negotiationTip": string("How to respond to the change.")
                }),
                &["changeType", "description", "impact", "negotiationTip"],
                Some("Significant changes between the two versions (compare mode only)."),
            ),
            "comparisonAnalysis": string("Narrative summary of the changes, or the answer to the user's question."),
            "generalRecommendations": string_array("Negotiation points and general improvements."),
            "autoFixes": object_array(
                json!({
                    "clauseReference": { "type": "STRING" },
                    "originalText": string("Short excerpt of the problematic original text."),
                    "fixedText": string("Balanced, fair rewrite of the clause."),
                    "explanation": string("Why the rewrite is better.")
                }),
                &["clauseReference", "fixedText", "explanation"],
                Some("Rewrites for the 3-5 most critical or unfair clauses."),
            )
        },
        "required": REQUIRED_FIELDS
    })
}
