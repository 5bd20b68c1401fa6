use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    AutoFix, ChangeType, ComplianceCheck, ComplianceStatus, ContractAnalysis, FinancialTerm,
    Obligation, Risk, RiskLevel, VersionDiff,
};
use crate::error::AppError;

/// Top-level fields the model must always return.
pub const REQUIRED_FIELDS: [&str; 11] = [
    "summary",
    "documentType",
    "documentTypeExplanation",
    "riskScore",
    "risks",
    "obligations",
    "financialTerms",
    "missingClauses",
    "complianceChecks",
    "generalRecommendations",
    "autoFixes",
];

pub const RISK_SCORE_MIN: i64 = 0;
pub const RISK_SCORE_MAX: i64 = 100;

// Cap on violations echoed into error details.
const MAX_REPORTED_VIOLATIONS: usize = 20;

/// One structural mismatch between a decoded response and the analysis schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

/// Parse model text as JSON and validate it into a `ContractAnalysis`.
///
/// Both unparseable text and structural mismatches surface as `DECODE_ERROR`.
pub fn decode_analysis(text: &str) -> Result<ContractAnalysis, AppError> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        AppError::decode("Model response is not valid JSON").with_details(e.to_string())
    })?;
    validate_analysis_value(&value)
}

pub fn validate_analysis_value(value: &Value) -> Result<ContractAnalysis, AppError> {
    let mut checker = Checker::default();
    let analysis = checker.analysis(value);

    if !checker.violations.is_empty() {
        let total = checker.violations.len();
        let mut details = checker
            .violations
            .iter()
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        if total > MAX_REPORTED_VIOLATIONS {
            details.push_str(&format!("; (+{} more)", total - MAX_REPORTED_VIOLATIONS));
        }
        return Err(
            AppError::decode("Model response does not match the analysis schema")
                .with_details(details),
        );
    }

    Ok(analysis)
}

/// All schema violations of a decoded value, in document order. Empty means conforming.
pub fn check_analysis_value(value: &Value) -> Vec<SchemaViolation> {
    let mut checker = Checker::default();
    checker.analysis(value);
    checker.violations
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[derive(Default)]
struct Checker {
    violations: Vec<SchemaViolation>,
}

impl Checker {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(SchemaViolation {
            path: path.into(),
            message: message.into(),
        });
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                let at = if path.is_empty() { "$" } else { path };
                self.push(at, "expected an object");
                None
            }
        }
    }

    fn required_str(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        non_empty: bool,
    ) -> String {
        let at = child(path, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(at, "required field is missing");
                String::new()
            }
            Some(Value::String(s)) => {
                if non_empty && s.trim().is_empty() {
                    self.push(at, "must not be empty");
                }
                s.clone()
            }
            Some(_) => {
                self.push(at, "expected a string");
                String::new()
            }
        }
    }

    fn optional_str(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(child(path, key), "expected a string");
                None
            }
        }
    }

    fn enum_field<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        parse: fn(&str) -> Option<T>,
        allowed: &str,
    ) -> Option<T> {
        let at = child(path, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.push(at, "required field is missing");
                None
            }
            Some(Value::String(s)) => {
                let parsed = parse(s);
                if parsed.is_none() {
                    self.push(at, format!("expected one of {allowed}, got {s:?}"));
                }
                parsed
            }
            Some(_) => {
                self.push(at, "expected a string");
                None
            }
        }
    }

    fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        required: bool,
    ) -> Option<&'v Vec<Value>> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                if required {
                    self.push(key, "required field is missing");
                }
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.push(key, "expected an array");
                None
            }
        }
    }

    fn string_list(&mut self, obj: &Map<String, Value>, key: &str, required: bool) -> Vec<String> {
        let Some(items) = self.array(obj, key, required) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => out.push(s.to_string()),
                None => self.push(format!("{key}[{i}]"), "expected a string"),
            }
        }
        out
    }

    fn risk_score(&mut self, obj: &Map<String, Value>) -> u8 {
        let Some(v) = obj.get("riskScore").filter(|v| !v.is_null()) else {
            self.push("riskScore", "required field is missing");
            return 0;
        };
        // Whole-valued floats (e.g. 45.0) count as integers.
        let n = match v {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            _ => None,
        };
        match n {
            Some(n) if (RISK_SCORE_MIN..=RISK_SCORE_MAX).contains(&n) => n as u8,
            Some(n) => {
                self.push(
                    "riskScore",
                    format!("must be within {RISK_SCORE_MIN}..={RISK_SCORE_MAX}, got {n}"),
                );
                0
            }
            None => {
                self.push("riskScore", format!("expected an integer, got {v}"));
                0
            }
        }
    }

    fn items<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        required: bool,
        mut each: impl FnMut(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Option<Vec<T>> {
        let items = self.array(obj, key, required)?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("{key}[{i}]");
            if let Some(o) = self.object(item, &path) {
                if let Some(v) = each(self, o, &path) {
                    out.push(v);
                }
            }
        }
        Some(out)
    }

    fn analysis(&mut self, value: &Value) -> ContractAnalysis {
        let empty = Map::new();
        let obj = self.object(value, "").unwrap_or(&empty);

        let summary = self.required_str(obj, "", "summary", true);
        let document_type = self.required_str(obj, "", "documentType", false);
        let document_type_explanation =
            self.required_str(obj, "", "documentTypeExplanation", false);
        let risk_score = self.risk_score(obj);
        let parties_involved = self.string_list(obj, "partiesInvolved", false);

        let risks = self
            .items(obj, "risks", true, |c, o, p| {
                let clause_reference = c.required_str(o, p, "clauseReference", true);
                let risk_level =
                    c.enum_field(o, p, "riskLevel", RiskLevel::parse, "HIGH|MEDIUM|LOW");
                let description = c.required_str(o, p, "description", true);
                let recommendation = c.required_str(o, p, "recommendation", true);
                Some(Risk {
                    clause_reference,
                    risk_level: risk_level?,
                    description,
                    recommendation,
                })
            })
            .unwrap_or_default();

        let obligations = self
            .items(obj, "obligations", true, |c, o, p| {
                Some(Obligation {
                    description: c.required_str(o, p, "description", false),
                    responsible_party: c.required_str(o, p, "responsibleParty", false),
                    due_date: c.optional_str(o, p, "dueDate"),
                    penalty: c.optional_str(o, p, "penalty"),
                })
            })
            .unwrap_or_default();

        let financial_terms = self
            .items(obj, "financialTerms", true, |c, o, p| {
                Some(FinancialTerm {
                    category: c.required_str(o, p, "category", false),
                    details: c.required_str(o, p, "details", false),
                    amount: c.optional_str(o, p, "amount"),
                })
            })
            .unwrap_or_default();

        let missing_clauses = self.string_list(obj, "missingClauses", true);

        let compliance_checks = self
            .items(obj, "complianceChecks", true, |c, o, p| {
                let category = c.required_str(o, p, "category", false);
                let status =
                    c.enum_field(o, p, "status", ComplianceStatus::parse, "PASS|WARNING|FAIL");
                let details = c.required_str(o, p, "details", false);
                Some(ComplianceCheck {
                    category,
                    status: status?,
                    details,
                })
            })
            .unwrap_or_default();

        let version_comparison = self.items(obj, "versionComparison", false, |c, o, p| {
            let change_type =
                c.enum_field(o, p, "changeType", ChangeType::parse, "ADDED|REMOVED|MODIFIED");
            let clause_reference = c.optional_str(o, p, "clauseReference");
            let description = c.required_str(o, p, "description", false);
            let impact = c.required_str(o, p, "impact", false);
            let negotiation_tip = c.required_str(o, p, "negotiationTip", false);
            Some(VersionDiff {
                change_type: change_type?,
                clause_reference,
                description,
                impact,
                negotiation_tip,
            })
        });

        let comparison_analysis = self.optional_str(obj, "", "comparisonAnalysis");
        let general_recommendations = self.string_list(obj, "generalRecommendations", true);

        let auto_fixes = self
            .items(obj, "autoFixes", true, |c, o, p| {
                Some(AutoFix {
                    clause_reference: c.required_str(o, p, "clauseReference", false),
                    fixed_text: c.required_str(o, p, "fixedText", false),
                    explanation: c.required_str(o, p, "explanation", false),
                    original_text: c.optional_str(o, p, "originalText"),
                })
            })
            .unwrap_or_default();

        ContractAnalysis {
            summary,
            document_type,
            document_type_explanation,
            risk_score,
            parties_involved,
            risks,
            obligations,
            financial_terms,
            missing_clauses,
            compliance_checks,
            version_comparison,
            comparison_analysis,
            general_recommendations,
            auto_fixes,
        }
    }
}
