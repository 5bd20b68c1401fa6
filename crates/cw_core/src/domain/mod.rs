use serde::{Deserialize, Serialize};

/// A user-selected document, encoded for transport.
///
/// Lives only in memory for the active session. `data` holds raw base64 (no data-URI prefix);
/// `mime_type` and `name` are kept exactly as declared by the caller.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub data: String,
    pub mime_type: String,
    pub name: String,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Payloads can be megabytes of base64; keep logs readable.
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisMode {
    #[default]
    Audit,
    Compare,
    Rewrite,
    Explain,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 4] = [
        AnalysisMode::Audit,
        AnalysisMode::Compare,
        AnalysisMode::Rewrite,
        AnalysisMode::Explain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Audit => "AUDIT",
            AnalysisMode::Compare => "COMPARE",
            AnalysisMode::Rewrite => "REWRITE",
            AnalysisMode::Explain => "EXPLAIN",
        }
    }

    /// Case-insensitive parse of a mode name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUDIT" => Some(Self::Audit),
            "COMPARE" => Some(Self::Compare),
            "REWRITE" => Some(Self::Rewrite),
            "EXPLAIN" => Some(Self::Explain),
            _ => None,
        }
    }

    /// Number of documents the mode operates on.
    pub fn required_file_count(&self) -> usize {
        match self {
            AnalysisMode::Compare => 2,
            AnalysisMode::Audit | AnalysisMode::Rewrite | AnalysisMode::Explain => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceStatus {
    Pass,
    Warning,
    Fail,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Pass => "PASS",
            ComplianceStatus::Warning => "WARNING",
            ComplianceStatus::Fail => "FAIL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PASS" => Some(Self::Pass),
            "WARNING" => Some(Self::Warning),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "ADDED",
            ChangeType::Removed => "REMOVED",
            ChangeType::Modified => "MODIFIED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADDED" => Some(Self::Added),
            "REMOVED" => Some(Self::Removed),
            "MODIFIED" => Some(Self::Modified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub clause_reference: String,
    pub risk_level: RiskLevel,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    pub description: String,
    pub responsible_party: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTerm {
    pub category: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub category: String,
    pub status: ComplianceStatus,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VersionDiff {
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_reference: Option<String>,
    pub description: String,
    pub impact: String,
    pub negotiation_tip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoFix {
    pub clause_reference: String,
    pub fixed_text: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

/// The structured legal-risk report produced by one analysis request.
///
/// Built only through `validate::decode_analysis`, which enforces the schema; the UI
/// consumes it verbatim and replaces it wholesale on the next analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContractAnalysis {
    pub summary: String,
    pub document_type: String,
    pub document_type_explanation: String,
    /// Opaque model output, range-checked to 0..=100.
    pub risk_score: u8,
    #[serde(default)]
    pub parties_involved: Vec<String>,
    pub risks: Vec<Risk>,
    pub obligations: Vec<Obligation>,
    pub financial_terms: Vec<FinancialTerm>,
    pub missing_clauses: Vec<String>,
    pub compliance_checks: Vec<ComplianceCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_comparison: Option<Vec<VersionDiff>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_analysis: Option<String>,
    pub general_recommendations: Vec<String>,
    pub auto_fixes: Vec<AutoFix>,
}

impl ContractAnalysis {
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::for_score(self.risk_score)
    }

    pub fn has_version_diff(&self) -> bool {
        self.version_comparison
            .as_ref()
            .is_some_and(|diffs| !diffs.is_empty())
    }

    pub fn count_risks(&self, level: RiskLevel) -> usize {
        self.risks.iter().filter(|r| r.risk_level == level).count()
    }
}

/// Coarse bucket of `riskScore` used when presenting a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn for_score(score: u8) -> Self {
        if score < 30 {
            RiskBand::Low
        } else if score < 70 {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::Moderate => "MODERATE",
            RiskBand::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}
