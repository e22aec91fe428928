//! Findings recorded by validators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which list a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingLevel {
    /// Blocks validity.
    Error,
    /// Reported but does not affect validity.
    Warning,
    /// Purely informational.
    Info,
}

impl std::fmt::Display for FindingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingLevel::Error => write!(f, "error"),
            FindingLevel::Warning => write!(f, "warning"),
            FindingLevel::Info => write!(f, "info"),
        }
    }
}

/// Four-level risk tag carried in the metadata of semantic and reference
/// findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    /// Low risk.
    Low,
    /// Medium risk.
    Medium,
    /// High risk.
    High,
    /// Critical risk.
    Critical,
}

impl RiskSeverity {
    /// Lowercase name, as stored in finding metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSeverity::Low => "low",
            RiskSeverity::Medium => "medium",
            RiskSeverity::High => "high",
            RiskSeverity::Critical => "critical",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskSeverity::Low),
            "medium" => Some(RiskSeverity::Medium),
            "high" => Some(RiskSeverity::High),
            "critical" => Some(RiskSeverity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reported issue.
///
/// The code is the durable contract (e.g. `SEM_E001`); the prefix always
/// names the validator that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Structured context for display.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Finding {
    /// Create a finding. Non-object metadata is wrapped under a `value` key.
    pub fn new(code: impl Into<String>, message: impl Into<String>, metadata: Value) -> Self {
        let metadata = match metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self {
            code: code.into(),
            message: message.into(),
            metadata,
        }
    }

    /// The risk severity tag, if this finding carries one.
    pub fn severity(&self) -> Option<RiskSeverity> {
        self.metadata
            .get("severity")
            .and_then(|v| v.as_str())
            .and_then(RiskSeverity::parse)
    }

    /// Code prefix before the first underscore (`SEM`, `STRUCT`, ...).
    pub fn prefix(&self) -> &str {
        self.code.split('_').next().unwrap_or(&self.code)
    }
}
