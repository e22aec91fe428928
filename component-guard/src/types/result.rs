//! Validation results and the accumulator every validator records into.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::finding::{Finding, FindingLevel};
use crate::validators::provenance::ProvenanceMetadata;

/// Validator-specific payload carried alongside the findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultDetails {
    /// URLs discovered by the reference validator.
    Reference {
        /// Every distinct URL found in the content.
        urls: Vec<String>,
    },
    /// Content hash computed by the integrity validator.
    Integrity {
        /// Hex-encoded SHA-256 of the content.
        hash: String,
        /// Declared component version, if any.
        version: Option<String>,
    },
    /// Attribution gathered by the provenance validator.
    Provenance {
        /// Author/repository/version with defaults applied.
        metadata: ProvenanceMetadata,
        /// Advisory 0-100 score.
        trust_score: u8,
    },
}

/// The outcome of one validator run.
///
/// `valid` is true exactly when no errors were recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Name of the validator that produced this result.
    pub validator: String,
    /// True iff `errors` is empty.
    pub valid: bool,
    /// Findings that block validity.
    pub errors: Vec<Finding>,
    /// Non-blocking findings.
    pub warnings: Vec<Finding>,
    /// Informational findings.
    pub info: Vec<Finding>,
    /// `errors.len()`.
    pub error_count: usize,
    /// `warnings.len()`.
    pub warning_count: usize,
    /// Validator-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ResultDetails>,
}

impl ValidationResult {
    /// Iterate over every finding with its level.
    pub fn findings(&self) -> impl Iterator<Item = (FindingLevel, &Finding)> {
        self.errors
            .iter()
            .map(|f| (FindingLevel::Error, f))
            .chain(self.warnings.iter().map(|f| (FindingLevel::Warning, f)))
            .chain(self.info.iter().map(|f| (FindingLevel::Info, f)))
    }

    /// Find the first finding with the given code in any list.
    pub fn find(&self, code: &str) -> Option<&Finding> {
        self.findings().map(|(_, f)| f).find(|f| f.code == code)
    }

    /// True if any list contains the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// True if the error list contains the given code.
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|f| f.code == code)
    }

    /// True if the warning list contains the given code.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|f| f.code == code)
    }

    /// True if the info list contains the given code.
    pub fn has_info(&self, code: &str) -> bool {
        self.info.iter().any(|f| f.code == code)
    }

    /// The content hash, for integrity results.
    pub fn hash(&self) -> Option<&str> {
        match &self.details {
            Some(ResultDetails::Integrity { hash, .. }) => Some(hash),
            _ => None,
        }
    }
}

/// Collects findings for a single validation run.
///
/// Recording never fails; a caller always gets a complete report.
#[derive(Debug)]
pub struct ResultAccumulator {
    validator: &'static str,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    info: Vec<Finding>,
}

impl ResultAccumulator {
    /// Create an empty accumulator for the named validator.
    pub fn new(validator: &'static str) -> Self {
        Self {
            validator,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Clear all recorded findings.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.info.clear();
    }

    /// Record an error.
    pub fn add_error(&mut self, code: &str, message: impl Into<String>, metadata: Value) {
        tracing::trace!(validator = self.validator, code, "error recorded");
        self.errors.push(Finding::new(code, message, metadata));
    }

    /// Record a warning.
    pub fn add_warning(&mut self, code: &str, message: impl Into<String>, metadata: Value) {
        tracing::trace!(validator = self.validator, code, "warning recorded");
        self.warnings.push(Finding::new(code, message, metadata));
    }

    /// Record an informational note.
    pub fn add_info(&mut self, code: &str, message: impl Into<String>, metadata: Value) {
        self.info.push(Finding::new(code, message, metadata));
    }

    /// Record at a level chosen at runtime.
    pub fn add(
        &mut self,
        level: FindingLevel,
        code: &str,
        message: impl Into<String>,
        metadata: Value,
    ) {
        match level {
            FindingLevel::Error => self.add_error(code, message, metadata),
            FindingLevel::Warning => self.add_warning(code, message, metadata),
            FindingLevel::Info => self.add_info(code, message, metadata),
        }
    }

    /// Number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Snapshot the findings as a result without consuming the accumulator.
    pub fn get_results(&self) -> ValidationResult {
        ValidationResult {
            validator: self.validator.to_string(),
            valid: self.errors.is_empty(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            info: self.info.clone(),
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
            details: None,
        }
    }

    /// Consume the accumulator into a result.
    pub fn into_result(self) -> ValidationResult {
        let error_count = self.errors.len();
        let warning_count = self.warnings.len();
        ValidationResult {
            validator: self.validator.to_string(),
            valid: error_count == 0,
            errors: self.errors,
            warnings: self.warnings,
            info: self.info,
            error_count,
            warning_count,
            details: None,
        }
    }

    /// Consume the accumulator into a result carrying a payload.
    pub fn into_result_with(self, details: ResultDetails) -> ValidationResult {
        let mut result = self.into_result();
        result.details = Some(details);
        result
    }
}
