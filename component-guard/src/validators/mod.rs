//! The five component validators.
//!
//! Each validator inspects one component on its own and returns a complete
//! [`ValidationResult`]. Validators never depend on each other's output; an
//! orchestrator decides the overall policy.

pub mod integrity;
pub mod provenance;
pub mod reference;
pub mod semantic;
pub mod structural;

pub use integrity::{BatchReport, IntegrityOptions, IntegrityValidator};
pub use provenance::{ProvenanceMetadata, ProvenanceOptions, ProvenanceValidator};
pub use reference::{ReferenceOptions, ReferenceReport, ReferenceValidator};
pub use semantic::{RiskLevel, SecurityReport, SemanticOptions, SemanticValidator};
pub use structural::{StructuralOptions, StructuralValidator};

use crate::types::{Component, ValidationResult};

/// A component validator.
pub trait ComponentValidator {
    /// Per-call policy toggles.
    type Options: Default;

    /// Short name used in reports (`structural`, `semantic`, ...).
    fn name(&self) -> &'static str;

    /// Validate a component. Never fails; problems become findings.
    fn validate(&self, component: &Component, options: &Self::Options) -> ValidationResult;
}

/// Line and column (both 1-based) of a byte offset in `content`.
pub(crate) fn line_and_column(content: &str, index: usize) -> (usize, usize) {
    let index = index.min(content.len());
    let before = &content[..floor_char_boundary(content, index)];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Text around a match, `radius` bytes on each side, clamped to char boundaries.
pub(crate) fn context_window(content: &str, start: usize, end: usize, radius: usize) -> String {
    let from = floor_char_boundary(content, start.saturating_sub(radius));
    let to = ceil_char_boundary(content, (end + radius).min(content.len()));
    content[from..to].to_string()
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column_first_line() {
        assert_eq!(line_and_column("abc<script>", 3), (1, 4));
    }

    #[test]
    fn test_line_and_column_later_line() {
        let content = "line one\nline two\n  <iframe>";
        let idx = content.find("<iframe").unwrap();
        assert_eq!(line_and_column(content, idx), (3, 3));
    }

    #[test]
    fn test_context_window_clamps() {
        let content = "short";
        assert_eq!(context_window(content, 1, 3, 50), "short");
    }

    #[test]
    fn test_context_window_multibyte() {
        let content = "ééééé target ééééé";
        let start = content.find("target").unwrap();
        let window = context_window(content, start, start + 6, 3);
        assert!(window.contains("target"));
    }
}
