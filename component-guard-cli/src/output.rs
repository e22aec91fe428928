//! Table rendering for validation reports.

use comfy_table::{presets::UTF8_FULL, Table};
use component_guard::{BatchSummary, ComponentReport, FindingLevel};

/// Maximum message length in finding tables before truncation.
const MAX_MESSAGE_LENGTH: usize = 80;

/// Status label for a report.
pub fn status_label(report: &ComponentReport) -> &'static str {
    if report.is_blocked() {
        "✗ BLOCKED"
    } else if report.warning_count() > 0 {
        "⚠ WARN"
    } else {
        "✓ PASS"
    }
}

/// Per-validator summary followed by every error and warning.
pub fn render_report(report: &ComponentReport) -> String {
    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL);
    summary.set_header(vec!["Validator", "Valid", "Errors", "Warnings", "Info"]);
    for (name, result) in &report.results {
        summary.add_row(vec![
            name.clone(),
            if result.valid { "yes" } else { "no" }.to_string(),
            result.error_count.to_string(),
            result.warning_count.to_string(),
            result.info.len().to_string(),
        ]);
    }

    let mut out = format!(
        "{} ({}) {}\nrisk: {}  trust: {}/100  https: {}%\n{}\n",
        report.path.display(),
        report.component_type,
        status_label(report),
        report.security_report.risk_level,
        report.trust_score,
        report.reference_report.https_percentage,
        summary
    );

    let mut findings = Table::new();
    findings.load_preset(UTF8_FULL);
    findings.set_header(vec!["Level", "Code", "Message"]);
    let mut any = false;
    for result in report.results.values() {
        for (level, finding) in result.findings() {
            let label = match level {
                FindingLevel::Error => "error",
                FindingLevel::Warning => "warning",
                FindingLevel::Info => continue,
            };
            any = true;
            findings.add_row(vec![
                label.to_string(),
                finding.code.clone(),
                truncate(&finding.message, MAX_MESSAGE_LENGTH),
            ]);
        }
    }
    if any {
        out.push_str(&findings.to_string());
        out.push('\n');
    }
    out
}

/// One row per component plus the totals line.
pub fn render_summary(summary: &BatchSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Component", "Type", "Status", "Errors", "Warnings", "Trust"]);
    for report in &summary.reports {
        table.add_row(vec![
            report.path.display().to_string(),
            report.component_type.to_string(),
            status_label(report).to_string(),
            report.error_count().to_string(),
            report.warning_count().to_string(),
            report.trust_score.to_string(),
        ]);
    }
    format!(
        "{}\n\n{} component(s): {} passed, {} failed, {} with warnings",
        table, summary.total, summary.passed, summary.failed, summary.with_warnings
    )
}

/// Truncate to `max_len` characters with an ellipsis.
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_guard::{Component, ComponentGuard, ComponentType, GuardConfig, MemoryRegistryStore};
    use std::sync::Arc;

    fn report(content: &str) -> ComponentReport {
        ComponentGuard::with_store(GuardConfig::default(), Arc::new(MemoryRegistryStore::new()))
            .validate(&Component::new(content, "commands/x.md", ComponentType::Command))
    }

    #[test]
    fn test_blocked_report_lists_errors() {
        let rendered = render_report(&report("---\nname: x\n---\n# X\nrm -rf /"));
        assert!(rendered.contains("BLOCKED"));
        assert!(rendered.contains("SEM_E019"));
    }

    #[test]
    fn test_summary_totals_line() {
        let guard =
            ComponentGuard::with_store(GuardConfig::default(), Arc::new(MemoryRegistryStore::new()));
        let summary = guard.validate_all(&[Component::new("", "a.md", ComponentType::Agent)]);
        let rendered = render_summary(&summary);
        assert!(rendered.contains("1 component(s): 0 passed, 1 failed"));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ééééé", 4), "é...");
        assert_eq!(truncate("short", 10), "short");
    }
}
