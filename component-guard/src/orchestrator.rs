//! Runs all five validators over a component and applies the default
//! install policy: any invalid result blocks.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GuardConfig;
use crate::registry::{FileRegistryStore, HashRegistryStore};
use crate::types::{Component, ComponentType, ValidationResult};
use crate::validators::{
    ComponentValidator, IntegrityOptions, IntegrityValidator, ProvenanceValidator,
    ReferenceReport, ReferenceValidator, SecurityReport, SemanticValidator, StructuralOptions,
    StructuralValidator,
};

/// Combined outcome of every validator for one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    /// Component path.
    pub path: PathBuf,
    /// Component type.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Results keyed by validator name.
    pub results: BTreeMap<String, ValidationResult>,
    /// Severity breakdown of the semantic findings.
    pub security_report: SecurityReport,
    /// URL hygiene summary.
    pub reference_report: ReferenceReport,
    /// Advisory provenance trust score.
    pub trust_score: u8,
    /// Content hash, absent for empty content.
    pub hash: Option<String>,
}

impl ComponentReport {
    /// True if any validator reported `valid == false`.
    pub fn is_blocked(&self) -> bool {
        self.results.values().any(|r| !r.valid)
    }

    /// Validators that failed, in name order.
    pub fn failed_validators(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| !r.valid)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Total errors across validators.
    pub fn error_count(&self) -> usize {
        self.results.values().map(|r| r.error_count).sum()
    }

    /// Total warnings across validators.
    pub fn warning_count(&self) -> usize {
        self.results.values().map(|r| r.warning_count).sum()
    }
}

/// Outcome of validating many components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Components validated.
    pub total: usize,
    /// Components not blocked.
    pub passed: usize,
    /// Components blocked by at least one validator.
    pub failed: usize,
    /// Components with at least one warning.
    pub with_warnings: usize,
    /// Per-component reports, in input order.
    pub reports: Vec<ComponentReport>,
}

/// Owns one of each validator and the options derived from configuration.
#[derive(Debug)]
pub struct ComponentGuard {
    config: GuardConfig,
    structural: StructuralValidator,
    semantic: SemanticValidator,
    reference: ReferenceValidator,
    integrity: IntegrityValidator,
    provenance: ProvenanceValidator,
}

impl ComponentGuard {
    /// Guard using the file registry at `config.registry_path`.
    pub fn new(config: GuardConfig) -> Self {
        let store = Arc::new(FileRegistryStore::new(&config.registry_path));
        Self::with_store(config, store)
    }

    /// Guard using a caller-supplied registry store.
    pub fn with_store(config: GuardConfig, store: Arc<dyn HashRegistryStore>) -> Self {
        Self {
            config,
            structural: StructuralValidator::new(),
            semantic: SemanticValidator::new(),
            reference: ReferenceValidator::new(),
            integrity: IntegrityValidator::new(store),
            provenance: ProvenanceValidator::new(),
        }
    }

    /// Key registry entries relative to `base_dir` instead of the working
    /// directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.integrity = self.integrity.with_base_dir(base_dir);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Validate with the configured options.
    pub fn validate(&self, component: &Component) -> ComponentReport {
        self.validate_with(component, &self.config.integrity_options())
    }

    /// Validate with explicit integrity options (e.g. an expected hash).
    pub fn validate_with(
        &self,
        component: &Component,
        integrity_options: &IntegrityOptions,
    ) -> ComponentReport {
        let structural = self
            .structural
            .validate(component, &StructuralOptions::default());
        let semantic = self
            .semantic
            .validate(component, &self.config.semantic_options());
        let reference = self
            .reference
            .validate(component, &self.config.reference_options());
        let integrity = self.integrity.validate(component, integrity_options);
        let provenance = self
            .provenance
            .validate(component, &self.config.provenance_options());

        let security_report = self.semantic.security_report(&semantic);
        let reference_report = self.reference.reference_report(&reference);
        let trust_score = self.provenance.trust_score(&provenance).unwrap_or(0);
        let hash = integrity.hash().map(str::to_string);

        let results: BTreeMap<String, ValidationResult> = [
            structural,
            semantic,
            reference,
            integrity,
            provenance,
        ]
        .into_iter()
        .map(|r| (r.validator.clone(), r))
        .collect();

        let report = ComponentReport {
            path: component.path.clone(),
            component_type: component.component_type,
            results,
            security_report,
            reference_report,
            trust_score,
            hash,
        };

        debug!(
            path = %component.path.display(),
            blocked = report.is_blocked(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            trust_score,
            "component validated"
        );
        report
    }

    /// Validate components one after another.
    pub fn validate_all(&self, components: &[Component]) -> BatchSummary {
        let reports: Vec<ComponentReport> = components.iter().map(|c| self.validate(c)).collect();

        let failed = reports.iter().filter(|r| r.is_blocked()).count();
        let with_warnings = reports.iter().filter(|r| r.warning_count() > 0).count();

        info!(
            "Validated {} components: {} passed, {} failed",
            reports.len(),
            reports.len() - failed,
            failed
        );

        BatchSummary {
            total: reports.len(),
            passed: reports.len() - failed,
            failed,
            with_warnings,
            reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistryStore;

    fn guard(config: GuardConfig) -> ComponentGuard {
        ComponentGuard::with_store(config, Arc::new(MemoryRegistryStore::new()))
            .with_base_dir("/project")
    }

    const CLEAN_AGENT: &str = "---\nname: helper\ndescription: Helps with documentation formatting tasks\ntools: Read, Grep\nmodel: sonnet\nauthor: Jane Doe\nrepository: https://github.com/acme/agents\nversion: 1.0.0\n---\n# Helper\n\n## Usage\n\nFormats docs. See https://example.com/guide for details.\n";

    #[test]
    fn test_report_has_every_validator() {
        let report = guard(GuardConfig::default())
            .validate(&Component::new(CLEAN_AGENT, "agents/helper.md", ComponentType::Agent));
        let names: Vec<&str> = report.results.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["integrity", "provenance", "reference", "semantic", "structural"]
        );
        assert!(report.hash.is_some());
    }

    #[test]
    fn test_clean_component_not_blocked() {
        let report = guard(GuardConfig::default())
            .validate(&Component::new(CLEAN_AGENT, "agents/helper.md", ComponentType::Agent));
        assert!(
            !report.is_blocked(),
            "unexpected failures: {:?}",
            report.failed_validators()
        );
        assert!(report.trust_score >= 80);
    }

    #[test]
    fn test_dangerous_command_blocked() {
        let content = "---\nname: test\ndescription: \"A valid test command for running shell checks safely\"\n---\n# Test\nrm -rf /";
        let report = guard(GuardConfig::default())
            .validate(&Component::new(content, "commands/test.md", ComponentType::Command));
        assert!(report.is_blocked());
        assert!(report.results["structural"].valid);
        assert!(report.results["semantic"].has_error("SEM_E019"));
        assert_eq!(report.failed_validators(), vec!["semantic"]);
    }

    #[test]
    fn test_strict_config_applies() {
        let content = "---\nname: roleplay\ndescription: Plays characters for storytelling sessions\ntools: Read\n---\n# Roleplay\n\nPretend you are a wizard.";
        let component = Component::new(content, "agents/roleplay.md", ComponentType::Agent);

        let lenient = guard(GuardConfig::default()).validate(&component);
        assert!(lenient.results["semantic"].valid);

        let strict = guard(GuardConfig {
            strict: true,
            ..Default::default()
        })
        .validate(&component);
        assert!(!strict.results["semantic"].valid);
        assert!(strict.is_blocked());
    }

    #[test]
    fn test_validate_all_summary() {
        let summary = guard(GuardConfig::default()).validate_all(&[
            Component::new(CLEAN_AGENT, "agents/helper.md", ComponentType::Agent),
            Component::new("", "agents/empty.md", ComponentType::Agent),
        ]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reports.len(), 2);
    }
}
