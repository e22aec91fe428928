//! Guard configuration.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `.claude/security/guard.yaml` under the project root
//! 3. `CGUARD_*` environment variables (e.g. `CGUARD_STRICT=true`)
//!
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GuardResult;
use crate::registry::DEFAULT_REGISTRY_PATH;
use crate::validators::{IntegrityOptions, ProvenanceOptions, ReferenceOptions, SemanticOptions};

/// Config file location relative to the project root.
pub const CONFIG_FILE: &str = ".claude/security/guard.yaml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CGUARD_";

/// Default option values for every validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Escalate suspicious semantic findings to errors.
    pub strict: bool,
    /// Treat plaintext HTTP URLs as errors.
    pub strict_https: bool,
    /// Request URL reachability checks.
    pub check_accessibility: bool,
    /// Record content hashes after validation.
    pub update_registry: bool,
    /// Warn when git history is unavailable.
    pub require_git: bool,
    /// Fail components with no declared author.
    pub require_author: bool,
    /// Hash registry location; relative paths resolve against the project root.
    pub registry_path: PathBuf,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            strict: false,
            strict_https: false,
            check_accessibility: false,
            update_registry: false,
            require_git: false,
            require_author: false,
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
        }
    }
}

impl GuardConfig {
    /// Load configuration for the current working directory.
    pub fn load() -> GuardResult<Self> {
        let root = std::env::current_dir()?;
        Self::load_from(&root)
    }

    /// Load configuration for the project at `root`.
    pub fn load_from(root: &Path) -> GuardResult<Self> {
        let config_file = root.join(CONFIG_FILE);
        debug!("Loading guard configuration (file: {})", config_file.display());

        let mut config: GuardConfig = Figment::new()
            .merge(Serialized::defaults(GuardConfig::default()))
            .merge(Yaml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
            .extract()?;

        if config.registry_path.is_relative() {
            config.registry_path = root.join(&config.registry_path);
        }
        Ok(config)
    }

    /// Semantic validator options.
    pub fn semantic_options(&self) -> SemanticOptions {
        SemanticOptions {
            strict: self.strict,
        }
    }

    /// Reference validator options.
    pub fn reference_options(&self) -> ReferenceOptions {
        ReferenceOptions {
            check_accessibility: self.check_accessibility,
            strict_https: self.strict_https,
        }
    }

    /// Integrity validator options. No expected hash is configured globally.
    pub fn integrity_options(&self) -> IntegrityOptions {
        IntegrityOptions {
            update_registry: self.update_registry,
            expected_hash: None,
        }
    }

    /// Provenance validator options.
    pub fn provenance_options(&self) -> ProvenanceOptions {
        ProvenanceOptions {
            require_git: self.require_git,
            require_author: self.require_author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = GuardConfig::load_from(temp.path()).unwrap();
        assert!(!config.strict);
        assert_eq!(
            config.registry_path,
            temp.path().join(".claude/security/component-hashes.json")
        );
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".claude/security");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("guard.yaml"),
            "strict: true\nrequire_author: true\nregistry_path: /var/lib/hashes.json\n",
        )
        .unwrap();

        let config = GuardConfig::load_from(temp.path()).unwrap();
        assert!(config.strict);
        assert!(config.require_author);
        assert!(!config.strict_https);
        assert_eq!(config.registry_path, PathBuf::from("/var/lib/hashes.json"));
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".claude/security");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("guard.yaml"), "strict_https: false\n").unwrap();

        std::env::set_var("CGUARD_STRICT_HTTPS", "true");
        let config = GuardConfig::load_from(temp.path());
        std::env::remove_var("CGUARD_STRICT_HTTPS");

        assert!(config.unwrap().strict_https);
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".claude/security");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("guard.yaml"), "strict: [not, a, bool]\n").unwrap();

        assert!(GuardConfig::load_from(temp.path()).is_err());
    }

    #[test]
    fn test_option_mapping() {
        let config = GuardConfig {
            strict: true,
            strict_https: true,
            require_git: true,
            ..Default::default()
        };
        assert!(config.semantic_options().strict);
        assert!(config.reference_options().strict_https);
        assert!(config.provenance_options().require_git);
        assert!(!config.integrity_options().update_registry);
    }
}
