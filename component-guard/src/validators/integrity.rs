//! Tamper and drift detection through content hashing.
//!
//! | Code | Level | Meaning |
//! |------|-------|---------|
//! | `INT_E000` | error | empty content |
//! | `INT_E001` | error | hash differs from the caller's expected hash |
//! | `INT_I001` | info | computed hash |
//! | `INT_I002` | info | no registry on record |
//! | `INT_I003` | info | component not yet in the registry |
//! | `INT_I004` | info | hash matches the registry |
//! | `INT_I005` | info | declared version differs from the registry |
//! | `INT_I006` | info | registry entry written |
//! | `INT_I007` | info | hash matches the caller's expected hash |
//! | `INT_I008` | info | registry entry exists but has no hash |
//! | `INT_W001` | warning | content changed since last recorded |
//! | `INT_W002` | warning | version is not semver |
//! | `INT_W003` | warning | registry update failed |

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use super::ComponentValidator;
use crate::registry::{
    normalize_registry_key, HashRegistry, HashRegistryStore, MemoryRegistryStore, RegistryEntry,
};
use crate::types::{Component, ResultAccumulator, ResultDetails, ValidationResult};

/// `X.Y.Z`, or the simplified `X` / `X.Y`.
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.\d+\.\d+|\d+(\.\d+)?)$").unwrap());

const SHORT_HASH_LEN: usize = 16;

/// Hex-encoded SHA-256 of `content`.
pub fn generate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn short_hash(hash: &str) -> String {
    match hash.get(..SHORT_HASH_LEN) {
        Some(prefix) if hash.len() > SHORT_HASH_LEN => format!("{}...", prefix),
        _ => hash.to_string(),
    }
}

/// Options for [`IntegrityValidator`].
#[derive(Debug, Clone, Default)]
pub struct IntegrityOptions {
    /// Record the current hash in the registry after checking.
    pub update_registry: bool,
    /// Hash the content must match.
    pub expected_hash: Option<String>,
}

/// Aggregate of a sequential batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Components validated.
    pub total: usize,
    /// Components with no errors.
    pub passed: usize,
    /// Components with at least one error.
    pub failed: usize,
    /// Components with at least one warning.
    pub warnings: usize,
    /// Per-component results, in input order.
    pub results: Vec<BatchItem>,
}

/// One entry of a [`BatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Component path as given.
    pub path: String,
    /// The integrity result.
    pub result: ValidationResult,
}

/// Hash-based integrity validator.
pub struct IntegrityValidator {
    store: Arc<dyn HashRegistryStore>,
    base_dir: PathBuf,
}

impl std::fmt::Debug for IntegrityValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrityValidator")
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

impl IntegrityValidator {
    /// Validator backed by `store`, keying entries relative to the working
    /// directory.
    pub fn new(store: Arc<dyn HashRegistryStore>) -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { store, base_dir }
    }

    /// Validator with a fresh in-memory registry.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRegistryStore::new()))
    }

    /// Key registry entries relative to `base_dir` instead.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// The registry store in use.
    pub fn store(&self) -> &Arc<dyn HashRegistryStore> {
        &self.store
    }

    /// Hex SHA-256 of `content`.
    pub fn generate_hash(&self, content: &str) -> String {
        generate_hash(content)
    }

    /// Validate each component in turn and aggregate the outcome.
    pub fn batch_validate(&self, components: &[Component], options: &IntegrityOptions) -> BatchReport {
        let results: Vec<BatchItem> = components
            .iter()
            .map(|component| BatchItem {
                path: component.path.display().to_string(),
                result: self.validate(component, options),
            })
            .collect();

        let passed = results.iter().filter(|item| item.result.valid).count();
        let warnings = results
            .iter()
            .filter(|item| item.result.warning_count > 0)
            .count();

        BatchReport {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            warnings,
            results,
        }
    }

    fn load_registry(&self) -> Option<HashRegistry> {
        match self.store.load() {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!("Failed to read hash registry, treating as absent: {}", e);
                None
            }
        }
    }

    fn check_registry(
        &self,
        acc: &mut ResultAccumulator,
        key: &str,
        hash: &str,
        version: Option<&str>,
    ) {
        let Some(registry) = self.load_registry() else {
            acc.add_info(
                "INT_I002",
                "No hash registry found; drift cannot be checked",
                json!({ "key": key }),
            );
            return;
        };

        let Some(entry) = registry.get(key) else {
            acc.add_info(
                "INT_I003",
                "Component is not yet recorded in the hash registry",
                json!({ "key": key }),
            );
            return;
        };

        match entry.hash.as_deref() {
            Some(stored) if stored == hash => acc.add_info(
                "INT_I004",
                "Hash matches registry",
                json!({ "key": key, "hash": short_hash(hash) }),
            ),
            Some(stored) => acc.add_warning(
                "INT_W001",
                "Component changed since last validation",
                json!({
                    "key": key,
                    "previousHash": short_hash(stored),
                    "currentHash": short_hash(hash),
                    "previousTimestamp": entry.timestamp,
                }),
            ),
            None => acc.add_info(
                "INT_I008",
                "Registry entry has no recorded hash",
                json!({ "key": key }),
            ),
        }

        if let (Some(stored), Some(current)) = (entry.version.as_deref(), version) {
            if stored != current {
                acc.add_info(
                    "INT_I005",
                    format!("Version changed from {} to {}", stored, current),
                    json!({ "previousVersion": stored, "currentVersion": current }),
                );
            }
        }
    }

    fn update_registry(
        &self,
        acc: &mut ResultAccumulator,
        key: &str,
        component: &Component,
        hash: &str,
    ) {
        let entry = RegistryEntry {
            hash: Some(hash.to_string()),
            component_type: Some(component.component_type.as_str().to_string()),
            version: component.version.clone(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            path: Some(component.path.display().to_string()),
        };

        match self.store.upsert(key, entry) {
            Ok(()) => acc.add_info(
                "INT_I006",
                "Hash registry updated",
                json!({ "key": key, "hash": short_hash(hash) }),
            ),
            Err(e) => {
                tracing::warn!("Failed to update hash registry for {}: {}", key, e);
                acc.add_warning(
                    "INT_W003",
                    format!("Could not update hash registry: {}", e),
                    json!({ "key": key }),
                );
            }
        }
    }
}

impl ComponentValidator for IntegrityValidator {
    type Options = IntegrityOptions;

    fn name(&self) -> &'static str {
        "integrity"
    }

    fn validate(&self, component: &Component, options: &IntegrityOptions) -> ValidationResult {
        let mut acc = ResultAccumulator::new(self.name());

        if component.is_empty() {
            acc.add_error("INT_E000", "Component content is empty", json!({}));
            return acc.into_result();
        }

        let hash = generate_hash(&component.content);
        acc.add_info(
            "INT_I001",
            format!("Content hash: {}", short_hash(&hash)),
            json!({ "hash": hash, "algorithm": "sha256" }),
        );

        if let Some(expected) = options.expected_hash.as_deref() {
            let expected = expected.trim().to_ascii_lowercase();
            if expected == hash {
                acc.add_info(
                    "INT_I007",
                    "Hash matches expected value",
                    json!({ "hash": short_hash(&hash) }),
                );
            } else {
                acc.add_error(
                    "INT_E001",
                    "Content hash does not match expected hash",
                    json!({
                        "expected": short_hash(&expected),
                        "actual": short_hash(&hash),
                        "expectedFull": expected,
                        "actualFull": hash,
                    }),
                );
            }
        }

        let key = normalize_registry_key(&component.path, &self.base_dir);
        let version = component.version.as_deref().map(str::trim);
        self.check_registry(&mut acc, &key, &hash, version);

        if let Some(version) = version.filter(|v| !v.is_empty()) {
            if !VERSION_RE.is_match(version) {
                acc.add_warning(
                    "INT_W002",
                    format!(
                        "Version '{}' is not semantic versioning; use X.Y.Z",
                        version
                    ),
                    json!({ "version": version }),
                );
            }
        }

        if options.update_registry {
            self.update_registry(&mut acc, &key, component, &hash);
        }

        let result = acc.into_result_with(ResultDetails::Integrity {
            hash,
            version: component.version.clone(),
        });
        tracing::debug!(
            path = %component.path.display(),
            errors = result.error_count,
            warnings = result.warning_count,
            "integrity validation complete"
        );
        result
    }
}
