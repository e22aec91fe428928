//! Persisted content-hash registry used for drift detection.
//!
//! The registry is a pretty-printed JSON object keyed by component path
//! (relative to the project root):
//!
//! ```json
//! {
//!   "components/agents/dev/reviewer.md": {
//!     "hash": "9f86d0...",
//!     "type": "agent",
//!     "version": "1.0.0",
//!     "timestamp": "2026-01-01T00:00:00Z",
//!     "path": "components/agents/dev/reviewer.md"
//!   }
//! }
//! ```
//!
//! Every entry field is optional on read so older or newer files stay
//! readable.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Default registry location, relative to the project root.
pub const DEFAULT_REGISTRY_PATH: &str = ".claude/security/component-hashes.json";

/// One registry record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    /// Hex SHA-256 of the content when it was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Component type name.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    /// Declared version at the time of recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// RFC 3339 time of recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Original component path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// The full registry, ordered by key for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl HashRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: RegistryEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegistryEntry)> {
        self.entries.iter()
    }
}

/// Storage backend for the hash registry.
pub trait HashRegistryStore: Send + Sync {
    /// Load the registry. `Ok(None)` means no registry exists yet.
    fn load(&self) -> GuardResult<Option<HashRegistry>>;

    /// Replace the stored registry.
    fn save(&self, registry: &HashRegistry) -> GuardResult<()>;

    /// Insert or replace one entry, keeping all others.
    fn upsert(&self, key: &str, entry: RegistryEntry) -> GuardResult<()> {
        let mut registry = self.load()?.unwrap_or_default();
        registry.insert(key, entry);
        self.save(&registry)
    }
}

/// Registry persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "component-hashes.json".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> GuardResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    GuardError::registry(
                        &self.path,
                        format!("failed to create directory '{}': {}", parent.display(), e),
                    )
                })?;
            }
        }
        Ok(())
    }

    /// Take the exclusive writer lock. Released when the handle drops.
    fn acquire_lock(&self) -> GuardResult<File> {
        self.ensure_parent()?;
        let lock_path = self.lock_path();
        let lock_file = File::create(&lock_path).map_err(|e| {
            GuardError::registry(
                &self.path,
                format!("failed to create lock file '{}': {}", lock_path.display(), e),
            )
        })?;
        lock_file.lock_exclusive().map_err(|e| {
            GuardError::registry(&self.path, format!("failed to acquire lock: {}", e))
        })?;
        tracing::trace!(path = %lock_path.display(), "acquired registry lock");
        Ok(lock_file)
    }
}

impl HashRegistryStore for FileRegistryStore {
    fn load(&self) -> GuardResult<Option<HashRegistry>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| GuardError::registry(&self.path, format!("failed to read: {}", e)))?;
        if content.trim().is_empty() {
            return Ok(Some(HashRegistry::new()));
        }
        let registry = serde_json::from_str(&content)
            .map_err(|e| GuardError::registry(&self.path, format!("failed to parse: {}", e)))?;
        Ok(Some(registry))
    }

    fn save(&self, registry: &HashRegistry) -> GuardResult<()> {
        self.ensure_parent()?;
        let json = serde_json::to_string_pretty(registry)?;
        fs::write(&self.path, json)
            .map_err(|e| GuardError::registry(&self.path, format!("failed to write: {}", e)))?;
        tracing::debug!(path = %self.path.display(), entries = registry.len(), "saved hash registry");
        Ok(())
    }

    fn upsert(&self, key: &str, entry: RegistryEntry) -> GuardResult<()> {
        let _lock = self.acquire_lock()?;
        let mut registry = self.load()?.unwrap_or_default();
        registry.insert(key, entry);
        self.save(&registry)
    }
}

/// In-memory registry, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryRegistryStore {
    registry: Mutex<Option<HashRegistry>>,
}

impl MemoryRegistryStore {
    /// A store with no registry yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `registry`.
    pub fn with_registry(registry: HashRegistry) -> Self {
        Self {
            registry: Mutex::new(Some(registry)),
        }
    }

    /// Snapshot the current contents.
    pub fn snapshot(&self) -> Option<HashRegistry> {
        self.registry.lock().ok().and_then(|guard| guard.clone())
    }
}

impl HashRegistryStore for MemoryRegistryStore {
    fn load(&self) -> GuardResult<Option<HashRegistry>> {
        self.registry
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| GuardError::registry("<memory>", "registry mutex poisoned"))
    }

    fn save(&self, registry: &HashRegistry) -> GuardResult<()> {
        let mut guard = self
            .registry
            .lock()
            .map_err(|_| GuardError::registry("<memory>", "registry mutex poisoned"))?;
        *guard = Some(registry.clone());
        Ok(())
    }

    fn upsert(&self, key: &str, entry: RegistryEntry) -> GuardResult<()> {
        let mut guard = self
            .registry
            .lock()
            .map_err(|_| GuardError::registry("<memory>", "registry mutex poisoned"))?;
        guard.get_or_insert_with(HashRegistry::new).insert(key, entry);
        Ok(())
    }
}

/// Registry key for `path`: relative to `base` when possible, `/`-separated,
/// with `.` segments removed.
pub fn normalize_registry_key(path: &Path, base: &Path) -> String {
    let relative = if path.is_absolute() {
        pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
    } else {
        path.to_path_buf()
    };

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            PathComponent::CurDir => None,
            PathComponent::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();

    let key = parts.join("/");
    if key.is_empty() {
        ".".to_string()
    } else {
        key
    }
}
