//! Component Guard - validation pipeline for marketplace components.
//!
//! A component (agent, command, MCP server, setting or hook definition) is
//! checked by five independent validators:
//!
//! - [`StructuralValidator`]: schema, size and encoding
//! - [`SemanticValidator`]: prompt injection, leaked secrets, destructive commands
//! - [`ReferenceValidator`]: unsafe URLs and links
//! - [`IntegrityValidator`]: content hashing and drift against a hash registry
//! - [`ProvenanceValidator`]: authorship, origin and a trust score
//!
//! Each returns a [`ValidationResult`]; [`ComponentGuard`] runs all five and
//! blocks a component when any of them reports `valid == false`.
//!
//! ```no_run
//! use component_guard::{Component, ComponentGuard, ComponentType, GuardConfig};
//!
//! let guard = ComponentGuard::new(GuardConfig::default());
//! let component = Component::new("---\nname: x\n---\n# X", "agents/x.md", ComponentType::Agent);
//! let report = guard.validate(&component);
//! if report.is_blocked() {
//!     eprintln!("blocked by {:?}", report.failed_validators());
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod frontmatter;
pub mod git;
pub mod orchestrator;
pub mod registry;
pub mod types;
pub mod validators;

pub use config::GuardConfig;
pub use discovery::{discover_components, infer_component_type, DiscoveredComponent};
pub use error::{GuardError, GuardResult};
pub use orchestrator::{BatchSummary, ComponentGuard, ComponentReport};
pub use registry::{
    normalize_registry_key, FileRegistryStore, HashRegistry, HashRegistryStore,
    MemoryRegistryStore, RegistryEntry,
};
pub use types::{
    Component, ComponentType, Finding, FindingLevel, ResultAccumulator, ResultDetails,
    RiskSeverity, ValidationResult,
};
pub use validators::{
    ComponentValidator, IntegrityOptions, IntegrityValidator, ProvenanceMetadata,
    ProvenanceOptions, ProvenanceValidator, ReferenceOptions, ReferenceReport, ReferenceValidator,
    RiskLevel, SecurityReport, SemanticOptions, SemanticValidator, StructuralOptions,
    StructuralValidator,
};
