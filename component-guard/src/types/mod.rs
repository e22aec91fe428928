//! Core types shared by every validator.

pub mod component;
pub mod finding;
pub mod result;

pub use component::{Component, ComponentType};
pub use finding::{Finding, FindingLevel, RiskSeverity};
pub use result::{ResultAccumulator, ResultDetails, ValidationResult};
