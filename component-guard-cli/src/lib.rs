//! cguard - command-line surface over `component-guard`.
//!
//! ```text
//! cguard validate agents/reviewer.md --strict
//! cguard scan components/ --json
//! cguard hash commands/deploy.md
//! ```

pub mod cli;
pub mod hash;
pub mod output;
pub mod validate;

pub use cli::{CheckArgs, Cli, Commands, TypeArg};
