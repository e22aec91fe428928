//! cguard - validate marketplace components before installation.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Blocking validation failure

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cguard::hash::run_hash;
use cguard::validate::{run_scan, run_validate};
use cguard::{Cli, Commands};
use component_guard::GuardResult;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("cguard=debug,component_guard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = result_to_exit(dispatch_command(cli));
    std::process::exit(exit_code);
}

/// Run the selected subcommand.
fn dispatch_command(cli: Cli) -> GuardResult<i32> {
    match cli.command {
        Commands::Validate {
            paths,
            component_type,
            expected_hash,
            checks,
        } => run_validate(&paths, component_type, expected_hash, &checks),
        Commands::Scan { dir, checks } => run_scan(&dir, &checks),
        Commands::Hash { path } => run_hash(&path),
    }
}

/// Convert a command result into a process exit code.
fn result_to_exit<E: std::fmt::Display>(result: Result<i32, E>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cguard::TypeArg;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_validate_defaults() {
        let cli = Cli::parse_from(["cguard", "validate", "agents/a.md"]);
        assert!(!cli.debug);
        match cli.command {
            Commands::Validate {
                paths,
                component_type,
                expected_hash,
                checks,
            } => {
                assert_eq!(paths, vec![PathBuf::from("agents/a.md")]);
                assert!(component_type.is_none());
                assert!(expected_hash.is_none());
                assert!(!checks.strict);
                assert!(!checks.json);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_flags() {
        let cli = Cli::parse_from([
            "cguard",
            "--debug",
            "validate",
            "a.md",
            "b.md",
            "--type",
            "command",
            "--strict",
            "--strict-https",
            "--check-accessibility",
            "--update-registry",
            "--require-git",
            "--require-author",
            "--expected-hash",
            "abc123",
            "--json",
        ]);
        assert!(cli.debug);
        match cli.command {
            Commands::Validate {
                paths,
                component_type,
                expected_hash,
                checks,
            } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(component_type, Some(TypeArg::Command));
                assert_eq!(expected_hash.as_deref(), Some("abc123"));
                assert!(checks.strict);
                assert!(checks.strict_https);
                assert!(checks.check_accessibility);
                assert!(checks.update_registry);
                assert!(checks.require_git);
                assert!(checks.require_author);
                assert!(checks.json);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_requires_path() {
        assert!(Cli::try_parse_from(["cguard", "validate"]).is_err());
    }

    #[test]
    fn test_cli_parsing_scan() {
        let cli = Cli::parse_from(["cguard", "scan", "components", "--json"]);
        match cli.command {
            Commands::Scan { dir, checks } => {
                assert_eq!(dir, PathBuf::from("components"));
                assert!(checks.json);
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parsing_hash() {
        let cli = Cli::parse_from(["cguard", "hash", "x.md"]);
        assert!(matches!(cli.command, Commands::Hash { .. }));
    }

    #[test]
    fn test_cli_parsing_unknown_type() {
        assert!(Cli::try_parse_from(["cguard", "validate", "a.md", "--type", "plugin"]).is_err());
    }

    #[test]
    fn test_result_to_exit() {
        assert_eq!(result_to_exit::<String>(Ok(2)), 2);
        assert_eq!(result_to_exit::<String>(Err("boom".to_string())), 1);
    }
}
