//! YAML frontmatter extraction for component markdown.
//!
//! Components are markdown documents that start with a YAML block delimited
//! by `---` lines:
//!
//! ```markdown
//! ---
//! name: code-reviewer
//! description: Reviews pull requests for common mistakes
//! tools: Read, Grep
//! ---
//!
//! # Code Reviewer
//! ```
//!
//! These helpers are pure functions. Each validator calls them on its own so
//! no parse state is shared between validators.

use serde_yaml_ng::{Mapping, Value};

/// Length of the YAML frontmatter opening delimiter "---".
const YAML_DELIMITER_LEN: usize = 3;

/// Length of the closing YAML delimiter "\n---" (newline + delimiter).
const YAML_CLOSING_DELIMITER_LEN: usize = 4;

/// Result of locating the frontmatter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterSplit<'a> {
    /// Content does not start with `---`.
    Missing,
    /// Opening delimiter without a closing one.
    Unclosed,
    /// The raw YAML text and the markdown body after it.
    Present {
        /// Text between the delimiters.
        yaml: &'a str,
        /// Everything after the closing delimiter.
        body: &'a str,
    },
}

/// Result of parsing the frontmatter block.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterOutcome<'a> {
    /// Content does not start with `---`.
    Missing,
    /// Opening delimiter without a closing one.
    Unclosed,
    /// YAML syntax error.
    Invalid(String),
    /// YAML parsed but is empty or not a mapping.
    NotMapping,
    /// Parsed mapping and the body after it.
    Parsed(Mapping, &'a str),
}

/// Split content into frontmatter YAML and body.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    if !content.starts_with("---") {
        return FrontmatterSplit::Missing;
    }

    let rest = &content[YAML_DELIMITER_LEN..];
    let Some(end_idx) = rest.find("\n---") else {
        return FrontmatterSplit::Unclosed;
    };

    let yaml = rest[..end_idx].trim();
    let after = &rest[end_idx + YAML_CLOSING_DELIMITER_LEN..];
    // Drop the remainder of the closing delimiter line.
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => "",
    };

    FrontmatterSplit::Present { yaml, body }
}

/// Parse the frontmatter block into a YAML mapping.
pub fn parse_frontmatter(content: &str) -> FrontmatterOutcome<'_> {
    match split_frontmatter(content) {
        FrontmatterSplit::Missing => FrontmatterOutcome::Missing,
        FrontmatterSplit::Unclosed => FrontmatterOutcome::Unclosed,
        FrontmatterSplit::Present { yaml, body } => {
            match serde_yaml_ng::from_str::<Value>(yaml) {
                Ok(Value::Mapping(map)) if !map.is_empty() => FrontmatterOutcome::Parsed(map, body),
                Ok(_) => FrontmatterOutcome::NotMapping,
                Err(e) => FrontmatterOutcome::Invalid(e.to_string()),
            }
        }
    }
}

/// Parse the frontmatter, returning the mapping only when parsing succeeded.
pub fn frontmatter_mapping(content: &str) -> Option<Mapping> {
    match parse_frontmatter(content) {
        FrontmatterOutcome::Parsed(map, _) => Some(map),
        _ => None,
    }
}

/// The markdown body with any frontmatter removed.
///
/// When no well-formed block is present the whole content is the body.
pub fn strip_frontmatter(content: &str) -> &str {
    match split_frontmatter(content) {
        FrontmatterSplit::Present { body, .. } => body,
        _ => content,
    }
}

/// Look up a string-like scalar. Numbers and booleans are rendered to text.
pub fn scalar_field(map: &Mapping, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The `version` declared in the frontmatter, if any.
pub fn declared_version(content: &str) -> Option<String> {
    frontmatter_mapping(content)
        .and_then(|map| scalar_field(&map, "version"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
