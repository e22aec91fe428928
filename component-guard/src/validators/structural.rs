//! Structural checks: is the component well-formed enough to install at all.
//!
//! | Code | Level | Check |
//! |------|-------|-------|
//! | `STRUCT_E001` | error | content is empty |
//! | `STRUCT_E002` | error | content exceeds 100 KiB |
//! | `STRUCT_E003` | error | content is not valid UTF-8 |
//! | `STRUCT_E004` | error | content contains NUL bytes |
//! | `STRUCT_E005` | error | frontmatter delimiters missing or unclosed |
//! | `STRUCT_E006` | error | required frontmatter field missing |
//! | `STRUCT_E007` | error | frontmatter (or JSON document) does not parse |
//! | `STRUCT_E008` | error | frontmatter is empty or not a mapping |
//! | `STRUCT_E009` | error | `description` is not a string |
//! | `STRUCT_E010` | error | `tools` is neither a string nor a list |
//! | `STRUCT_W001` | warning | content above 80% of the size limit |
//! | `STRUCT_W002` | warning | description shorter than 20 characters |
//! | `STRUCT_W003` | warning | description longer than 500 characters |
//! | `STRUCT_W004` | warning | `tools` is empty |
//! | `STRUCT_W005` | warning | unknown tool names |
//! | `STRUCT_W006` | warning | agent has no `model` |
//! | `STRUCT_W007` | warning | agent `model` not recognized |
//! | `STRUCT_W008` | warning | body shorter than 50 characters |
//! | `STRUCT_W009` | warning | body has no markdown headers |
//! | `STRUCT_W010` | warning | more than 20 sections |
//! | `STRUCT_I001` | info | recommended fields missing |
//! | `STRUCT_I002` | info | section count |
//! | `STRUCT_I003` | info | JSON document, frontmatter checks not applicable |

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use serde_yaml_ng::{Mapping, Value};

use super::ComponentValidator;
use crate::frontmatter::{parse_frontmatter, strip_frontmatter, FrontmatterOutcome};
use crate::types::{Component, ComponentType, ResultAccumulator, ValidationResult};

/// Hard ceiling on component size in bytes.
pub const MAX_COMPONENT_BYTES: usize = 100 * 1024;

/// Size at which a warning is raised (80% of the ceiling).
const SIZE_WARNING_BYTES: usize = MAX_COMPONENT_BYTES * 8 / 10;

const MIN_DESCRIPTION_CHARS: usize = 20;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MIN_BODY_CHARS: usize = 50;
const MAX_SECTIONS: usize = 20;

/// Tools an agent may declare.
pub const KNOWN_TOOLS: &[&str] = &[
    "Read",
    "Write",
    "Edit",
    "Bash",
    "Glob",
    "Grep",
    "WebSearch",
    "WebFetch",
    "*",
];

/// Models an agent may declare.
pub const KNOWN_MODELS: &[&str] = &[
    "sonnet",
    "opus",
    "haiku",
    "claude-3-5-sonnet",
    "claude-3-opus",
    "claude-3-haiku",
];

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+.+$").unwrap());

/// Frontmatter fields that must be present for each component type.
pub fn required_fields(component_type: ComponentType) -> &'static [&'static str] {
    match component_type {
        ComponentType::Agent => &["name", "description", "tools"],
        ComponentType::Command => &["name", "description"],
        ComponentType::Mcp => &["name", "description", "command"],
        ComponentType::Setting => &["name", "description"],
        ComponentType::Hook => &["name", "description", "trigger"],
    }
}

/// Frontmatter fields that should be present for each component type.
pub fn recommended_fields(component_type: ComponentType) -> &'static [&'static str] {
    match component_type {
        ComponentType::Agent => &["model"],
        ComponentType::Command => &["usage", "examples"],
        ComponentType::Mcp => &["args"],
        ComponentType::Setting => &["category"],
        ComponentType::Hook => &["matcher"],
    }
}

/// Options for [`StructuralValidator`]. There are none today.
#[derive(Debug, Clone, Default)]
pub struct StructuralOptions {}

/// Schema, size and encoding checks.
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    /// Create a structural validator.
    pub fn new() -> Self {
        Self
    }

    fn check_size(&self, acc: &mut ResultAccumulator, content: &str) {
        let size = content.len();
        if size > MAX_COMPONENT_BYTES {
            acc.add_error(
                "STRUCT_E002",
                format!(
                    "Component is {} bytes, exceeding the {} byte limit",
                    size, MAX_COMPONENT_BYTES
                ),
                json!({ "size": size, "limit": MAX_COMPONENT_BYTES }),
            );
        } else if size > SIZE_WARNING_BYTES {
            acc.add_warning(
                "STRUCT_W001",
                format!(
                    "Component is {} bytes, approaching the {} byte limit",
                    size, MAX_COMPONENT_BYTES
                ),
                json!({ "size": size, "limit": MAX_COMPONENT_BYTES }),
            );
        }
    }

    /// Lossily decoded input carries U+FFFD where the bytes were not UTF-8.
    fn check_encoding(&self, acc: &mut ResultAccumulator, content: &str) {
        let replacements = content.matches('\u{FFFD}').count();
        if replacements > 0 {
            acc.add_error(
                "STRUCT_E003",
                "Content is not valid UTF-8",
                json!({ "invalidSequences": replacements }),
            );
        }

        if let Some(position) = content.find('\0') {
            acc.add_error(
                "STRUCT_E004",
                "Content contains NUL bytes and appears to be binary",
                json!({ "position": position, "count": content.matches('\0').count() }),
            );
        }
    }

    /// Returns the frontmatter mapping when it parsed cleanly.
    fn check_frontmatter(&self, acc: &mut ResultAccumulator, content: &str) -> Option<Mapping> {
        match parse_frontmatter(content) {
            FrontmatterOutcome::Parsed(map, _) => Some(map),
            FrontmatterOutcome::Missing => {
                acc.add_error(
                    "STRUCT_E005",
                    "Component must start with YAML frontmatter (---)",
                    json!({ "reason": "missing" }),
                );
                None
            }
            FrontmatterOutcome::Unclosed => {
                acc.add_error(
                    "STRUCT_E005",
                    "Missing closing frontmatter delimiter (---)",
                    json!({ "reason": "unclosed" }),
                );
                None
            }
            FrontmatterOutcome::Invalid(message) => {
                acc.add_error(
                    "STRUCT_E007",
                    format!("Failed to parse YAML frontmatter: {}", message),
                    json!({ "error": message }),
                );
                None
            }
            FrontmatterOutcome::NotMapping => {
                acc.add_error(
                    "STRUCT_E008",
                    "Frontmatter is empty or not a key/value mapping",
                    json!({}),
                );
                None
            }
        }
    }

    /// JSON documents stand in for frontmatter on mcp/setting/hook components.
    fn check_json_document(&self, acc: &mut ResultAccumulator, content: &str) {
        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(serde_json::Value::Object(map)) => {
                acc.add_info(
                    "STRUCT_I003",
                    "JSON component; frontmatter checks not applicable",
                    json!({ "topLevelKeys": map.keys().collect::<Vec<_>>() }),
                );
            }
            Ok(_) => acc.add_error(
                "STRUCT_E008",
                "JSON component must be an object",
                json!({}),
            ),
            Err(e) => acc.add_error(
                "STRUCT_E007",
                format!("Failed to parse JSON component: {}", e),
                json!({ "line": e.line(), "column": e.column() }),
            ),
        }
    }

    fn check_required_fields(
        &self,
        acc: &mut ResultAccumulator,
        map: &Mapping,
        component_type: ComponentType,
    ) {
        for field in required_fields(component_type) {
            let present = map.get(*field).is_some_and(|v| !v.is_null());
            if !present {
                acc.add_error(
                    "STRUCT_E006",
                    format!("Missing required field: {}", field),
                    json!({ "field": field, "type": component_type.as_str() }),
                );
            }
        }
    }

    fn check_description(&self, acc: &mut ResultAccumulator, map: &Mapping) {
        let Some(description) = map.get("description").filter(|v| !v.is_null()) else {
            return;
        };

        let Some(description) = description.as_str() else {
            acc.add_error(
                "STRUCT_E009",
                "Field 'description' must be a string",
                json!({ "field": "description" }),
            );
            return;
        };

        let length = description.trim().chars().count();
        if length < MIN_DESCRIPTION_CHARS {
            acc.add_warning(
                "STRUCT_W002",
                format!(
                    "Description is too short ({} characters, minimum {})",
                    length, MIN_DESCRIPTION_CHARS
                ),
                json!({ "length": length, "min": MIN_DESCRIPTION_CHARS }),
            );
        } else if length > MAX_DESCRIPTION_CHARS {
            acc.add_warning(
                "STRUCT_W003",
                format!(
                    "Description is too long ({} characters, maximum {})",
                    length, MAX_DESCRIPTION_CHARS
                ),
                json!({ "length": length, "max": MAX_DESCRIPTION_CHARS }),
            );
        }
    }

    fn check_tools(&self, acc: &mut ResultAccumulator, map: &Mapping) {
        let Some(tools) = map.get("tools").filter(|v| !v.is_null()) else {
            return;
        };

        let names: Vec<String> = match tools {
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            _ => {
                acc.add_error(
                    "STRUCT_E010",
                    "Field 'tools' must be a comma-separated string or a list",
                    json!({ "field": "tools" }),
                );
                return;
            }
        };

        if names.is_empty() {
            acc.add_warning("STRUCT_W004", "Field 'tools' is empty", json!({}));
            return;
        }

        let unknown: Vec<&String> = names
            .iter()
            .filter(|name| !KNOWN_TOOLS.contains(&name.as_str()))
            .collect();
        if !unknown.is_empty() {
            acc.add_warning(
                "STRUCT_W005",
                format!(
                    "Unknown tools: {}",
                    unknown
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                json!({ "unknownTools": unknown, "knownTools": KNOWN_TOOLS }),
            );
        }
    }

    fn check_model(&self, acc: &mut ResultAccumulator, map: &Mapping) {
        match map.get("model").filter(|v| !v.is_null()) {
            None => acc.add_warning(
                "STRUCT_W006",
                "Agent does not specify a model",
                json!({ "knownModels": KNOWN_MODELS }),
            ),
            Some(model) => {
                let model = match model {
                    Value::String(s) => s.clone(),
                    other => serde_yaml_ng::to_string(other)
                        .map(|s| s.trim_end().to_string())
                        .unwrap_or_default(),
                };
                if !KNOWN_MODELS.contains(&model.as_str()) {
                    acc.add_warning(
                        "STRUCT_W007",
                        format!("Unknown model: {}", model),
                        json!({ "model": model, "knownModels": KNOWN_MODELS }),
                    );
                }
            }
        }
    }

    fn check_recommended_fields(
        &self,
        acc: &mut ResultAccumulator,
        map: &Mapping,
        component_type: ComponentType,
    ) {
        let missing: Vec<&str> = recommended_fields(component_type)
            .iter()
            .copied()
            .filter(|field| map.get(*field).is_none_or(|v| v.is_null()))
            .collect();

        if !missing.is_empty() {
            acc.add_info(
                "STRUCT_I001",
                format!("Missing recommended fields: {}", missing.join(", ")),
                json!({ "fields": missing }),
            );
        }
    }

    fn check_body(&self, acc: &mut ResultAccumulator, content: &str) {
        let body = strip_frontmatter(content).trim();

        let length = body.chars().count();
        if length < MIN_BODY_CHARS {
            acc.add_warning(
                "STRUCT_W008",
                format!(
                    "Content body is very short ({} characters, minimum {})",
                    length, MIN_BODY_CHARS
                ),
                json!({ "length": length, "min": MIN_BODY_CHARS }),
            );
        }

        let sections = HEADER_RE.find_iter(body).count();
        if sections == 0 {
            acc.add_warning(
                "STRUCT_W009",
                "Content body has no markdown headers",
                json!({}),
            );
        }

        if sections > MAX_SECTIONS {
            acc.add_warning(
                "STRUCT_W010",
                format!(
                    "Content has {} sections (more than {}); may overflow an agent's context",
                    sections, MAX_SECTIONS
                ),
                json!({ "sections": sections, "max": MAX_SECTIONS }),
            );
        }

        acc.add_info(
            "STRUCT_I002",
            format!("Content has {} sections", sections),
            json!({ "sections": sections }),
        );
    }
}

fn is_json_document(component: &Component) -> bool {
    component.component_type != ComponentType::Agent
        && component.component_type != ComponentType::Command
        && component.content.trim_start().starts_with('{')
}

impl ComponentValidator for StructuralValidator {
    type Options = StructuralOptions;

    fn name(&self) -> &'static str {
        "structural"
    }

    fn validate(&self, component: &Component, _options: &StructuralOptions) -> ValidationResult {
        let mut acc = ResultAccumulator::new(self.name());

        if component.is_empty() {
            acc.add_error(
                "STRUCT_E001",
                "Component content is empty",
                json!({ "path": component.path.display().to_string() }),
            );
            return acc.into_result();
        }

        let content = component.content.as_str();
        self.check_size(&mut acc, content);
        self.check_encoding(&mut acc, content);

        if is_json_document(component) {
            self.check_json_document(&mut acc, content);
        } else {
            if let Some(map) = self.check_frontmatter(&mut acc, content) {
                let component_type = component.component_type;
                self.check_required_fields(&mut acc, &map, component_type);
                self.check_description(&mut acc, &map);
                if component_type == ComponentType::Agent {
                    self.check_tools(&mut acc, &map);
                    self.check_model(&mut acc, &map);
                }
                self.check_recommended_fields(&mut acc, &map, component_type);
            }
            self.check_body(&mut acc, content);
        }

        let result = acc.into_result();
        tracing::debug!(
            path = %component.path.display(),
            errors = result.error_count,
            warnings = result.warning_count,
            "structural validation complete"
        );
        result
    }
}
