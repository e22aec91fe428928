//! Component records submitted for validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};
use crate::frontmatter::declared_version;

/// The kinds of marketplace components that can be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// A sub-agent definition (markdown with frontmatter).
    Agent,
    /// A slash command (markdown with frontmatter).
    Command,
    /// An MCP server definition.
    Mcp,
    /// A settings fragment.
    Setting,
    /// A hook definition.
    Hook,
}

impl ComponentType {
    /// All component types, in catalogue order.
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Agent,
        ComponentType::Command,
        ComponentType::Mcp,
        ComponentType::Setting,
        ComponentType::Hook,
    ];

    /// The singular name used in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Agent => "agent",
            ComponentType::Command => "command",
            ComponentType::Mcp => "mcp",
            ComponentType::Setting => "setting",
            ComponentType::Hook => "hook",
        }
    }

    /// Map a catalogue directory name (`agents`, `mcps`, `hook`, ...) to a type.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let singular = name.strip_suffix('s').unwrap_or(&name);
        Self::ALL.into_iter().find(|t| t.as_str() == singular)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComponentType {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| GuardError::UnknownComponentType(s.to_string()))
    }
}

/// A single component submitted for validation.
///
/// The path is a logical location used for reporting and as the hash registry
/// key. It does not have to exist on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Raw textual source.
    pub content: String,
    /// Logical or file path.
    pub path: PathBuf,
    /// Component kind.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Version declared by the author, if any.
    #[serde(default)]
    pub version: Option<String>,
}

impl Component {
    /// Create an in-memory component.
    pub fn new(
        content: impl Into<String>,
        path: impl Into<PathBuf>,
        component_type: ComponentType,
    ) -> Self {
        Self {
            content: content.into(),
            path: path.into(),
            component_type,
            version: None,
        }
    }

    /// Set the declared version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Load a component from disk.
    ///
    /// Content is decoded lossily so binary files still reach the structural
    /// checks. The version is taken from the frontmatter when declared there.
    pub fn from_file(path: &Path, component_type: ComponentType) -> GuardResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| GuardError::Component {
            path: path.to_path_buf(),
            message: format!("failed to read: {}", e),
        })?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let version = declared_version(&content);

        Ok(Self {
            content,
            path: path.to_path_buf(),
            component_type,
            version,
        })
    }

    /// True when the content is empty or whitespace only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dir_name_plural_and_singular() {
        assert_eq!(ComponentType::from_dir_name("agents"), Some(ComponentType::Agent));
        assert_eq!(ComponentType::from_dir_name("mcps"), Some(ComponentType::Mcp));
        assert_eq!(ComponentType::from_dir_name("Hook"), Some(ComponentType::Hook));
        assert_eq!(ComponentType::from_dir_name("templates"), None);
    }

    #[test]
    fn test_parse_component_type() {
        assert_eq!("command".parse::<ComponentType>().unwrap(), ComponentType::Command);
        assert!("skill".parse::<ComponentType>().is_err());
    }

    #[test]
    fn test_component_serializes_type_field() {
        let component = Component::new("# hi", "agents/a.md", ComponentType::Agent);
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "agent");
    }

    #[test]
    fn test_from_file_reads_version() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("cmd.md");
        std::fs::write(&path, "---\nname: x\nversion: 1.2.0\n---\n# X\n").unwrap();

        let component = Component::from_file(&path, ComponentType::Command).unwrap();
        assert_eq!(component.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Component::from_file(Path::new("/nonexistent/x.md"), ComponentType::Agent);
        assert!(matches!(result, Err(GuardError::Component { .. })));
    }
}
