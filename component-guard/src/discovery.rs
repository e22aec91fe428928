//! Component discovery over the catalogue layout
//! `<root>/<type>s/<category>/<name>.(md|json)`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{GuardError, GuardResult};
use crate::types::{Component, ComponentType};

/// Category for files that sit directly in a type directory.
pub const UNCATEGORIZED: &str = "uncategorized";

/// A component found on disk with its catalogue category.
#[derive(Debug, Clone)]
pub struct DiscoveredComponent {
    /// The loaded component.
    pub component: Component,
    /// Catalogue category (directory under the type directory).
    pub category: String,
}

fn is_component_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("json")
    )
}

/// Find and load every component under `root`, sorted by path.
pub fn discover_components(root: &Path) -> GuardResult<Vec<DiscoveredComponent>> {
    if !root.is_dir() {
        return Err(GuardError::Component {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut found = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_component_file(path) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let segments: Vec<String> = relative
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();

        let Some(component_type) = segments
            .first()
            .filter(|_| segments.len() >= 2)
            .and_then(|dir| ComponentType::from_dir_name(dir))
        else {
            debug!("Skipping {}: not under a component type directory", path.display());
            continue;
        };

        let category = if segments.len() >= 3 {
            segments[1].clone()
        } else {
            UNCATEGORIZED.to_string()
        };

        match Component::from_file(path, component_type) {
            Ok(component) => found.push(DiscoveredComponent {
                component,
                category,
            }),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    found.sort_by(|a, b| a.component.path.cmp(&b.component.path));
    debug!("Discovered {} components under {}", found.len(), root.display());
    Ok(found)
}

/// Infer a component's type from its enclosing directories, falling back to
/// `agent` for markdown and `setting` for JSON.
pub fn infer_component_type(path: &Path) -> ComponentType {
    let from_dirs = path
        .ancestors()
        .skip(1)
        .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()))
        .find_map(ComponentType::from_dir_name);

    from_dirs.unwrap_or_else(|| match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ComponentType::Setting,
        _ => ComponentType::Agent,
    })
}

/// Expand CLI arguments into component files: directories are walked for
/// `.md`/`.json` files, plain files are kept as given.
pub fn collect_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(
                WalkDir::new(input)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file() && is_component_file(e.path()))
                    .map(|e| e.into_path()),
            );
        } else {
            paths.push(input.clone());
        }
    }
    paths
}
