//! `cguard hash`.

use std::path::Path;

use component_guard::validators::integrity::generate_hash;
use component_guard::{Component, ComponentType, GuardResult};

/// Content hash of the file at `path`, as the integrity validator computes it.
pub fn hash_file(path: &Path) -> GuardResult<String> {
    let component = Component::from_file(path, ComponentType::Agent)?;
    Ok(generate_hash(&component.content))
}

/// Print `<hash>  <path>`.
pub fn run_hash(path: &Path) -> GuardResult<i32> {
    println!("{}  {}", hash_file(path)?, path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file_known_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.md");
        fs::write(&path, "hello world").unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_missing_file() {
        assert!(hash_file(Path::new("/nonexistent/x.md")).is_err());
    }
}
