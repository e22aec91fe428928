//! Discovery feeding batch validation.


use std::sync::Arc;

use component_guard::{
    discover_components, Component, ComponentGuard, ComponentType, GuardConfig,
    MemoryRegistryStore,
};
use tempfile::TempDir;
use test_helpers::{write_file, CLEAN_AGENT, DANGEROUS_COMMAND};

#[test]
fn test_scan_catalogue() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "agents/docs/doc-helper.md", CLEAN_AGENT);
    write_file(temp.path(), "commands/shell/nuke.md", DANGEROUS_COMMAND);
    write_file(
        temp.path(),
        "settings/statusline.json",
        "{\"name\": \"statusline\", \"description\": \"Shows the branch in the status line\"}",
    );

    let discovered = discover_components(temp.path()).unwrap();
    assert_eq!(discovered.len(), 3);
    assert_eq!(discovered[2].category, "uncategorized");
    assert_eq!(discovered[2].component.component_type, ComponentType::Setting);

    let components: Vec<Component> = discovered.into_iter().map(|d| d.component).collect();
    let guard = ComponentGuard::with_store(
        GuardConfig::default(),
        Arc::new(MemoryRegistryStore::new()),
    )
    .with_base_dir(temp.path());
    let summary = guard.validate_all(&components);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed, 2);
    assert!(summary.reports[1].is_blocked());
    assert_eq!(summary.reports[1].failed_validators(), vec!["semantic"]);
}
