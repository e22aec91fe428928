//! Attribution checks and the advisory trust score.
//!
//! Author, repository and version come from the component's frontmatter.
//! Git history is consulted only when the component path exists on disk.
//!
//! | Code | Level | Meaning |
//! |------|-------|---------|
//! | `PROV_E000` | error | empty content |
//! | `PROV_E001` | error | author required but missing |
//! | `PROV_I001` | info | no author declared |
//! | `PROV_I002` | info | author declared |
//! | `PROV_I003` | info | git metadata found |
//! | `PROV_I004` | info | no git metadata |
//! | `PROV_I005` | info | repository declared |
//! | `PROV_I006` | info | no version declared |
//! | `PROV_W001` | warning | author name suspiciously short |
//! | `PROV_W002` | warning | git metadata required but missing |
//! | `PROV_W003` | warning | git remote on an unrecognized platform |
//! | `PROV_W004` | warning | git remote over plaintext HTTP |
//! | `PROV_W005` | warning | declared repository on an unrecognized platform |
//! | `PROV_W006` | warning | declared repository over plaintext HTTP |
//! | `PROV_W007` | warning | version is not semver |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ComponentValidator;
use crate::frontmatter::{frontmatter_mapping, scalar_field};
use crate::git::{git_metadata, GitMetadata};
use crate::types::{Component, ResultAccumulator, ResultDetails, ValidationResult};

/// Hosting platforms whose remotes are recognized.
pub const TRUSTED_PLATFORMS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org", "codeberg.org"];

const UNKNOWN: &str = "unknown";
const UNVERSIONED: &str = "unversioned";

/// Semver with an optional pre-release tag.
static SEMVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+(-[a-zA-Z0-9.]+)?$").unwrap());

/// Options for [`ProvenanceValidator`].
#[derive(Debug, Clone, Default)]
pub struct ProvenanceOptions {
    /// Warn when no git history is available.
    pub require_git: bool,
    /// Fail when no author is declared.
    pub require_author: bool,
}

/// Attribution gathered for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceMetadata {
    /// Declared author, or `unknown`.
    pub author: String,
    /// Declared repository (or git remote), or `unknown`.
    pub repository: String,
    /// Declared version, or `unversioned`.
    pub version: String,
    /// Git history, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitMetadata>,
}

impl Default for ProvenanceMetadata {
    fn default() -> Self {
        Self {
            author: UNKNOWN.to_string(),
            repository: UNKNOWN.to_string(),
            version: UNVERSIONED.to_string(),
            git: None,
        }
    }
}

impl ProvenanceMetadata {
    /// True when an author was declared.
    pub fn has_author(&self) -> bool {
        self.author != UNKNOWN
    }

    /// True when a repository is known from frontmatter or git.
    pub fn has_repository(&self) -> bool {
        self.repository != UNKNOWN
    }

    /// True when a version was declared.
    pub fn has_version(&self) -> bool {
        self.version != UNVERSIONED
    }
}

/// Advisory 0-100 trust score.
///
/// Base 50; +15 author, +15 repository, +10 version, +10 git history;
/// -2 per warning and -10 per error.
pub fn calculate_trust_score(
    metadata: &ProvenanceMetadata,
    error_count: usize,
    warning_count: usize,
) -> u8 {
    let mut score: i64 = 50;
    if metadata.has_author() {
        score += 15;
    }
    if metadata.has_repository() {
        score += 15;
    }
    if metadata.has_version() {
        score += 10;
    }
    if metadata.git.is_some() {
        score += 10;
    }
    score -= 2 * warning_count as i64;
    score -= 10 * error_count as i64;
    score.clamp(0, 100) as u8
}

/// Host part of an `https://`, `ssh://` or scp-style (`git@host:path`) URL.
fn remote_host(remote: &str) -> Option<String> {
    if remote.contains("://") {
        return url::Url::parse(remote)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));
    }
    let after_user = remote.split_once('@').map_or(remote, |(_, rest)| rest);
    after_user
        .split_once(':')
        .map(|(host, _)| host.to_ascii_lowercase())
        .filter(|host| !host.is_empty())
}

/// True if `remote` is hosted on one of [`TRUSTED_PLATFORMS`].
pub fn is_recognized_platform(remote: &str) -> bool {
    remote_host(remote).is_some_and(|host| {
        TRUSTED_PLATFORMS
            .iter()
            .any(|p| host == *p || host.ends_with(&format!(".{}", p)))
    })
}

fn is_plain_http(remote: &str) -> bool {
    remote
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http://"))
}

/// Authorship and origin validator.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceValidator;

impl ProvenanceValidator {
    /// Create a provenance validator.
    pub fn new() -> Self {
        Self
    }

    /// The trust score carried by a result from this validator.
    pub fn trust_score(&self, result: &ValidationResult) -> Option<u8> {
        match &result.details {
            Some(ResultDetails::Provenance { trust_score, .. }) => Some(*trust_score),
            _ => None,
        }
    }

    /// Read author, repository and version from frontmatter.
    pub fn extract_metadata(&self, component: &Component) -> ProvenanceMetadata {
        let mut metadata = ProvenanceMetadata::default();
        let Some(map) = frontmatter_mapping(&component.content) else {
            return metadata;
        };

        let field = |key: &str| {
            scalar_field(&map, key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(author) = field("author") {
            metadata.author = author;
        }
        if let Some(repository) = field("repository") {
            metadata.repository = repository;
        }
        if let Some(version) = field("version") {
            metadata.version = version;
        }
        metadata
    }

    fn check_remote(
        &self,
        acc: &mut ResultAccumulator,
        remote: &str,
        unrecognized_code: &str,
        http_code: &str,
        source: &str,
    ) {
        if !is_recognized_platform(remote) {
            acc.add_warning(
                unrecognized_code,
                format!("{} '{}' is not on a recognized hosting platform", source, remote),
                json!({ "url": remote, "recognized": TRUSTED_PLATFORMS }),
            );
        }
        if is_plain_http(remote) {
            acc.add_warning(
                http_code,
                format!("{} '{}' uses insecure HTTP", source, remote),
                json!({ "url": remote }),
            );
        }
    }
}

impl ComponentValidator for ProvenanceValidator {
    type Options = ProvenanceOptions;

    fn name(&self) -> &'static str {
        "provenance"
    }

    fn validate(&self, component: &Component, options: &ProvenanceOptions) -> ValidationResult {
        let mut acc = ResultAccumulator::new(self.name());

        if component.is_empty() {
            acc.add_error("PROV_E000", "Component content is empty", json!({}));
            return acc.into_result();
        }

        let mut metadata = self.extract_metadata(component);

        // Author
        if !metadata.has_author() {
            if options.require_author {
                acc.add_error(
                    "PROV_E001",
                    "Author is required but not declared",
                    json!({ "field": "author" }),
                );
            } else {
                acc.add_info(
                    "PROV_I001",
                    "No author declared",
                    json!({ "field": "author" }),
                );
            }
        } else {
            acc.add_info(
                "PROV_I002",
                format!("Author: {}", metadata.author),
                json!({ "author": metadata.author }),
            );
            if metadata.author.chars().count() < 2 {
                acc.add_warning(
                    "PROV_W001",
                    format!("Author name '{}' is suspiciously short", metadata.author),
                    json!({ "author": metadata.author }),
                );
            }
        }

        // Git history
        let git = if component.path.exists() {
            git_metadata(&component.path)
        } else {
            None
        };
        match &git {
            Some(git) => {
                acc.add_info(
                    "PROV_I003",
                    format!("Last changed in commit {} by {}", short_sha(&git.commit), git.author),
                    json!({
                        "commit": git.commit,
                        "author": git.author,
                        "date": git.date,
                        "remote": git.remote_url,
                    }),
                );
                if let Some(remote) = git.remote_url.as_deref() {
                    self.check_remote(&mut acc, remote, "PROV_W003", "PROV_W004", "Git remote");
                }
            }
            None => {
                acc.add_info(
                    "PROV_I004",
                    "No git metadata available",
                    json!({ "path": component.path.display().to_string() }),
                );
                if options.require_git {
                    acc.add_warning(
                        "PROV_W002",
                        "Git history is required but unavailable",
                        json!({ "path": component.path.display().to_string() }),
                    );
                }
            }
        }

        // Declared repository
        if metadata.has_repository() {
            acc.add_info(
                "PROV_I005",
                format!("Repository: {}", metadata.repository),
                json!({ "repository": metadata.repository }),
            );
            let repository = metadata.repository.clone();
            self.check_remote(&mut acc, &repository, "PROV_W005", "PROV_W006", "Repository");
        } else if let Some(remote) = git.as_ref().and_then(|g| g.remote_url.clone()) {
            metadata.repository = remote;
        }

        // Version
        if metadata.has_version() {
            if !SEMVER_RE.is_match(&metadata.version) {
                acc.add_warning(
                    "PROV_W007",
                    format!(
                        "Version '{}' does not follow semantic versioning (X.Y.Z[-tag])",
                        metadata.version
                    ),
                    json!({ "version": metadata.version }),
                );
            }
        } else {
            acc.add_info("PROV_I006", "No version declared", json!({}));
        }

        metadata.git = git;
        let trust_score =
            calculate_trust_score(&metadata, acc.error_count(), acc.warning_count());

        let result = acc.into_result_with(ResultDetails::Provenance {
            metadata,
            trust_score,
        });
        tracing::debug!(
            path = %component.path.display(),
            errors = result.error_count,
            warnings = result.warning_count,
            trust_score,
            "provenance validation complete"
        );
        result
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
