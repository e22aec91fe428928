//! Git history lookup for provenance.
//!
//! Lookups never fail loudly: a missing repository, an untracked file or any
//! libgit2 error is reported as "no metadata".

use std::path::{Path, PathBuf};

use git2::{Repository, Sort};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Last-commit information for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitMetadata {
    /// SHA of the most recent commit that changed the file.
    pub commit: String,
    /// Author name of that commit.
    pub author: String,
    /// Author date, RFC 3339.
    pub date: String,
    /// URL of the `origin` remote, if configured.
    pub remote_url: Option<String>,
}

/// Look up git metadata for `path`. `None` when unavailable for any reason.
pub fn git_metadata(path: &Path) -> Option<GitMetadata> {
    match lookup(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::debug!(path = %path.display(), "No git metadata: {}", e);
            None
        }
    }
}

fn lookup(path: &Path) -> GuardResult<Option<GitMetadata>> {
    let absolute = path.canonicalize()?;
    let start = absolute.parent().unwrap_or(&absolute);
    let repo = Repository::discover(start)?;

    let workdir = repo
        .workdir()
        .ok_or_else(|| GuardError::Git(git2::Error::from_str("bare repository")))?
        .canonicalize()?;
    let relative: PathBuf = absolute
        .strip_prefix(&workdir)
        .map_err(|_| GuardError::Git(git2::Error::from_str("path outside work tree")))?
        .to_path_buf();

    let Some(commit) = last_commit_touching(&repo, &relative)? else {
        return Ok(None);
    };

    let author = commit.author();
    let date = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
        .unwrap_or_default()
        .to_rfc3339();

    let remote_url = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string));

    Ok(Some(GitMetadata {
        commit: commit.id().to_string(),
        author: author.name().unwrap_or("").to_string(),
        date,
        remote_url,
    }))
}

/// Walk back from HEAD to the newest commit whose tree entry for `relative`
/// differs from its first parent's.
fn last_commit_touching<'r>(
    repo: &'r Repository,
    relative: &Path,
) -> GuardResult<Option<git2::Commit<'r>>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(Sort::TIME)?;

    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        let Ok(entry) = commit.tree()?.get_path(relative) else {
            continue;
        };

        let parent_id = match commit.parent(0) {
            Ok(parent) => parent.tree()?.get_path(relative).ok().map(|e| e.id()),
            Err(_) => None,
        };

        if parent_id != Some(entry.id()) {
            return Ok(Some(commit));
        }
    }

    Ok(None)
}
