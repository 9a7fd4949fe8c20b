//! Directory rules: which markup belongs to which document path.

use serde::{Deserialize, Serialize};

/// Directory path that matches any document not claimed by another rule.
pub const WILDCARD: &str = "*";

/// Path separator used by document paths.
pub const SEPARATOR: char = '/';

/// One directory rule. Order within the owning list is its priority.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryMapping {
    /// Opaque identifier, unique within a configuration.
    pub id: String,
    /// Literal path prefix, or [`WILDCARD`].
    pub directory_path: String,
    /// Raw markup rendered for documents under `directory_path`.
    pub content: String,
}

impl DirectoryMapping {
    /// Create a new mapping.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        directory_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            directory_path: directory_path.into(),
            content: content.into(),
        }
    }

    /// Returns true if this is the fallback rule.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.directory_path == WILDCARD
    }

    /// Returns true if `path` lies under this rule's directory.
    ///
    /// Wildcard rules never match here; they are only a fallback.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        !self.is_wildcard() && path_matches(path, &self.directory_path)
    }
}

/// Test whether `path` lies under `directory`, on segment boundaries.
///
/// `Goals` matches `Goals/x.md` but neither `GoalsAndMore/x.md` nor
/// `goals/x.md`. An empty directory matches nothing.
#[must_use]
pub fn path_matches(path: &str, directory: &str) -> bool {
    if directory.is_empty() {
        return false;
    }

    let trimmed = directory.trim_end_matches(SEPARATOR);
    let mut prefix = String::with_capacity(trimmed.len() + 1);
    prefix.push_str(trimmed);
    prefix.push(SEPARATOR);

    path.starts_with(&prefix)
}

/// Resolve the markup bound to `path`.
///
/// The first non-wildcard rule (in list order) whose directory contains
/// `path` wins, even when a later rule is more specific. Without such a
/// rule the wildcard's content is returned; if several wildcards exist the
/// last one listed is used.
#[must_use]
pub fn resolve<'a>(path: &str, mappings: &'a [DirectoryMapping]) -> Option<&'a str> {
    let mut fallback = None;

    for mapping in mappings {
        if mapping.is_wildcard() {
            fallback = Some(mapping.content.as_str());
            continue;
        }
        if mapping.matches(path) {
            return Some(mapping.content.as_str());
        }
    }

    fallback
}
