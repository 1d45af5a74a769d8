use serde::{Deserialize, Serialize};

// ============================================================================
// Artifact Value Objects
// ============================================================================

/// A set of changes to a repository, described as a unified diff
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Change {
    pub unidiff_text: String,
    pub branch: String,
    pub repository_url: String,
    pub repository_folder: String,
}

impl Change {
    pub fn new(
        unidiff_text: impl Into<String>,
        branch: impl Into<String>,
        repository_url: impl Into<String>,
        repository_folder: impl Into<String>,
    ) -> Self {
        Self {
            unidiff_text: unidiff_text.into(),
            branch: branch.into(),
            repository_url: repository_url.into(),
            repository_folder: repository_folder.into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
