use chrono::{DateTime, Utc};

use crate::version_number::VersionNumber;

/// A single change within a changelog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogEntryItem {
    pub author: String,
    pub commit: String,
    pub body: String,
}

impl ChangelogEntryItem {
    #[must_use]
    pub fn new(
        author: impl Into<String>,
        commit: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            commit: commit.into(),
            body: body.into(),
        }
    }

    /// Abbreviated commit id, at most `len` characters.
    #[must_use]
    pub fn short_commit(&self, len: usize) -> &str {
        match self.commit.char_indices().nth(len) {
            Some((idx, _)) => &self.commit[..idx],
            None => &self.commit,
        }
    }
}

/// Changes that shipped in one version of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    version: VersionNumber,
    date: DateTime<Utc>,
    is_new: bool,
    items: Vec<ChangelogEntryItem>,
}

impl ChangelogEntry {
    #[must_use]
    pub fn new(
        version: VersionNumber,
        date: DateTime<Utc>,
        is_new: bool,
        items: Vec<ChangelogEntryItem>,
    ) -> Self {
        Self {
            version,
            date,
            is_new,
            items,
        }
    }

    #[must_use]
    pub fn version(&self) -> &VersionNumber {
        &self.version
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Whether this entry describes a version newer than the running build.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    #[must_use]
    pub fn items(&self) -> &[ChangelogEntryItem] {
        &self.items
    }
}
