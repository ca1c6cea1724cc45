use log::debug;
use updinfo_backend::{DeserializeError, WireChangelogEntry, WireChannel, WireVersion};

use super::BuildMarker;
use super::changelog::{ChangelogEntry, ChangelogEntryItem};
use super::version::Version;
use crate::version_number::{VersionNumber, VersionParseError};

/// A named release track. Versions and changelog keep the server's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    name: String,
    description: String,
    versions: Vec<Version>,
    changelog: Vec<ChangelogEntry>,
}

impl Channel {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        versions: Vec<Version>,
        changelog: Vec<ChangelogEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            versions,
            changelog,
        }
    }

    pub(crate) fn from_wire(
        wire: WireChannel,
        build: &BuildMarker,
    ) -> Result<Self, DeserializeError> {
        let WireChannel {
            name,
            description,
            versions,
            changelog,
        } = wire;

        let mut current_claimed = !build.is_channel(&name);
        let versions = versions
            .into_iter()
            .map(|record| {
                let WireVersion {
                    version,
                    name: label,
                    date,
                } = record;
                let number = parse_number(&name, &version)?;
                let is_current = !current_claimed && build.is_running(&number);
                current_claimed |= is_current;
                Ok(Version::new(label.unwrap_or(version), number, date, is_current))
            })
            .collect::<Result<Vec<_>, DeserializeError>>()?;

        let changelog = changelog
            .into_iter()
            .map(|record| {
                let WireChangelogEntry {
                    version,
                    date,
                    items,
                } = record;
                let number = parse_number(&name, &version)?;
                let is_new = build.is_older_than(&number);
                let items = items
                    .into_iter()
                    .map(|item| ChangelogEntryItem::new(item.author, item.commit, item.body))
                    .collect();
                Ok(ChangelogEntry::new(number, date, is_new, items))
            })
            .collect::<Result<Vec<_>, DeserializeError>>()?;

        debug!(
            "Built channel {name}: {} versions, {} changelog entries",
            versions.len(),
            changelog.len()
        );

        Ok(Self {
            name,
            description,
            versions,
            changelog,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    #[must_use]
    pub fn changelog(&self) -> &[ChangelogEntry] {
        &self.changelog
    }

    /// Version with the greatest number; the first declared wins a tie.
    #[must_use]
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.iter().fold(None, |latest, candidate| match latest {
            Some(latest) if candidate.number() <= latest.number() => Some(latest),
            _ => Some(candidate),
        })
    }

    #[must_use]
    pub fn current_version(&self) -> Option<&Version> {
        self.versions.iter().find(|version| version.is_current())
    }

    /// Changelog entries strictly newer than `number`, in declared order.
    pub fn changelog_since<'a>(
        &'a self,
        number: &'a VersionNumber,
    ) -> impl Iterator<Item = &'a ChangelogEntry> + 'a {
        self.changelog
            .iter()
            .filter(move |entry| entry.version() > number)
    }
}

fn parse_number(channel: &str, value: &str) -> Result<VersionNumber, DeserializeError> {
    value
        .parse::<VersionNumber>()
        .map_err(|error: VersionParseError| DeserializeError::InvalidVersion {
            channel: channel.to_string(),
            value: value.to_string(),
            details: error.to_string(),
        })
}
