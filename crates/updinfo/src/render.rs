use std::io::{self, Write};

use updinfo_core::{ChangelogEntry, Channel, VersionNumber, WrapCache};

const ITEM_BULLET: &str = "    * ";
const ITEM_INDENT: &str = "      ";
const COMMIT_CHARS: usize = 7;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Plain text rendering of published channels.
pub struct Renderer<'a> {
    wrap: &'a WrapCache,
    width: usize,
    build_channel: &'a str,
    build_version: Option<VersionNumber>,
    new_only: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(wrap: &'a WrapCache, width: usize, build_channel: &'a str) -> Self {
        Self {
            wrap,
            width,
            build_channel,
            build_version: None,
            new_only: false,
        }
    }

    #[must_use]
    pub fn with_build_version(mut self, version: Option<VersionNumber>) -> Self {
        self.build_version = version;
        self
    }

    /// Skip changelog entries the running build already contains.
    #[must_use]
    pub fn new_only(mut self, new_only: bool) -> Self {
        self.new_only = new_only;
        self
    }

    pub fn render_channels(&self, out: &mut impl Write, channels: &[Channel]) -> io::Result<()> {
        for (idx, channel) in channels.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            self.render_channel(out, channel)?;
        }
        Ok(())
    }

    pub fn render_channel(&self, out: &mut impl Write, channel: &Channel) -> io::Result<()> {
        if channel.description().is_empty() {
            writeln!(out, "{}", channel.name())?;
        } else {
            writeln!(out, "{} - {}", channel.name(), channel.description())?;
        }

        let latest = channel.latest_version();
        let label_width = channel
            .versions()
            .iter()
            .map(|version| version.label().chars().count())
            .max()
            .unwrap_or(0);
        for version in channel.versions() {
            write!(
                out,
                "  {:<label_width$}  {}",
                version.label(),
                version.date().format(DATE_FORMAT)
            )?;
            if version.is_current() {
                write!(out, "  (current)")?;
            }
            if latest.is_some_and(|latest| std::ptr::eq(latest, version)) {
                write!(out, "  (latest)")?;
            }
            writeln!(out)?;
        }

        if channel.name() == self.build_channel
            && let (Some(latest), Some(running)) = (latest, &self.build_version)
            && latest.number() > running
        {
            writeln!(out, "  Update available: {}", latest.label())?;
        }

        let entries: Vec<&ChangelogEntry> = match (&self.build_version, self.new_only) {
            (Some(running), true) => channel.changelog_since(running).collect(),
            _ => channel.changelog().iter().collect(),
        };
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "  Changelog")?;
        for entry in entries {
            self.render_entry(out, entry)?;
        }
        Ok(())
    }

    fn render_entry(&self, out: &mut impl Write, entry: &ChangelogEntry) -> io::Result<()> {
        write!(
            out,
            "  {} ({})",
            entry.version(),
            entry.date().format(DATE_FORMAT)
        )?;
        if entry.is_new() {
            write!(out, " [new]")?;
        }
        writeln!(out)?;

        let body_width = if self.width > ITEM_BULLET.len() {
            self.width - ITEM_BULLET.len()
        } else {
            self.width
        };
        for item in entry.items() {
            let body = self.wrap.wrapped(item, body_width);
            for (idx, line) in body.lines().enumerate() {
                let prefix = if idx == 0 { ITEM_BULLET } else { ITEM_INDENT };
                writeln!(out, "{prefix}{line}")?;
            }

            let attribution: Vec<&str> = [item.author.as_str(), item.short_commit(COMMIT_CHARS)]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect();
            if !attribution.is_empty() {
                writeln!(out, "{ITEM_INDENT}({})", attribution.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use updinfo_core::{ChangelogEntry, ChangelogEntryItem, Channel, Version, VersionNumber};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid test date")
    }

    fn stable() -> Channel {
        Channel::new(
            "stable",
            "Stable releases",
            vec![
                Version::new("1.0.0", VersionNumber::new(1, 0, 0), date(2023, 1, 1), true),
                Version::new(
                    "1.1.0 Stable",
                    VersionNumber::new(1, 1, 0),
                    date(2023, 6, 1),
                    false,
                ),
            ],
            vec![
                ChangelogEntry::new(
                    VersionNumber::new(1, 1, 0),
                    date(2023, 6, 1),
                    true,
                    vec![ChangelogEntryItem::new(
                        "alice",
                        "0123456789",
                        "Faster startup for large projects",
                    )],
                ),
                ChangelogEntry::new(
                    VersionNumber::new(1, 0, 0),
                    date(2023, 1, 1),
                    false,
                    vec![ChangelogEntryItem::new("", "", "First release")],
                ),
            ],
        )
    }

    fn render(renderer: &Renderer<'_>, channel: &Channel) -> String {
        let mut out = Vec::new();
        renderer
            .render_channel(&mut out, channel)
            .expect("rendering to memory should succeed");
        String::from_utf8(out).expect("rendered text should be utf-8")
    }

    #[test]
    fn renders_versions_update_hint_and_wrapped_changelog() {
        let wrap = WrapCache::new();
        let renderer =
            Renderer::new(&wrap, 30, "stable").with_build_version(Some(VersionNumber::new(1, 0, 0)));

        let expected = [
            "stable - Stable releases",
            "  1.0.0         2023-01-01  (current)",
            "  1.1.0 Stable  2023-06-01  (latest)",
            "  Update available: 1.1.0 Stable",
            "",
            "  Changelog",
            "  1.1.0 (2023-06-01) [new]",
            "    * Faster startup for large",
            "      projects",
            "      (alice, 0123456)",
            "  1.0.0 (2023-01-01)",
            "    * First release",
            "",
        ]
        .join("\n");
        assert_eq!(render(&renderer, &stable()), expected);
        assert_eq!(wrap.len(), 2);
    }

    #[test]
    fn new_only_skips_entries_the_build_already_has() {
        let wrap = WrapCache::new();
        let renderer = Renderer::new(&wrap, 0, "stable")
            .with_build_version(Some(VersionNumber::new(1, 0, 0)))
            .new_only(true);

        let rendered = render(&renderer, &stable());

        assert!(rendered.contains("    * Faster startup for large projects\n"));
        assert!(!rendered.contains("First release"));
    }

    #[test]
    fn other_channels_get_no_update_hint() {
        let wrap = WrapCache::new();
        let renderer =
            Renderer::new(&wrap, 80, "dev").with_build_version(Some(VersionNumber::new(1, 0, 0)));

        assert!(!render(&renderer, &stable()).contains("Update available"));
    }

    #[test]
    fn empty_channel_prints_only_its_name() {
        let wrap = WrapCache::new();
        let renderer = Renderer::new(&wrap, 80, "stable");

        assert_eq!(render(&renderer, &Channel::default()), "\n");
        assert_eq!(
            render(&renderer, &Channel::new("dev", "", Vec::new(), Vec::new())),
            "dev\n"
        );
    }

    #[test]
    fn channels_are_separated_by_blank_lines() {
        let wrap = WrapCache::new();
        let renderer = Renderer::new(&wrap, 80, "stable");
        let channels = [
            Channel::new("stable", "", Vec::new(), Vec::new()),
            Channel::new("dev", "", Vec::new(), Vec::new()),
        ];

        let mut out = Vec::new();
        renderer
            .render_channels(&mut out, &channels)
            .expect("rendering to memory should succeed");

        assert_eq!(String::from_utf8(out).expect("utf-8"), "stable\n\ndev\n");
    }
}
