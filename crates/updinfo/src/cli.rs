use clap::Parser;

use crate::settings::Settings;

/// Show the release channels and changelogs published by an update server.
#[derive(Debug, Default, Parser)]
#[command(name = "updinfo", version)]
pub struct Args {
    /// Update info URL (`https://`, `file://` or a local path).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Channel the running build belongs to.
    #[arg(long)]
    pub channel: Option<String>,

    /// Version the running build reports.
    #[arg(long)]
    pub current_version: Option<String>,

    /// Wrap changelog text to this many columns, 0 disables wrapping.
    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub debug: bool,

    /// Print every channel instead of only the active one.
    #[arg(long)]
    pub all: bool,

    /// Only print changelog entries newer than the running build.
    #[arg(long)]
    pub new_only: bool,
}

impl Args {
    /// Command line values take precedence over the settings file.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint.clone_from(endpoint);
        }
        if let Some(channel) = &self.channel {
            settings.channel.clone_from(channel);
        }
        if self.current_version.is_some() {
            settings.current_version.clone_from(&self.current_version);
        }
        if let Some(width) = self.width {
            settings.wrap_width = width;
        }
        settings.debug_logging |= self.debug;
    }
}
