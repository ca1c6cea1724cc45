use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

const APP_DIR: &str = "updinfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Where settings and logs live on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user directories for the current platform.
    ///
    /// # Errors
    /// Returns an error when the home, config or data directory of the
    /// current user cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            let support = home.join("Library/Application Support").join(APP_DIR);
            Ok(Self {
                config_dir: support.clone(),
                data_dir: support,
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join(APP_DIR),
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join(APP_DIR),
            })
        }
    }

    /// Keep everything under a single directory, e.g. a portable install.
    #[must_use]
    pub fn in_dir(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("updinfo.log")
    }

    /// # Errors
    /// Returns an error if either directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        debug!(
            "Using config dir {} and data dir {}",
            self.config_dir.display(),
            self.data_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::AppPaths;

    #[test]
    fn file_paths_use_expected_filenames() {
        let paths = AppPaths::in_dir(Path::new("/opt/updinfo"));

        assert_eq!(
            paths.settings_file(),
            Path::new("/opt/updinfo/config/settings.json")
        );
        assert_eq!(paths.log_file(), Path::new("/opt/updinfo/data/updinfo.log"));
    }

    #[test]
    fn ensure_dirs_creates_all_directories() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let paths = AppPaths::in_dir(temp_dir.path());

        paths
            .ensure_dirs()
            .expect("ensure_dirs should create application directories");

        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
    }

    #[test]
    fn platform_paths_end_in_app_directory() {
        if let Ok(paths) = AppPaths::new() {
            assert!(paths.config_dir.ends_with("updinfo"));
            assert!(paths.data_dir.ends_with("updinfo"));
        }
    }
}
