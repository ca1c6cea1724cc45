#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use updinfo_platform::AppPaths;

/// Appends to the log file, reopening it if it was removed while running.
struct ReopeningFileWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl ReopeningFileWriter {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    fn with_file<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        if guard.is_none() || !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            *guard = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            );
        }

        match guard.as_mut() {
            Some(file) => op(file),
            None => Err(io::Error::other("log file not available")),
        }
    }
}

impl Write for ReopeningFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

/// Drop the older half of the log once it outgrows `max_log_size`, cutting at
/// a line boundary.
fn trim_log_file(log_path: &Path, max_log_size: u64) {
    if let Ok(metadata) = std::fs::metadata(log_path)
        && metadata.len() > max_log_size
        && let Ok(contents) = std::fs::read(log_path)
    {
        let half = contents.len() / 2;
        let keep_from = contents[half..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(half, |pos| half + pos + 1);
        let _ = std::fs::write(log_path, &contents[keep_from..]);
    }
}

pub fn init_logging(paths: &AppPaths, debug_enabled: bool, max_log_size: u64) {
    let _ = paths.ensure_dirs();
    let log_path = paths.log_file();

    trim_log_file(&log_path, max_log_size);

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("updinfo")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    loggers.push(TermLogger::new(
        LevelFilter::Debug,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    if let Ok(writer) = ReopeningFileWriter::open(log_path.clone()) {
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, writer));
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }

    set_logging_enabled(debug_enabled);

    if debug_enabled {
        log::info!(
            "Debug logging initialized, log file: {}",
            log_path.display()
        );
    }
}

pub fn set_logging_enabled(enabled: bool) {
    if enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Off);
    }
}
