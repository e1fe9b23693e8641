#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nodepin_platform::AppPaths;

/// Append-only log writer that reopens its file if it was deleted
/// while the process was running.
struct ReopeningLogFile {
    path: PathBuf,
    file: Option<File>,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = Self::append_to(&path)?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    fn append_to(path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() || !self.path.exists() {
            self.file = Some(Self::append_to(&self.path)?);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not available"))
    }
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Keep the newer half of `log_path` once it grows past `max_log_size`,
/// cutting at a line boundary.
fn trim_log_file_if_oversized(log_path: &Path, max_log_size: u64) {
    let Ok(metadata) = std::fs::metadata(log_path) else {
        return;
    };
    if metadata.len() <= max_log_size {
        return;
    }
    let Ok(contents) = std::fs::read(log_path) else {
        return;
    };

    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(half, |pos| half + pos + 1);
    let _ = std::fs::write(log_path, &contents[keep_from..]);
}

/// Install the global logger. Returns the log file path when file logging
/// could be set up.
pub fn init_logging(debug_enabled: bool, max_log_size: u64) -> Option<PathBuf> {
    let log_path = AppPaths::new().ok().map(|paths| {
        let _ = paths.ensure_dirs();
        paths.log_file()
    });

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("nodepin")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    loggers.push(TermLogger::new(
        LevelFilter::Debug,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let file_path = log_path.and_then(|path| {
        trim_log_file_if_oversized(&path, max_log_size);
        let writer = ReopeningLogFile::open(path.clone()).ok()?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, writer));
        Some(path)
    });

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }

    set_logging_enabled(debug_enabled);

    if debug_enabled && let Some(path) = &file_path {
        log::info!("Debug logging initialized, log file: {}", path.display());
    }

    file_path
}

pub fn set_logging_enabled(enabled: bool) {
    if enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Off);
    }
}
