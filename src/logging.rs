//! Logger setup for the `payme` binary.
//!
//! The library itself only emits through the `log` facade. The binary reads
//! [`LogSettings`] from the environment, lets `--verbose` raise the level and
//! installs a `fern` dispatch on stderr, stdout being reserved for command
//! output.

use crate::error::{Error, Result};
use chrono::Local;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Level variable, `RUST_LOG` is read when it is unset.
pub const LEVEL_VAR: &str = "PAYME_LOG_LEVEL";
/// Directory for dated log files. `off`, `none` or empty disable the file.
pub const DIR_VAR: &str = "PAYME_LOG_DIR";

static INSTALLED: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Where and how much the binary logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// Settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup(LEVEL_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .and_then(|value| value.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info);

        let file_dir = lookup(DIR_VAR).and_then(|value| match value.trim() {
            "" | "off" | "none" => None,
            path => Some(PathBuf::from(path)),
        });

        Self { level, file_dir }
    }

    /// `-v` raises the level to debug, `-vv` to trace. An explicit higher
    /// level is kept.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let raised = match verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        self.level = self.level.max(raised);
        self
    }

    fn log_file(&self, app_name: &str) -> Option<PathBuf> {
        let date = Local::now().format("%Y_%m_%d");
        self.file_dir
            .as_ref()
            .map(|dir| dir.join(format!("{app_name}-{date}.log")))
    }
}

/// Install the global logger. Only the first call has an effect; later
/// calls report the outcome of that first attempt.
pub fn init_logging(app_name: &str, settings: &LogSettings) -> Result<()> {
    INSTALLED
        .get_or_init(|| install(app_name, settings))
        .clone()
        .map_err(Error::Logging)
}

fn install(app_name: &str, settings: &LogSettings) -> std::result::Result<(), String> {
    let mut dispatch = fern::Dispatch::new()
        .level(settings.level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    if let Some(path) = settings.log_file(app_name) {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|err| err.to_string())?;
        }
        dispatch = dispatch.chain(fern::log_file(&path).map_err(|err| err.to_string())?);
    }

    dispatch.apply().map_err(|err| err.to_string())
}
