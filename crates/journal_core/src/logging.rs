//! Process-wide file logging for the journal core.
//!
//! Log lines are `key=value` text with a stable `event=` name, written to a
//! size-rotated file set under one absolute directory. Only ids, counts and
//! durations are logged; journal titles and bodies never are.
//!
//! Logging is started once. A repeated start with the same level and
//! directory is accepted; any other combination is refused so two hosts in
//! one process cannot fight over the sink.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const FILE_BASENAME: &str = "journal_core";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_TEXT_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

impl LogSettings {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            other => {
                return Err(format!(
                    "unknown log level `{other}` (use trace, debug, info, warn or error)"
                ))
            }
        };

        let dir = dir.trim();
        if dir.is_empty() {
            return Err("log directory is empty".to_string());
        }
        let dir = Path::new(dir);
        if !dir.is_absolute() {
            return Err(format!(
                "log directory must be absolute: `{}`",
                dir.display()
            ));
        }

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// Creates the directory when missing and installs a panic hook that logs a
/// flattened, length-capped panic message.
///
/// # Errors
/// Unknown level, relative or blank directory, directory creation failure,
/// backend start failure, or logging already running with other settings.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let wanted = LogSettings::parse(level, log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start_logger(wanted.clone()))?;
    check_reinit(&active.settings, &wanted)
}

/// Active `(level, directory)`, or `None` before [`init_logging`] succeeds.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        format!(
            "cannot create log directory `{}`: {err}",
            settings.dir.display()
        )
    })?;

    let files = FileSpec::default()
        .directory(settings.dir.as_path())
        .basename(FILE_BASENAME);
    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| format!("log level `{}` rejected: {err}", settings.level))?
        .log_to_file(files)
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("log backend did not start: {err}"))?;

    hook_panics();
    info!(
        "event=core_init module=core status=ok version={} debug_build={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        cfg!(debug_assertions),
        settings.level,
        settings.dir.display()
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn check_reinit(active: &LogSettings, wanted: &LogSettings) -> Result<(), String> {
    if active == wanted {
        return Ok(());
    }
    Err(format!(
        "logging is already running (level={}, dir={}); cannot restart with level={}, dir={}",
        active.level,
        active.dir.display(),
        wanted.level,
        wanted.dir.display()
    ))
}

fn hook_panics() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            panic_text(info)
        );
        chained(info);
    }));
}

fn panic_text(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let raw = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(raw, PANIC_TEXT_LIMIT)
}

/// Flattens line breaks and caps `text` at `limit` chars, marking the cut.
fn single_line(text: &str, limit: usize) -> String {
    let mut chars = text.chars().map(|ch| match ch {
        '\n' | '\r' => ' ',
        other => other,
    });
    let mut line: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}
