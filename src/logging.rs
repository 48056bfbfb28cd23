use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn,banter=info";

// Keeps the non-blocking appender alive for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogOptions {
    format: LogFormat,
    file: Option<PathBuf>,
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw.unwrap_or("pretty").trim().to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_file(raw: Option<&str>) -> Option<PathBuf> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn options_from_env() -> LogOptions {
    LogOptions {
        format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref()),
        file: parse_log_file(env::var("LOG_FILE").ok().as_deref()),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn open_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("banter.log"));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn build_writer(file: Option<&Path>) -> BoxMakeWriter {
    match file {
        Some(path) => match open_file_writer(path) {
            Ok((file_writer, guard)) => {
                let _ = LOG_GUARD.set(guard);
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            }
            Err(err) => {
                eprintln!(
                    "banter: failed to open log file '{}': {}; logging to stderr only",
                    path.display(),
                    err
                );
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    }
}

/// Initializes tracing output. Logs always go to stderr; setting LOG_FILE
/// additionally writes daily-rolled files, and LOG_FORMAT=json switches to
/// JSON lines. Initialization failure is ignored so a second call (as in
/// tests) is harmless.
pub fn init() {
    let options = options_from_env();
    let writer = build_writer(options.file.as_deref());

    let result = match options.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
    };
    let _ = result;
}
