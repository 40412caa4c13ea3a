//! Subscriber setup for the `vitalrs` binary
//!
//! Library code only emits `tracing` events. Whoever embeds the engine decides
//! where they go; the CLI calls [`init_logging`] once at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Where and how scoring diagnostics are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level for `vitalrs` events when `RUST_LOG` is unset
    pub level: LogLevel,

    /// Console rendering
    pub format: LogFormat,

    /// Optional JSON log file, written in addition to stderr
    pub file_path: Option<PathBuf>,

    /// Start a new file every day instead of appending to one
    pub rotation: bool,

    /// Record span enter/close and the active span list
    pub include_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Pretty,
            file_path: None,
            rotation: true,
            include_spans: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Quietest first; `-v` walks down this list
    const BY_VERBOSITY: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// The level `verbosity` steps more verbose than `self`, capped at trace
    pub fn raised_by(self, verbosity: u8) -> LogLevel {
        let start = Self::BY_VERBOSITY
            .iter()
            .position(|l| *l == self)
            .unwrap_or(1);
        let last = Self::BY_VERBOSITY.len() - 1;
        Self::BY_VERBOSITY[(start + usize::from(verbosity)).min(last)]
    }

    fn filter_directive(&self) -> String {
        format!("vitalrs={}", self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(LogLevel::Warn);
        }
        Self::BY_VERBOSITY
            .iter()
            .copied()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

/// Console rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One JSON object per event
    Json,
    /// One short line per event
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("unknown log format '{}'", s)),
        }
    }
}

/// Install the global subscriber described by `config`
///
/// Console output always goes to stderr, leaving stdout for reports. Fails if
/// a global subscriber is already set or the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.filter_directive()));

    let file = match &config.file_path {
        Some(path) => Some(file_layer(config, path)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(config))
        .with(file)
        .try_init()?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        file = ?config.file_path,
        "Logging ready"
    );

    Ok(())
}

fn console_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let spans = if config.include_spans {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    match config.format {
        LogFormat::Pretty => base.with_line_number(true).with_span_events(spans).boxed(),
        LogFormat::Compact => base.compact().with_span_events(spans).boxed(),
        LogFormat::Json => base
            .json()
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .boxed(),
    }
}

fn file_layer<S>(config: &LogConfig, path: &Path) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let writer = if config.rotation {
        let prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("vitalrs.log");
        BoxMakeWriter::new(tracing_appender::rolling::daily(dir, prefix))
    } else {
        let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        BoxMakeWriter::new(Arc::new(file))
    };

    Ok(tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_current_span(config.include_spans)
        .with_span_list(config.include_spans)
        .boxed())
}
