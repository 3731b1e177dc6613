//! Logging infrastructure for appconf.
//!
//! Library code logs through the `log` facade. This module provides:
//!
//! - [`LogLevel`], shared by the CLI flags and the `log_level` option
//! - [`build_logging_config`], which derives a complete [`LoggingConfig`]
//!   from a built configuration
//! - [`build_subscriber`] and [`install`], which turn a [`LoggingConfig`]
//!   into `tracing-subscriber` layers, one per handler
//! - [`init_logger`], the CLI's entry point

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Environment variable consulted by [`init_logger`].
pub const LOG_LEVEL_ENV: &str = "APPCONF_LOG_LEVEL";

/// Name of the compliance logger.
pub const COMPLIANCE_LOGGER: &str = "COMPLIANCE";

/// File the compliance handler writes to.
pub const COMPLIANCE_LOG_FILE: &str = "compliance.log";

/// Logging level.
///
/// Levels are ordered from least verbose (Error) to most verbose (Trace).
///
/// # Examples
///
/// ```
/// use appconf::LogLevel;
///
/// assert!(LogLevel::Warn < LogLevel::Debug);
/// assert_eq!(LogLevel::parse("WARNING").unwrap(), LogLevel::Warn);
/// assert_eq!(LogLevel::Info.to_string(), "info");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, clap::ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Informational messages too.
    Info,
    /// Debug messages too.
    Debug,
    /// Everything.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Case-insensitive; `warning` and `critical` are accepted as spelled in
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "error" | "critical" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The matching subscriber filter.
    #[must_use]
    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// How a handler renders records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `LEVEL target: message`
    Stack,
    /// `timestamp LEVEL target: message`
    Brief,
}

/// Where a handler writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerTarget {
    /// Standard error.
    Stderr,
    /// Standard output.
    Stdout,
    /// A file, appended to.
    File(PathBuf),
}

/// One output handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Output target.
    pub target: HandlerTarget,
    /// Record format.
    pub format: LogFormat,
    /// Minimum level written.
    pub level: LogLevel,
}

/// A logger: a level and the handlers it writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Minimum level accepted.
    pub level: LogLevel,
    /// Handler names.
    pub handlers: Vec<String>,
}

/// A complete logging setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// The root logger, which sees every record.
    pub root: LoggerConfig,
    /// Named loggers, matched against record targets by prefix.
    pub loggers: BTreeMap<String, LoggerConfig>,
    /// Handlers by name.
    pub handlers: BTreeMap<String, HandlerConfig>,
}

/// The options that shape the logging setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Level of the console handler.
    pub log_level: LogLevel,
    /// `stdout`, a file path, or `None` for standard error.
    pub log_destination: Option<String>,
    /// Whether the compliance log is enabled.
    pub compliance: bool,
    /// Extra log file for daemonized processes.
    pub daemon_log: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Debug,
            log_destination: None,
            compliance: false,
            daemon_log: None,
        }
    }
}

impl LoggingOptions {
    /// Read the logging options of a built configuration.
    ///
    /// Uses the `log_level`, `log_destination` and `enable_beta_gdpr`
    /// options. `daemon_log` usually comes from the application's
    /// `<PREFIX>_DAEMON_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `log_level` is not a known level.
    pub fn from_config(config: &AppConfig, daemon_log: Option<PathBuf>) -> Result<Self> {
        let log_level = match config.value("log_level").or_else(|| config.get("log_level")) {
            Some(value) if !value.is_null() => LogLevel::parse(&value.to_string())
                .map_err(|reason| Error::invalid_value("log_level", reason))?,
            _ => LogLevel::Debug,
        };
        let log_destination = config
            .get("log_destination")
            .and_then(crate::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let compliance = config
            .bool_value("enable_beta_gdpr")
            .unwrap_or_else(|| config.get_bool("enable_beta_gdpr", false));

        Ok(Self {
            log_level,
            log_destination,
            compliance,
            daemon_log,
        })
    }
}

/// Build the logging setup for the given options.
///
/// # Examples
///
/// ```
/// use appconf::logging::{build_logging_config, HandlerTarget, LoggingOptions};
///
/// let config = build_logging_config(&LoggingOptions {
///     log_destination: Some("stdout".into()),
///     ..Default::default()
/// });
/// assert_eq!(config.root.handlers, ["console"]);
/// assert_eq!(config.handlers["console"].target, HandlerTarget::Stdout);
/// ```
#[must_use]
pub fn build_logging_config(options: &LoggingOptions) -> LoggingConfig {
    let console_target = match options.log_destination.as_deref() {
        None | Some("") => HandlerTarget::Stderr,
        Some("stdout") => HandlerTarget::Stdout,
        Some(path) => HandlerTarget::File(PathBuf::from(path)),
    };

    let mut handlers = BTreeMap::new();
    handlers.insert(
        "console".to_string(),
        HandlerConfig {
            target: console_target,
            format: LogFormat::Stack,
            level: options.log_level,
        },
    );

    let mut root = LoggerConfig {
        level: LogLevel::Debug,
        handlers: vec!["console".to_string()],
    };
    let mut loggers = BTreeMap::new();

    if options.compliance {
        handlers.insert(
            "compliance_log".to_string(),
            HandlerConfig {
                target: HandlerTarget::File(PathBuf::from(COMPLIANCE_LOG_FILE)),
                format: LogFormat::Brief,
                level: LogLevel::Debug,
            },
        );
        loggers.insert(
            COMPLIANCE_LOGGER.to_string(),
            LoggerConfig {
                level: LogLevel::Debug,
                handlers: vec!["compliance_log".to_string()],
            },
        );
    }

    if let Some(path) = &options.daemon_log {
        handlers.insert(
            "files".to_string(),
            HandlerConfig {
                target: HandlerTarget::File(path.clone()),
                format: LogFormat::Stack,
                level: LogLevel::Debug,
            },
        );
        root.handlers.push("files".to_string());
    }

    LoggingConfig {
        root,
        loggers,
        handlers,
    }
}

/// A boxed, filtered output layer for one handler.
pub type HandlerLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The subscriber built from a [`LoggingConfig`].
pub type LoggingSubscriber = Layered<Vec<HandlerLayer>, Registry>;

struct BriefTime;

impl FormatTime for BriefTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        fmt::Write::write_fmt(
            w,
            format_args!("{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f")),
        )
    }
}

/// The targets a handler accepts.
///
/// Handlers attached to the root see every target up to the root level.
/// Handlers attached to a named logger also see that logger's targets up to
/// its level. Both are capped by the handler's own level.
fn handler_filter(name: &str, handler: &HandlerConfig, config: &LoggingConfig) -> Targets {
    let attached = |logger: &LoggerConfig| logger.handlers.iter().any(|h| h == name);
    let root_level = attached(&config.root).then(|| config.root.level.min(handler.level));

    let mut targets = Targets::new();
    if let Some(level) = root_level {
        targets = targets.with_default(level.to_level_filter());
    }
    for (target, logger) in &config.loggers {
        if !attached(logger) {
            continue;
        }
        let level = logger.level.min(handler.level);
        let level = root_level.map_or(level, |root| root.max(level));
        targets = targets.with_target(target.clone(), level.to_level_filter());
    }
    targets
}

fn format_layer<W>(writer: W, format: LogFormat, filter: Targets) -> HandlerLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer::<Registry>()
        .with_writer(writer)
        .with_ansi(false);
    match format {
        LogFormat::Stack => layer.without_time().with_filter(filter).boxed(),
        LogFormat::Brief => layer.with_timer(BriefTime).with_filter(filter).boxed(),
    }
}

fn handler_layer(handler: &HandlerConfig, filter: Targets) -> Result<HandlerLayer> {
    Ok(match &handler.target {
        HandlerTarget::Stderr => format_layer(io::stderr, handler.format, filter),
        HandlerTarget::Stdout => format_layer(io::stdout, handler.format, filter),
        HandlerTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| Error::Logging(format!("cannot open {}: {e}", path.display())))?;
            format_layer(Mutex::new(file), handler.format, filter)
        }
    })
}

/// Build a subscriber with one layer per handler.
///
/// # Errors
///
/// Returns an error if a logger names an unknown handler or a log file
/// cannot be opened.
pub fn build_subscriber(config: &LoggingConfig) -> Result<LoggingSubscriber> {
    let referenced = config
        .loggers
        .values()
        .chain(std::iter::once(&config.root))
        .flat_map(|logger| &logger.handlers);
    for name in referenced {
        if !config.handlers.contains_key(name) {
            return Err(Error::Logging(format!("unknown handler '{name}'")));
        }
    }

    let layers = config
        .handlers
        .iter()
        .map(|(name, handler)| handler_layer(handler, handler_filter(name, handler, config)))
        .collect::<Result<Vec<_>>>()?;
    Ok(tracing_subscriber::registry().with(layers))
}

/// Install the setup as the global subscriber.
///
/// Records sent through the `log` facade are forwarded to it.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be built or a global
/// subscriber or logger is already installed.
pub fn install(config: &LoggingConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Resolve the CLI log level.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet)
/// 2. `APPCONF_LOG_LEVEL` environment variable
/// 3. Default (Warn)
///
/// If both `verbose` and `quiet` are true, `verbose` takes precedence.
#[must_use]
pub fn level_from_flags(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Debug;
    }
    if quiet {
        return LogLevel::Error;
    }
    env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .unwrap_or_default()
}

/// Install a standard error console at the level chosen by
/// [`level_from_flags`].
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logger(verbose: bool, quiet: bool) -> Result<LogLevel> {
    let level = level_from_flags(verbose, quiet);
    install(&build_logging_config(&LoggingOptions {
        log_level: level,
        ..Default::default()
    }))?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::parse("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::parse("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::parse("CRITICAL").unwrap(), LogLevel::Error);
        assert!(LogLevel::parse("loud").is_err());
        assert!(LogLevel::parse("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = build_logging_config(&LoggingOptions::default());
        assert_eq!(config.root.level, LogLevel::Debug);
        assert_eq!(config.root.handlers, ["console"]);
        assert_eq!(config.handlers.len(), 1);
        let console = &config.handlers["console"];
        assert_eq!(console.target, HandlerTarget::Stderr);
        assert_eq!(console.format, LogFormat::Stack);
        assert_eq!(console.level, LogLevel::Debug);
        assert!(config.loggers.is_empty());
    }

    #[test]
    fn test_console_level_and_file_destination() {
        let config = build_logging_config(&LoggingOptions {
            log_level: LogLevel::Info,
            log_destination: Some("/var/log/app.log".into()),
            ..Default::default()
        });
        let console = &config.handlers["console"];
        assert_eq!(console.level, LogLevel::Info);
        assert_eq!(console.target, HandlerTarget::File(PathBuf::from("/var/log/app.log")));
    }

    #[test]
    fn test_compliance_logger() {
        let config = build_logging_config(&LoggingOptions {
            compliance: true,
            ..Default::default()
        });
        let handler = &config.handlers["compliance_log"];
        assert_eq!(handler.format, LogFormat::Brief);
        assert_eq!(handler.target, HandlerTarget::File(PathBuf::from(COMPLIANCE_LOG_FILE)));
        assert_eq!(config.loggers[COMPLIANCE_LOGGER].handlers, ["compliance_log"]);
        assert_eq!(config.root.handlers, ["console"]);
    }

    #[test]
    fn test_daemon_log_appended_to_root() {
        let config = build_logging_config(&LoggingOptions {
            daemon_log: Some(PathBuf::from("/tmp/daemon.log")),
            ..Default::default()
        });
        assert_eq!(config.root.handlers, ["console", "files"]);
        assert_eq!(
            config.handlers["files"].target,
            HandlerTarget::File(PathBuf::from("/tmp/daemon.log"))
        );
    }

    #[test]
    fn test_options_from_config() {
        use crate::config::AppConfigBuilder;
        use crate::schema::{OptionSpec, OptionType, Schema};

        let schema = Schema::new(
            "app",
            vec![
                OptionSpec::new("log_level", OptionType::Str).with_default("DEBUG"),
                OptionSpec::new("log_destination", OptionType::Str),
                OptionSpec::new("enable_beta_gdpr", OptionType::Bool).with_default(false),
            ],
        )
        .unwrap();

        let defaults = AppConfigBuilder::new(schema.clone())
            .with_root("/srv/app")
            .build()
            .unwrap();
        let options = LoggingOptions::from_config(&defaults, None).unwrap();
        assert_eq!(options, LoggingOptions::default());

        let config = AppConfigBuilder::new(schema)
            .with_root("/srv/app")
            .with_option("log_level", "WARNING")
            .with_option("log_destination", "stdout")
            .with_option("enable_beta_gdpr", "true")
            .build()
            .unwrap();
        let options = LoggingOptions::from_config(&config, Some(PathBuf::from("/tmp/d.log"))).unwrap();
        assert_eq!(options.log_level, LogLevel::Warn);
        assert_eq!(options.log_destination.as_deref(), Some("stdout"));
        assert!(options.compliance);
        assert_eq!(options.daemon_log, Some(PathBuf::from("/tmp/d.log")));
    }

    #[test]
    fn test_builds_are_independent() {
        let first = build_logging_config(&LoggingOptions {
            compliance: true,
            daemon_log: Some(PathBuf::from("/tmp/d.log")),
            ..Default::default()
        });
        let second = build_logging_config(&LoggingOptions::default());
        assert_ne!(first, second);
        assert_eq!(second.root.handlers, ["console"]);
    }

    #[test]
    fn test_subscriber_routes_by_target() {
        let temp_dir = TempDir::new().unwrap();
        let main_log = temp_dir.path().join("main.log");
        let compliance_log = temp_dir.path().join("compliance.log");

        let mut config = build_logging_config(&LoggingOptions {
            log_destination: Some(main_log.display().to_string()),
            log_level: LogLevel::Info,
            compliance: true,
            ..Default::default()
        });
        config
            .handlers
            .get_mut("compliance_log")
            .unwrap()
            .target = HandlerTarget::File(compliance_log.clone());

        let subscriber = build_subscriber(&config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "COMPLIANCE", "user deleted");
            tracing::debug!(target: "COMPLIANCE", "purged datasets");
            tracing::debug!(target: "appconf::path", "resolved paths");
        });

        let main = fs::read_to_string(&main_log).unwrap();
        assert!(main.contains("INFO COMPLIANCE: user deleted"));
        assert!(!main.contains("purged datasets"));
        assert!(!main.contains("resolved paths"));

        let compliance = fs::read_to_string(&compliance_log).unwrap();
        assert!(compliance.contains("user deleted"));
        assert!(compliance.contains("purged datasets"));
        assert!(!compliance.contains("resolved paths"));
        assert!(compliance.starts_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn test_handler_filter_levels() {
        let config = build_logging_config(&LoggingOptions {
            log_level: LogLevel::Warn,
            compliance: true,
            ..Default::default()
        });
        let console = handler_filter("console", &config.handlers["console"], &config);
        assert!(console.would_enable("appconf::config", &tracing::Level::WARN));
        assert!(!console.would_enable("appconf::config", &tracing::Level::INFO));

        let compliance =
            handler_filter("compliance_log", &config.handlers["compliance_log"], &config);
        assert!(compliance.would_enable("COMPLIANCE", &tracing::Level::DEBUG));
        assert!(!compliance.would_enable("appconf::config", &tracing::Level::ERROR));
    }

    #[test]
    fn test_subscriber_rejects_unknown_handler() {
        let mut config = build_logging_config(&LoggingOptions::default());
        config.root.handlers.push("missing".into());
        assert!(matches!(build_subscriber(&config), Err(Error::Logging(_))));
    }

    #[test]
    fn test_unwritable_log_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = build_logging_config(&LoggingOptions {
            log_destination: Some(temp_dir.path().join("no/such/dir/app.log").display().to_string()),
            ..Default::default()
        });
        assert!(matches!(build_subscriber(&config), Err(Error::Logging(_))));
    }

    #[test]
    fn test_verbose_takes_precedence() {
        assert_eq!(level_from_flags(true, true), LogLevel::Debug);
        assert_eq!(level_from_flags(false, true), LogLevel::Error);
    }

    #[test]
    #[serial]
    fn test_level_from_env() {
        let saved = env::var(LOG_LEVEL_ENV).ok();

        env::set_var(LOG_LEVEL_ENV, "info");
        assert_eq!(level_from_flags(false, false), LogLevel::Info);
        assert_eq!(level_from_flags(false, true), LogLevel::Error);

        env::set_var(LOG_LEVEL_ENV, "invalid");
        assert_eq!(level_from_flags(false, false), LogLevel::Warn);

        env::remove_var(LOG_LEVEL_ENV);
        assert_eq!(level_from_flags(false, false), LogLevel::Warn);

        if let Some(value) = saved {
            env::set_var(LOG_LEVEL_ENV, value);
        }
    }
}
