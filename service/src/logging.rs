use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// HTTP and SSE client crates that log every poll, handshake and reconnect attempt.
/// They stay silent below `TRACE`.
const NOISY_DEPENDENCIES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "eventsource_client",
    "mio",
    "want",
];

pub struct Logger {}

impl Logger {
    /// Install the global logger.
    ///
    /// The live session view owns stdout, so log records always go to stderr and
    /// can be redirected without garbling the hospital status lines.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        TermLogger::init(
            config.log_level_filter,
            Self::build_log_config(config.log_level_filter),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_thread_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off);

        // Module paths help when following the transport and reconciler at debug level.
        builder.set_target_level(if level >= LevelFilter::Debug {
            LevelFilter::Error
        } else {
            LevelFilter::Off
        });

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }

    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            NOISY_DEPENDENCIES
        }
    }
}
