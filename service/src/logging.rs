use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependency modules whose logs are hidden unless the level is Trace.
/// Each outbound call to Zoom would otherwise produce a burst of connection-pool
/// and retry-middleware noise around the one line the relay itself logs.
const FILTERED_MODULES: &[&str] = &["tower", "hyper", "axum", "reqwest", "reqwest_retry", "mio"];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the level configured in `config`.
    ///
    /// `meeting-auth` emits `tracing` events; with no tracing subscriber installed they are
    /// forwarded to this logger through tracing's `log` feature.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));

        TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto)
    }

    /// Trace is for deep debugging, so nothing is hidden at that level.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
