use crate::config::LoggingConfig;
use crate::errors::AppError;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: stderr by default, or a fresh log file.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(config.level.to_lowercase())
        .map_err(|e| AppError::Config(format!("Invalid log level '{}': {e}", config.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match &config.logfile {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::Config(format!("Cannot open log file {}: {e}", path.display()))
            })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| AppError::Config(format!("Logging already initialized: {e}")))
}
