//! Process-level plumbing shared by the FastAdmin binaries: layered
//! configuration, logging setup, home directory resolution and shutdown
//! signal handling.

pub mod config;
pub mod home_dir;
pub mod logging;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig, SQL_URL_ENV,
};
pub use logging::init_logging_from_config;
pub use shutdown::shutdown_signal;
