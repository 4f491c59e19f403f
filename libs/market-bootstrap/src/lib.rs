//! Bootstrap helpers shared by the market service binaries.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod db;
pub mod logging;
pub mod signals;

pub use cli::CommonArgs;
pub use config::{ConfigError, Environment, load_config, redacted, to_yaml};
pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use signals::{shutdown_signal, wait_for_shutdown};
