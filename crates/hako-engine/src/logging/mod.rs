//! Logging setup.
//!
//! The engine only talks to the `log` facade; hosts call [`init_logging`]
//! once, early in `main`, to install `env_logger` behind it.

mod init;

pub use init::{init_logging, LoggingConfig};
