//! Utility modules for rules-architect

pub mod logging;

pub use logging::{init_from_env, init_logging, LoggingConfig};
