//! Application module
//!
//! Binary-side plumbing shared by the command handlers:
//! - Verbosity and log level selection
//! - Logging setup
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
