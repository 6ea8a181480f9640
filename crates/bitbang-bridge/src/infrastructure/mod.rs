//! Infrastructure layer for bitbang-bridge.
//!
//! Handles all I/O: the TCP listener, the per-connection byte loop and the
//! optional TOML configuration file.
//!
//! # What does NOT belong here?
//!
//! - What a command does to the device (that is the application layer)
//! - Configuration defaults (that is the domain layer)

pub mod config_file;
pub mod session;
pub mod supervisor;

pub use config_file::{load_config_file, ConfigError, FileConfig};
pub use session::{serve_session, SessionEnd};
pub use supervisor::{Supervisor, SupervisorError, SupervisorExit};
