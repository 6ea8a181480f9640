//! Domain layer for bitbang-bridge.
//!
//! Plain configuration types with no dependency on sockets, files or the
//! environment.  The infrastructure layer and `main.rs` are responsible for
//! populating them.

pub mod config;

pub use config::{BridgeConfig, DEFAULT_PORT};
