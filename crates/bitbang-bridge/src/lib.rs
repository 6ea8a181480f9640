//! bitbang-bridge library crate.
//!
//! This crate serves the remote-bitbang protocol over TCP and applies every
//! command to a device implementing [`bitbang_core::DeviceAdapter`].
//!
//! # Architecture
//!
//! ```text
//! Debug host (OpenOCD remote_bitbang, one byte per command)
//!         ↕ TCP
//! [bitbang-bridge]
//!   ├── domain/           BridgeConfig
//!   ├── application/      BridgeContext: signal driver, readback, LED monitor,
//!   │                     reset sequencing
//!   └── infrastructure/
//!         ├── supervisor/ accept → serve → re-accept state machine
//!         ├── session/    per-byte read loop for one connection
//!         └── config_file/ TOML config loading
//!         ↕
//! Device (bitbang_core::DeviceAdapter)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `bitbang-core` only; it never sees
//!   a socket, which keeps the command semantics testable with a mock device.
//! - `infrastructure` owns every socket and the Tokio runtime plumbing.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: command execution against the owned device.
pub mod application;

/// Infrastructure layer: TCP supervisor, session loop, config file.
pub mod infrastructure;
