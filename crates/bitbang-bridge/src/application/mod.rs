//! Application layer for bitbang-bridge.
//!
//! Knows *what* each command does to the device, but not where the bytes
//! come from.
//!
//! # Responsibilities
//!
//! - Owning the device for the whole process lifetime ([`BridgeContext`])
//! - Applying signal-set commands and evaluating the device
//! - Answering read-back commands
//! - Watching the auxiliary outputs for changes
//! - The startup reset sequence

pub mod context;
pub mod led_monitor;
pub mod startup;

pub use context::{BridgeContext, Step};
pub use led_monitor::LedMonitor;
pub use startup::{run_reset_sequence, RESET_CYCLES};
