//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It is built once at startup from defaults, an optional TOML file and the
//! command line, in that order of increasing precedence.

use std::net::{Ipv4Addr, SocketAddr};

use bitbang_core::DEFAULT_IDCODE;

/// TCP port the remote-bitbang listener binds to unless told otherwise.
pub const DEFAULT_PORT: u16 = 9823;

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use bitbang_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 9823);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Address and port the listener binds to.
    ///
    /// `0.0.0.0` accepts debuggers from any interface.  Use `127.0.0.1` to
    /// restrict the bridge to local clients.
    pub bind_addr: SocketAddr,

    /// IDCODE reported by the simulated TAP.
    pub idcode: u32,

    /// Fallback `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for BridgeConfig {
    /// | Field     | Default          |
    /// |-----------|------------------|
    /// | bind_addr | `0.0.0.0:9823`   |
    /// | idcode    | `0x1000563D`     |
    /// | log_level | `info`           |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            idcode: DEFAULT_IDCODE,
            log_level: "info".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
