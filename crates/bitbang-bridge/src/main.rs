//! JTAG remote-bitbang bridge: entry point.
//!
//! Listens for a debugger speaking OpenOCD's `remote_bitbang` protocol and
//! drives the JTAG port of a simulated device with every byte it sends.
//!
//! # Usage
//!
//! ```text
//! bitbang-bridge [OPTIONS]
//!
//! Options:
//!   --port      <PORT>   Listener port [default: 9823]
//!   --bind      <ADDR>   Listener IP address [default: 0.0.0.0]
//!   --idcode    <HEX>    IDCODE of the simulated TAP [default: 0x1000563D]
//!   --log-level <LEVEL>  Log filter used when RUST_LOG is unset [default: info]
//!   --config    <FILE>   TOML configuration file
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then the `--config` file, then command-line flags or
//! their environment variables:
//!
//! | Variable         | Flag          |
//! |------------------|---------------|
//! | `BITBANG_PORT`   | `--port`      |
//! | `BITBANG_BIND`   | `--bind`      |
//! | `BITBANG_IDCODE` | `--idcode`    |
//! | `BITBANG_LOG`    | `--log-level` |
//! | `BITBANG_CONFIG` | `--config`    |
//!
//! `RUST_LOG`, when set, overrides the log level entirely.
//!
//! # Example OpenOCD setup
//!
//! ```text
//! adapter driver remote_bitbang
//! remote_bitbang host localhost
//! remote_bitbang port 9823
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bitbang_bridge::application::BridgeContext;
use bitbang_bridge::domain::BridgeConfig;
use bitbang_bridge::infrastructure::{load_config_file, Supervisor, SupervisorExit};
use bitbang_core::SimulatedTap;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// JTAG remote-bitbang bridge.
///
/// Serves one debugger at a time over TCP and keeps the device state across
/// reconnects.  Terminates when a client sends `Q` or on Ctrl+C.
#[derive(Debug, Parser)]
#[command(
    name = "bitbang-bridge",
    about = "TCP remote-bitbang server for a simulated JTAG device",
    version
)]
struct Cli {
    /// TCP port to listen on.
    #[arg(long, env = "BITBANG_PORT")]
    port: Option<u16>,

    /// IP address to bind to.
    ///
    /// `0.0.0.0` accepts debuggers on any interface, `127.0.0.1` only local
    /// ones.
    #[arg(long, env = "BITBANG_BIND")]
    bind: Option<String>,

    /// IDCODE of the simulated TAP, decimal or `0x`-prefixed hex.
    #[arg(long, env = "BITBANG_IDCODE", value_parser = parse_idcode)]
    idcode: Option<u32>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`).
    #[arg(long, env = "BITBANG_LOG")]
    log_level: Option<String>,

    /// TOML configuration file.  Flags override values read from it.
    #[arg(long, env = "BITBANG_CONFIG")]
    config: Option<PathBuf>,
}

fn parse_idcode(value: &str) -> Result<u32, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid IDCODE '{value}': {e}"))
}

impl Cli {
    /// Resolves defaults, the optional config file and the flags into a
    /// [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// `--bind` is not a valid IP address.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)
                .and_then(|file| file.into_bridge_config())
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => BridgeConfig::default(),
        };

        if let Some(bind) = &self.bind {
            let ip: IpAddr = bind
                .parse()
                .with_context(|| format!("invalid bind address: '{bind}'"))?;
            config.bind_addr.set_ip(ip);
        }
        if let Some(port) = self.port {
            config.bind_addr.set_port(port);
        }
        if let Some(idcode) = self.idcode {
            config.idcode = idcode;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The bridge is strictly sequential (one byte, one device step, one reply)
/// so a single-threaded runtime is enough; the Ctrl+C task shares it.
///
/// # What happens at startup
///
/// 1. CLI arguments and the optional config file become a [`BridgeConfig`].
/// 2. `tracing_subscriber` is initialised from `RUST_LOG`, falling back to
///    the configured level.
/// 3. The simulated device is created and put through its reset sequence.
/// 4. A Ctrl+C handler is spawned that clears the shared `running` flag.
/// 5. The [`Supervisor`] binds the port and serves debuggers until a `Q`
///    arrives or the flag is cleared, then the device is finalized.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_bridge_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "remote-bitbang bridge starting, bind={}, idcode={:#010x}",
        config.bind_addr, config.idcode
    );

    let context = BridgeContext::start(SimulatedTap::new(config.idcode));

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Serve ─────────────────────────────────────────────────────────────────
    let supervisor = Supervisor::bind(config.bind_addr, context, running)
        .await
        .context("could not start remote-bitbang listener")?;

    let (exit, context) = supervisor.run().await;
    let device = context.finalize();

    match exit {
        SupervisorExit::Terminated => info!(
            system_cycles = device.system_cycles(),
            "bridge terminated by client"
        ),
        SupervisorExit::Stopped => info!(
            system_cycles = device.system_cycles(),
            "bridge stopped"
        ),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["bitbang-bridge"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_without_flags_yields_default_config() {
        // Arrange
        let cli = Cli {
            port: None,
            bind: None,
            idcode: None,
            log_level: None,
            config: None,
        };

        // Act
        let config = cli.into_bridge_config().unwrap();

        // Assert
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_cli_port_override() {
        let config = cli(&["--port", "4444"]).into_bridge_config().unwrap();
        assert_eq!(config.bind_addr.port(), 4444);
    }

    #[test]
    fn test_cli_bind_override_keeps_port() {
        let config = cli(&["--bind", "127.0.0.1", "--port", "5000"])
            .into_bridge_config()
            .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_cli_invalid_bind_returns_error() {
        let result = cli(&["--bind", "not.an.ip"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_idcode_accepts_hex_and_decimal() {
        assert_eq!(cli(&["--idcode", "0x4BA00477"]).idcode, Some(0x4BA0_0477));
        assert_eq!(cli(&["--idcode", "0X10"]).idcode, Some(16));
        assert_eq!(cli(&["--idcode", "4096"]).idcode, Some(4096));
    }

    #[test]
    fn test_cli_rejects_malformed_idcode() {
        let result = Cli::try_parse_from(["bitbang-bridge", "--idcode", "0xZZ"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_log_level_override() {
        let config = cli(&["--log-level", "trace"]).into_bridge_config().unwrap();
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_cli_missing_config_file_returns_error() {
        let result = cli(&["--config", "/nonexistent/bitbang-bridge.toml"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!(
            "bitbang-bridge-cli-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[network]\nport = 7000\n[device]\nidcode = 0x11\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        // Act
        let result = cli(&["--config", path_str.as_str(), "--port", "7001"]).into_bridge_config();
        let _ = std::fs::remove_file(&path);

        // Assert
        let config = result.unwrap();
        assert_eq!(config.bind_addr.port(), 7001);
        assert_eq!(config.idcode, 0x11);
    }

    #[test]
    fn test_parse_idcode_error_names_value() {
        let err = parse_idcode("nope").unwrap_err();
        assert!(err.contains("nope"));
    }
}
