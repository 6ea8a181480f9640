//! # bitbang-core
//!
//! Shared library for the JTAG remote-bitbang bridge containing the wire
//! command model, the JTAG pin types, and the contract every simulated device
//! must implement to be driven by the bridge.
//!
//! It has zero dependencies on sockets or async runtimes.
//!
//! # Architecture overview
//!
//! A debug host (typically OpenOCD with its `remote_bitbang` driver) speaks a
//! one-byte-per-operation protocol over TCP.  Each byte either sets the three
//! JTAG input lines (`TCK`, `TMS`, `TDI`) or asks for the current value of the
//! output line (`TDO`).  The bridge applies those bytes to a clocked digital
//! device, one at a time, in order.
//!
//! - **`protocol`** – How bytes on the wire map to typed [`Command`]s.
//!
//! - **`domain`** – The pin model ([`JtagPins`]), the [`DeviceAdapter`] trait
//!   the bridge drives, and [`SimulatedTap`], a reference device with a real
//!   TAP controller that can be used when no external hardware model is
//!   attached.

pub mod domain;
pub mod protocol;

pub use domain::device::{AuxOutputs, DeviceAdapter};
pub use domain::pins::JtagPins;
pub use domain::tap::{SimulatedTap, TapState, DEFAULT_IDCODE};
pub use protocol::command::{decode_command, Command, NoOp};

#[cfg(any(test, feature = "mock"))]
pub use domain::device::MockDeviceAdapter;
