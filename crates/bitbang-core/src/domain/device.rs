//! The device adapter contract.
//!
//! The bridge never owns a copy of the JTAG lines: everything it knows about
//! the device is read through this trait, and every change it makes goes
//! through it.  The device is free to implement its logic any way it likes
//! (a generated RTL model, an interpreter, or [`SimulatedTap`]).
//!
//! # Testability
//!
//! With the `mock` feature enabled (always on for this crate's own tests),
//! `mockall` generates `MockDeviceAdapter`, which lets tests assert exactly
//! which calls a command produced.
//!
//! [`SimulatedTap`]: crate::domain::tap::SimulatedTap

use crate::domain::pins::JtagPins;

/// The two diagnostic outputs a device exposes alongside `TDO`.
///
/// They never influence the protocol; the bridge only watches them to log
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuxOutputs {
    pub led1: u8,
    pub led2: u8,
}

impl std::fmt::Display for AuxOutputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LED1: {:#04x}, LED2: {:#04x}", self.led1, self.led2)
    }
}

/// A clocked digital device with a JTAG port.
///
/// Implementations are driven from a single control loop and are never
/// shared between threads, so the trait requires neither `Send` nor `Sync`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait DeviceAdapter {
    /// Drives the three JTAG input lines.  Takes effect at the next
    /// [`evaluate`](DeviceAdapter::evaluate).
    fn set_jtag_inputs(&mut self, pins: JtagPins);

    /// Propagates the current inputs into the device's state and outputs.
    fn evaluate(&mut self);

    /// Current level of the `TDO` output.
    fn tdo(&self) -> bool;

    /// Current levels of the diagnostic outputs.
    fn aux_outputs(&self) -> AuxOutputs;

    /// Asserts or releases the device's system reset.
    fn set_reset(&mut self, active: bool);

    /// Runs one full cycle (low then high) of the free-running system clock.
    fn step_system_clock(&mut self);

    /// Orderly shutdown.  No other method is called afterwards.
    fn finalize(&mut self);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aux_outputs_display_uses_two_digit_hex() {
        let aux = AuxOutputs { led1: 0x0A, led2: 0xF0 };
        assert_eq!(aux.to_string(), "LED1: 0x0a, LED2: 0xf0");
    }

    #[test]
    fn test_mock_device_adapter_records_inputs() {
        // Arrange
        let mut mock = MockDeviceAdapter::new();
        mock.expect_set_jtag_inputs()
            .withf(|pins| *pins == JtagPins::new(true, true, false))
            .times(1)
            .return_const(());

        // Act
        mock.set_jtag_inputs(JtagPins::new(true, true, false));

        // Assert: expectations are verified when `mock` is dropped.
    }
}
