//! Startup reset sequencing.
//!
//! Runs once, before the listener accepts anything, so the first debugger to
//! connect always finds the device in a known state.

use bitbang_core::{DeviceAdapter, JtagPins};
use tracing::debug;

/// Full system clock cycles spent with reset asserted.
pub const RESET_CYCLES: u32 = 10;

/// JTAG lines held during reset: clock low, TMS high, TDI low.
pub const RESET_PINS: JtagPins = JtagPins::new(false, true, false);

/// Asserts reset, parks the JTAG lines, steps the system clock
/// [`RESET_CYCLES`] times and releases reset.
pub fn run_reset_sequence<D: DeviceAdapter + ?Sized>(device: &mut D) {
    device.set_reset(true);
    device.set_jtag_inputs(RESET_PINS);
    for _ in 0..RESET_CYCLES {
        device.step_system_clock();
    }
    device.set_reset(false);
    debug!(cycles = RESET_CYCLES, "device reset sequence complete");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
