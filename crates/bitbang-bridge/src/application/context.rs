//! The bridge context: the device plus everything that must outlive a session.
//!
//! # Lifecycle
//!
//! ```text
//! BridgeContext::start(device)   reset sequence, initial LED observation
//!         │
//!         ├── execute(cmd) ...   any number of sessions, in order
//!         │
//! BridgeContext::finalize()      device.finalize(), device handed back
//! ```
//!
//! A session ending (cleanly or not) never touches the context, which is
//! what keeps device state intact across reconnects.

use bitbang_core::protocol::command::encode_tdo;
use bitbang_core::{AuxOutputs, Command, DeviceAdapter, JtagPins, NoOp};
use tracing::{info, trace, warn};

use crate::application::led_monitor::LedMonitor;
use crate::application::startup::run_reset_sequence;

/// What the session loop must do after a command has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Read the next byte.
    Continue,
    /// Write this byte to the client, then read the next one.
    Reply(u8),
    /// Stop serving; the bridge is shutting down.
    Terminate,
}

/// Exclusive owner of the device for the whole process lifetime.
#[derive(Debug)]
pub struct BridgeContext<D: DeviceAdapter> {
    device: D,
    leds: LedMonitor,
}

impl<D: DeviceAdapter> BridgeContext<D> {
    /// Wraps `device` as-is, without resetting it.
    pub fn new(device: D) -> Self {
        let leds = LedMonitor::new(device.aux_outputs());
        Self { device, leds }
    }

    /// Resets `device` and wraps it.  This is the normal process start.
    pub fn start(mut device: D) -> Self {
        run_reset_sequence(&mut device);
        let context = Self::new(device);
        info!("initial LED state -> {}", context.leds.last());
        context
    }

    /// Executes one decoded command against the device.
    pub fn execute(&mut self, command: Command) -> Step {
        trace!(?command, "command");
        match command {
            Command::SetPins(pins) => {
                self.drive_pins(pins);
                Step::Continue
            }
            Command::ReadTdo => Step::Reply(self.read_tdo()),
            Command::Quit => Step::Terminate,
            Command::NoOp(NoOp::Unrecognized(byte)) => {
                warn!("ignoring unexpected command byte {byte:#04x}");
                Step::Continue
            }
            Command::NoOp(_) => Step::Continue,
        }
    }

    /// Signal driver: applies all three lines, evaluates once, then checks
    /// the LEDs.
    pub fn drive_pins(&mut self, pins: JtagPins) {
        self.device.set_jtag_inputs(pins);
        self.device.evaluate();
        if let Some(aux) = self.leds.observe(self.device.aux_outputs()) {
            info!("LED update -> {aux}");
        }
    }

    /// Readback responder: the response byte for the current `TDO` level.
    pub fn read_tdo(&self) -> u8 {
        encode_tdo(self.device.tdo())
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// The auxiliary outputs as last observed by the LED monitor.
    pub fn last_leds(&self) -> AuxOutputs {
        self.leds.last()
    }

    /// Finalizes the device and hands it back.
    pub fn finalize(mut self) -> D {
        self.device.finalize();
        info!("device finalized");
        self.device
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bitbang_core::{decode_command, MockDeviceAdapter, SimulatedTap};
    use mockall::Sequence;

    fn quiet_mock() -> MockDeviceAdapter {
        let mut mock = MockDeviceAdapter::new();
        mock.expect_aux_outputs().return_const(AuxOutputs::default());
        mock
    }

    #[test]
    fn test_set_pins_writes_all_lines_then_evaluates() {
        // Arrange
        let mut seq = Sequence::new();
        let mut mock = MockDeviceAdapter::new();
        mock.expect_aux_outputs()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(AuxOutputs::default());
        mock.expect_set_jtag_inputs()
            .withf(|pins| *pins == JtagPins::new(true, false, true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        mock.expect_evaluate()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        mock.expect_aux_outputs()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(AuxOutputs::default());
        mock.expect_step_system_clock().never();
        let mut ctx = BridgeContext::new(mock);

        // Act: '5' = TCK=1 TMS=0 TDI=1
        let step = ctx.execute(decode_command(b'5'));

        // Assert
        assert_eq!(step, Step::Continue);
    }

    #[test]
    fn test_read_tdo_replies_without_evaluating() {
        // Arrange
        let mut mock = quiet_mock();
        mock.expect_tdo().times(2).return_const(true);
        mock.expect_evaluate().never();
        mock.expect_set_jtag_inputs().never();
        let mut ctx = BridgeContext::new(mock);

        // Act
        let first = ctx.execute(Command::ReadTdo);
        let second = ctx.execute(Command::ReadTdo);

        // Assert
        assert_eq!(first, Step::Reply(b'1'));
        assert_eq!(second, first);
    }

    #[test]
    fn test_read_tdo_low_replies_ascii_zero() {
        let mut mock = quiet_mock();
        mock.expect_tdo().return_const(false);
        let mut ctx = BridgeContext::new(mock);

        assert_eq!(ctx.execute(Command::ReadTdo), Step::Reply(b'0'));
    }

    #[test]
    fn test_quit_terminates_without_touching_device() {
        let mut mock = quiet_mock();
        mock.expect_evaluate().never();
        mock.expect_finalize().never();
        let mut ctx = BridgeContext::new(mock);

        assert_eq!(ctx.execute(Command::Quit), Step::Terminate);
    }

    #[test]
    fn test_noop_bytes_have_no_device_effect() {
        // Arrange
        let mut mock = quiet_mock();
        mock.expect_set_jtag_inputs().never();
        mock.expect_evaluate().never();
        mock.expect_set_reset().never();
        mock.expect_tdo().never();
        let mut ctx = BridgeContext::new(mock);

        // Act / Assert
        for byte in [b'B', b'b', b'r', b's', b'x', 0x00, 0xFF] {
            assert_eq!(ctx.execute(decode_command(byte)), Step::Continue);
        }
    }

    #[test]
    fn test_led_change_is_recorded_after_evaluation() {
        // Arrange: LEDs read dark at construction, lit after the evaluate.
        let lit = AuxOutputs { led1: 0x01, led2: 0x00 };
        let mut seq = Sequence::new();
        let mut mock = MockDeviceAdapter::new();
        mock.expect_aux_outputs()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(AuxOutputs::default());
        mock.expect_set_jtag_inputs().return_const(());
        mock.expect_evaluate().return_const(());
        mock.expect_aux_outputs()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(lit);
        let mut ctx = BridgeContext::new(mock);

        // Act
        ctx.drive_pins(JtagPins::default());

        // Assert
        assert_eq!(ctx.last_leds(), lit);
    }

    #[test]
    fn test_finalize_calls_device_finalize_once() {
        let mut mock = quiet_mock();
        mock.expect_finalize().times(1).return_const(());
        let ctx = BridgeContext::new(mock);

        let _device = ctx.finalize();
    }

    #[test]
    fn test_start_resets_simulated_tap() {
        let ctx = BridgeContext::start(SimulatedTap::default());

        assert_eq!(ctx.device().system_cycles(), u64::from(crate::application::RESET_CYCLES));
        assert!(!ctx.device().is_reset_active());
    }
}
