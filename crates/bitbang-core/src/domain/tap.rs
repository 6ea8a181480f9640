//! A reference JTAG device: an IEEE 1149.1 TAP controller with an LED register.
//!
//! The bridge treats devices as opaque, but a runnable bridge needs *some*
//! device on the far side.  [`SimulatedTap`] is a small, fully deterministic
//! one whose JTAG logic is clocked by the `TCK` input line, exactly like the
//! hardware designs the bridge is meant to front:
//!
//! - the TAP state machine advances and shift registers shift on the
//!   **rising** edge of `TCK`;
//! - `TDO` changes and Update-IR / Update-DR latch on the **falling** edge.
//!
//! # Registers
//!
//! | Instruction | Opcode   | Data register | Length |
//! |-------------|----------|---------------|--------|
//! | `IDCODE`    | `0b0001` | device ID     | 32     |
//! | `LED`       | `0b0010` | `led2:led1`   | 16     |
//! | `BYPASS`    | `0b1111` | bypass        | 1      |
//!
//! Unused opcodes select `BYPASS`.  Test-Logic-Reset selects `IDCODE`.
//!
//! # System reset
//!
//! While reset is asserted, each system clock step forces the TAP back into
//! Test-Logic-Reset and clears both LEDs.  `TCK` edges seen while reset is
//! asserted are ignored.

use tracing::trace;

use crate::domain::device::{AuxOutputs, DeviceAdapter};
use crate::domain::pins::JtagPins;

/// IDCODE reported when none is configured.  Bit 0 is always 1 per 1149.1.
pub const DEFAULT_IDCODE: u32 = 0x1000_563D;

/// Instruction register width in bits.
pub const IR_LEN: u32 = 4;

/// Value loaded into the instruction register in Capture-IR.
const IR_CAPTURE: u32 = 0b0001;

const INSTR_IDCODE: u32 = 0b0001;
const INSTR_LED: u32 = 0b0010;
const INSTR_BYPASS: u32 = 0b1111;

/// The sixteen TAP controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapState {
    TestLogicReset,
    RunTestIdle,
    SelectDrScan,
    CaptureDr,
    ShiftDr,
    Exit1Dr,
    PauseDr,
    Exit2Dr,
    UpdateDr,
    SelectIrScan,
    CaptureIr,
    ShiftIr,
    Exit1Ir,
    PauseIr,
    Exit2Ir,
    UpdateIr,
}

impl TapState {
    /// The state reached on a rising `TCK` edge with the given `TMS` level.
    pub fn next(self, tms: bool) -> TapState {
        use TapState::*;
        match (self, tms) {
            (TestLogicReset, true) => TestLogicReset,
            (TestLogicReset, false) => RunTestIdle,
            (RunTestIdle, true) => SelectDrScan,
            (RunTestIdle, false) => RunTestIdle,
            (SelectDrScan, true) => SelectIrScan,
            (SelectDrScan, false) => CaptureDr,
            (CaptureDr, true) => Exit1Dr,
            (CaptureDr, false) => ShiftDr,
            (ShiftDr, true) => Exit1Dr,
            (ShiftDr, false) => ShiftDr,
            (Exit1Dr, true) => UpdateDr,
            (Exit1Dr, false) => PauseDr,
            (PauseDr, true) => Exit2Dr,
            (PauseDr, false) => PauseDr,
            (Exit2Dr, true) => UpdateDr,
            (Exit2Dr, false) => ShiftDr,
            (UpdateDr, true) => SelectDrScan,
            (UpdateDr, false) => RunTestIdle,
            (SelectIrScan, true) => TestLogicReset,
            (SelectIrScan, false) => CaptureIr,
            (CaptureIr, true) => Exit1Ir,
            (CaptureIr, false) => ShiftIr,
            (ShiftIr, true) => Exit1Ir,
            (ShiftIr, false) => ShiftIr,
            (Exit1Ir, true) => UpdateIr,
            (Exit1Ir, false) => PauseIr,
            (PauseIr, true) => Exit2Ir,
            (PauseIr, false) => PauseIr,
            (Exit2Ir, true) => UpdateIr,
            (Exit2Ir, false) => ShiftIr,
            (UpdateIr, true) => SelectDrScan,
            (UpdateIr, false) => RunTestIdle,
        }
    }
}

/// A simulated device whose only interface is its JTAG port and two LEDs.
#[derive(Debug, Clone)]
pub struct SimulatedTap {
    idcode: u32,
    inputs: JtagPins,
    prev_tck: bool,
    reset_active: bool,
    state: TapState,
    ir: u32,
    ir_shift: u32,
    dr_shift: u32,
    tdo: bool,
    leds: AuxOutputs,
    system_cycles: u64,
    finalized: bool,
}

impl SimulatedTap {
    /// Creates a device reporting `idcode`.  Bit 0 is forced to 1.
    pub fn new(idcode: u32) -> Self {
        Self {
            idcode: idcode | 1,
            inputs: JtagPins::default(),
            prev_tck: false,
            reset_active: false,
            state: TapState::TestLogicReset,
            ir: INSTR_IDCODE,
            ir_shift: 0,
            dr_shift: 0,
            tdo: false,
            leds: AuxOutputs::default(),
            system_cycles: 0,
            finalized: false,
        }
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    /// The currently latched instruction.
    pub fn instruction(&self) -> u32 {
        self.ir
    }

    pub fn idcode(&self) -> u32 {
        self.idcode
    }

    /// Number of system clock cycles stepped so far.
    pub fn system_cycles(&self) -> u64 {
        self.system_cycles
    }

    pub fn is_reset_active(&self) -> bool {
        self.reset_active
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn dr_len(&self) -> u32 {
        match self.ir {
            INSTR_IDCODE => 32,
            INSTR_LED => 16,
            _ => 1,
        }
    }

    fn dr_capture_value(&self) -> u32 {
        match self.ir {
            INSTR_IDCODE => self.idcode,
            INSTR_LED => u32::from(self.leds.led1) | (u32::from(self.leds.led2) << 8),
            _ => 0,
        }
    }

    fn apply_system_reset(&mut self) {
        self.state = TapState::TestLogicReset;
        self.ir = INSTR_IDCODE;
        self.ir_shift = 0;
        self.dr_shift = 0;
        self.tdo = false;
        self.leds = AuxOutputs::default();
    }

    fn rising_edge(&mut self) {
        let tdi = u32::from(self.inputs.tdi);
        match self.state {
            TapState::CaptureDr => self.dr_shift = self.dr_capture_value(),
            TapState::ShiftDr => {
                let len = self.dr_len();
                let mask = if len == 32 { u32::MAX } else { (1 << len) - 1 };
                self.dr_shift = ((self.dr_shift >> 1) | (tdi << (len - 1))) & mask;
            }
            TapState::CaptureIr => self.ir_shift = IR_CAPTURE,
            TapState::ShiftIr => {
                self.ir_shift = (self.ir_shift >> 1) | (tdi << (IR_LEN - 1));
            }
            _ => {}
        }

        let next = self.state.next(self.inputs.tms);
        if next != self.state {
            trace!(from = ?self.state, to = ?next, "TAP state transition");
        }
        self.state = next;
        if next == TapState::TestLogicReset {
            self.ir = INSTR_IDCODE;
        }
    }

    fn falling_edge(&mut self) {
        match self.state {
            TapState::ShiftDr => self.tdo = self.dr_shift & 1 == 1,
            TapState::ShiftIr => self.tdo = self.ir_shift & 1 == 1,
            TapState::UpdateIr => {
                self.ir = match self.ir_shift {
                    INSTR_IDCODE | INSTR_LED => self.ir_shift,
                    _ => INSTR_BYPASS,
                };
                self.tdo = false;
            }
            TapState::UpdateDr => {
                if self.ir == INSTR_LED {
                    self.leds = AuxOutputs {
                        led1: (self.dr_shift & 0xFF) as u8,
                        led2: ((self.dr_shift >> 8) & 0xFF) as u8,
                    };
                }
                self.tdo = false;
            }
            _ => self.tdo = false,
        }
    }
}

impl Default for SimulatedTap {
    fn default() -> Self {
        Self::new(DEFAULT_IDCODE)
    }
}

impl DeviceAdapter for SimulatedTap {
    fn set_jtag_inputs(&mut self, pins: JtagPins) {
        self.inputs = pins;
    }

    fn evaluate(&mut self) {
        let tck = self.inputs.tck;
        if !self.reset_active {
            match (self.prev_tck, tck) {
                (false, true) => self.rising_edge(),
                (true, false) => self.falling_edge(),
                _ => {}
            }
        }
        self.prev_tck = tck;
    }

    fn tdo(&self) -> bool {
        self.tdo
    }

    fn aux_outputs(&self) -> AuxOutputs {
        self.leds
    }

    fn set_reset(&mut self, active: bool) {
        self.reset_active = active;
    }

    fn step_system_clock(&mut self) {
        self.system_cycles += 1;
        if self.reset_active {
            self.apply_system_reset();
        }
        // JTAG logic is clocked by TCK, so only the edge tracker follows the inputs here.
        self.prev_tck = self.inputs.tck;
    }

    fn finalize(&mut self) {
        self.finalized = true;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
