//! The three JTAG input lines driven by a signal-set command.
//!
//! # Bit assignments
//!
//! A signal-set command carries a 3-bit value `v` (the command byte minus
//! ASCII `'0'`).  Each bit drives one line:
//!
//! | Bit | Mask  | Line  |
//! |-----|-------|-------|
//! | 0   | `0b001` | `TDI` |
//! | 1   | `0b010` | `TMS` |
//! | 2   | `0b100` | `TCK` |
//!
//! So `'5'` (`v = 0b101`) means `TCK=1, TMS=0, TDI=1`.

/// Mask selecting the `TDI` bit of a signal-set value.
pub const TDI_MASK: u8 = 0b001;
/// Mask selecting the `TMS` bit of a signal-set value.
pub const TMS_MASK: u8 = 0b010;
/// Mask selecting the `TCK` bit of a signal-set value.
pub const TCK_MASK: u8 = 0b100;

/// Instantaneous state of the three JTAG input lines.
///
/// All three fields are always derived from one value and handed to the
/// device together, so a device never observes a half-applied update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JtagPins {
    /// Test clock.
    pub tck: bool,
    /// Test mode select.
    pub tms: bool,
    /// Test data in.
    pub tdi: bool,
}

impl JtagPins {
    /// Creates a pin set from individual line levels.
    pub const fn new(tck: bool, tms: bool, tdi: bool) -> Self {
        Self { tck, tms, tdi }
    }

    /// Extracts the three lines from a signal-set value.
    ///
    /// Only the low three bits are inspected; higher bits are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bitbang_core::JtagPins;
    ///
    /// let pins = JtagPins::from_bits(0b101);
    /// assert_eq!(pins, JtagPins::new(true, false, true));
    /// ```
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            tck: bits & TCK_MASK != 0,
            tms: bits & TMS_MASK != 0,
            tdi: bits & TDI_MASK != 0,
        }
    }

    /// Packs the three lines back into a signal-set value (`0..=7`).
    pub const fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.tck {
            bits |= TCK_MASK;
        }
        if self.tms {
            bits |= TMS_MASK;
        }
        if self.tdi {
            bits |= TDI_MASK;
        }
        bits
    }
}

impl std::fmt::Display for JtagPins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TCK={} TMS={} TDI={}",
            self.tck as u8, self.tms as u8, self.tdi as u8
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
