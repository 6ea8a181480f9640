//! Remote-bitbang command decoder.
//!
//! The protocol has no framing, no handshake and no length prefixes: every
//! byte the host sends is one complete command.
//!
//! # Command table
//!
//! | Byte          | Command                          | Host response   |
//! |---------------|----------------------------------|-----------------|
//! | `'0'`..`'7'`  | [`Command::SetPins`]             | none            |
//! | `'R'`         | [`Command::ReadTdo`]             | `'0'` or `'1'`  |
//! | `'Q'`         | [`Command::Quit`]                | connection closed |
//! | `'B'` / `'b'` | [`NoOp::BlinkOn`] / [`NoOp::BlinkOff`] | none      |
//! | `'r'` / `'s'` | [`NoOp::SoftReset`]              | none            |
//! | anything else | [`NoOp::Unrecognized`]           | none            |
//!
//! Decoding is total: every `u8` maps to some [`Command`], so a stray byte
//! can never abort a session.

use crate::domain::pins::JtagPins;

/// Byte requesting a read of `TDO`.
pub const READ_TDO: u8 = b'R';
/// Byte ending the session and the bridge.
pub const QUIT: u8 = b'Q';
/// Byte switching the host's activity indicator on.
pub const BLINK_ON: u8 = b'B';
/// Byte switching the host's activity indicator off.
pub const BLINK_OFF: u8 = b'b';
/// Reset request with both `TRST` and `SRST` released.
pub const RESET_RELEASE: u8 = b'r';
/// Reset request with `SRST` asserted.
pub const RESET_SYSTEM: u8 = b's';

/// A decoded remote-bitbang command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive `TCK`, `TMS` and `TDI` to the given levels, then evaluate.
    SetPins(JtagPins),
    /// Report the current `TDO` level without touching the device.
    ReadTdo,
    /// End the serve loop.
    Quit,
    /// Accepted for compatibility; has no effect on the device.
    NoOp(NoOp),
}

/// Commands that are accepted but deliberately do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    BlinkOn,
    BlinkOff,
    /// `'r'` (`srst == false`) or `'s'` (`srst == true`).
    SoftReset { srst: bool },
    /// A byte outside the protocol.
    Unrecognized(u8),
}

/// Classifies one inbound byte.
///
/// # Examples
///
/// ```rust
/// use bitbang_core::{decode_command, Command, JtagPins};
///
/// assert_eq!(
///     decode_command(b'5'),
///     Command::SetPins(JtagPins::new(true, false, true))
/// );
/// assert_eq!(decode_command(b'R'), Command::ReadTdo);
/// ```
pub fn decode_command(byte: u8) -> Command {
    match byte {
        b'0'..=b'7' => Command::SetPins(JtagPins::from_bits(byte - b'0')),
        READ_TDO => Command::ReadTdo,
        QUIT => Command::Quit,
        BLINK_ON => Command::NoOp(NoOp::BlinkOn),
        BLINK_OFF => Command::NoOp(NoOp::BlinkOff),
        RESET_RELEASE => Command::NoOp(NoOp::SoftReset { srst: false }),
        RESET_SYSTEM => Command::NoOp(NoOp::SoftReset { srst: true }),
        other => Command::NoOp(NoOp::Unrecognized(other)),
    }
}

impl Command {
    /// Returns the wire byte for this command.
    ///
    /// This is the host side of [`decode_command`]; it is what a debugger
    /// would send to produce the command.
    pub fn as_byte(self) -> u8 {
        match self {
            Command::SetPins(pins) => b'0' + pins.to_bits(),
            Command::ReadTdo => READ_TDO,
            Command::Quit => QUIT,
            Command::NoOp(NoOp::BlinkOn) => BLINK_ON,
            Command::NoOp(NoOp::BlinkOff) => BLINK_OFF,
            Command::NoOp(NoOp::SoftReset { srst: false }) => RESET_RELEASE,
            Command::NoOp(NoOp::SoftReset { srst: true }) => RESET_SYSTEM,
            Command::NoOp(NoOp::Unrecognized(byte)) => byte,
        }
    }
}

/// Encodes a `TDO` level as the single response byte.
pub fn encode_tdo(tdo: bool) -> u8 {
    if tdo {
        b'1'
    } else {
        b'0'
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_digit_bytes_extract_tdi_tms_tck() {
        for b in b'0'..=b'7' {
            let v = b - b'0';
            let expected = JtagPins {
                tdi: v & 1 == 1,
                tms: (v >> 1) & 1 == 1,
                tck: (v >> 2) & 1 == 1,
            };
            assert_eq!(decode_command(b), Command::SetPins(expected), "byte {b:#04x}");
        }
    }

    #[test]
    fn test_decode_five_sets_tck_and_tdi() {
        // '5' = 0x35 → 5 = 0b101
        assert_eq!(
            decode_command(0x35),
            Command::SetPins(JtagPins { tck: true, tms: false, tdi: true })
        );
    }

    #[test]
    fn test_decode_three_sets_tms_and_tdi() {
        assert_eq!(
            decode_command(b'3'),
            Command::SetPins(JtagPins { tck: false, tms: true, tdi: true })
        );
    }

    #[test]
    fn test_decode_read_and_quit() {
        assert_eq!(decode_command(b'R'), Command::ReadTdo);
        assert_eq!(decode_command(b'Q'), Command::Quit);
    }

    #[test]
    fn test_decode_blink_and_reset_are_noops() {
        assert_eq!(decode_command(b'B'), Command::NoOp(NoOp::BlinkOn));
        assert_eq!(decode_command(b'b'), Command::NoOp(NoOp::BlinkOff));
        assert_eq!(
            decode_command(b'r'),
            Command::NoOp(NoOp::SoftReset { srst: false })
        );
        assert_eq!(
            decode_command(b's'),
            Command::NoOp(NoOp::SoftReset { srst: true })
        );
    }

    #[test]
    fn test_decode_neighbouring_bytes_are_unrecognized() {
        // '8', '/', 'q', 't' and 'u' all sit next to valid commands.
        for b in [b'8', b'/', b'q', b't', b'u', 0x00, 0xFF] {
            assert_eq!(decode_command(b), Command::NoOp(NoOp::Unrecognized(b)));
        }
    }

    #[test]
    fn test_as_byte_inverts_decode_for_every_byte() {
        for b in 0..=u8::MAX {
            assert_eq!(decode_command(b).as_byte(), b);
        }
    }

    #[test]
    fn test_encode_tdo_uses_ascii_digits() {
        assert_eq!(encode_tdo(true), b'1');
        assert_eq!(encode_tdo(false), b'0');
    }
}
