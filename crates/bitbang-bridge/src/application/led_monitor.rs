//! Change detection for the device's auxiliary (LED) outputs.

use bitbang_core::AuxOutputs;

/// Remembers the last observed auxiliary outputs.
///
/// Purely diagnostic: nothing in the protocol depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedMonitor {
    previous: AuxOutputs,
}

impl LedMonitor {
    /// Starts watching from `initial`.
    pub fn new(initial: AuxOutputs) -> Self {
        Self { previous: initial }
    }

    /// Records `current` and returns it if it differs from the last value.
    pub fn observe(&mut self, current: AuxOutputs) -> Option<AuxOutputs> {
        if current == self.previous {
            return None;
        }
        self.previous = current;
        Some(current)
    }

    pub fn last(&self) -> AuxOutputs {
        self.previous
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
