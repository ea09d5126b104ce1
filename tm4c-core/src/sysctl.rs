//! System control types shared by every chip: frozen clock frequencies and
//! the power-gating vocabulary.

use crate::time::Hertz;

/// Frequency of the precision internal oscillator (PIOSC).
pub const PIOSC: Hertz = Hertz(16_000_000);

/// Frozen clock frequencies
///
/// The existence of this value indicates that the clock configuration can no
/// longer be changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clocks {
    /// Frequency of the oscillator feeding the system clock tree
    pub osc: Hertz,
    /// System clock frequency
    pub sysclk: Hertz,
}

/// Which clock-gating register set a power change applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Normal run mode (RCGC registers)
    Run,
    /// Sleep mode (SCGC registers)
    Sleep,
    /// Deep-sleep mode (DCGC registers)
    DeepSleep,
}

/// Whether a peripheral is clocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// Clock gated off
    Off,
    /// Clock running
    On,
}

impl From<PowerState> for bool {
    #[inline]
    fn from(state: PowerState) -> bool {
        state == PowerState::On
    }
}
