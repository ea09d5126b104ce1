//! Code for busy-waiting

use crate::sysctl::Clocks;
use cortex_m::peripheral::{syst::SystClkSource, SYST};
use embedded_hal::delay::DelayNs;

/// SysTick's reload register is 24 bits wide.
const MAX_RELOAD: u32 = (1 << 24) - 1;

/// Splits a wait of `ns` nanoseconds, at `tick_ns` nanoseconds per tick, into
/// full SysTick periods of `MAX_RELOAD` ticks and a remaining reload value.
pub fn systick_plan(ns: u32, tick_ns: u32) -> (u32, u32) {
    let ticks = ns.div_ceil(tick_ns);
    (ticks / MAX_RELOAD, ticks % MAX_RELOAD)
}

/// System timer (SysTick) as a delay provider
pub struct Delay {
    tick_ns: u32,
    syst: SYST,
}

impl Delay {
    /// Configures the system timer (SysTick) as a delay provider. Gives `None`
    /// for a stopped system clock.
    #[inline]
    pub fn new(mut syst: SYST, clocks: &Clocks) -> Option<Self> {
        let tick_ns = clocks.sysclk.to_ns()?;
        syst.set_clock_source(SystClkSource::Core);

        Some(Delay { syst, tick_ns })
    }

    /// Releases the system timer (SysTick) resource
    pub fn free(self) -> SYST {
        self.syst
    }

    fn wait_ticks(&mut self, reload: u32) {
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_counter();
        while !self.syst.has_wrapped() {}
        self.syst.disable_counter();
    }
}

impl DelayNs for Delay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        let (periods, remainder) = systick_plan(ns, self.tick_ns);
        for _ in 0..periods {
            self.wait_ticks(MAX_RELOAD);
        }
        if remainder != 0 {
            self.wait_ticks(remainder);
        }
    }
}
