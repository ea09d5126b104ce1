//! # System Control
//!
//! The SYSCTL peripheral controls clocks and power.
//!
//! The TM4C123 can be clocked from the Main Oscillator or the 16 MHz
//! Precision Internal Oscillator (PIOSC), either directly (with a divider) or
//! through the 400 MHz PLL. Each peripheral has a clock gate in run, sleep and
//! deep-sleep modes, and a software reset.
//!
//! Clock set-up freezes into a [`Clocks`] value, which the peripheral
//! constructors take by reference.

pub use tm4c_core::sysctl::*;

use crate::bb;
use crate::time::Hertz;

/// Constrained SYSCTL peripheral.
pub struct Sysctl {
    /// Power control methods will require `&mut this.power_control` to
    /// prevent them from running concurrently.
    pub power_control: PowerControl,
    /// Clock configuration will require `&mut this.clock_setup` to prevent
    /// them from running concurrently.
    pub clock_setup: ClockSetup,
}

/// Used to gate access to the run-time power control features of the chip.
pub struct PowerControl {
    _0: (),
}

/// Used to configure the clock generators.
pub struct ClockSetup {
    /// The system oscillator configuration
    pub oscillator: Oscillator,
    // Make this type uncreatable
    _0: (),
}

/// Selects the system oscillator source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Oscillator {
    /// Use the main oscillator (with the given crystal frequency)
    Main(CrystalFrequency, SystemClock),
    /// Use the 16 MHz precision internal oscillator
    PrecisionInternal(SystemClock),
}

/// Clock divider applied when running straight from an oscillator, 1 to 64.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divider(u8);

impl Divider {
    /// No division
    pub const ONE: Divider = Divider(1);

    /// Checks `divisor` fits the 6-bit SYSDIV field
    #[inline]
    pub const fn new(divisor: u8) -> Option<Self> {
        if divisor >= 1 && divisor <= 64 {
            Some(Divider(divisor))
        } else {
            None
        }
    }

    /// The divisor
    #[inline]
    pub const fn divisor(self) -> u32 {
        self.0 as u32
    }
}

/// Selects the source for the system clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemClock {
    /// Clock the system directly from the system oscillator
    UseOscillator(Divider),
    /// Clock the system from the PLL
    UsePll(PllOutputFrequency),
}

/// Selects which crystal is fitted to the XOSC pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum CrystalFrequency {
    /// 4 MHz
    _4mhz,
    /// 5 MHz
    _5mhz,
    /// 6 MHz
    _6mhz,
    /// 8 MHz
    _8mhz,
    /// 10 MHz
    _10mhz,
    /// 12 MHz
    _12mhz,
    /// 16 MHz, as fitted to the LaunchPad
    _16mhz,
    /// 18 MHz
    _18mhz,
    /// 20 MHz
    _20mhz,
    /// 24 MHz
    _24mhz,
    /// 25 MHz
    _25mhz,
}

impl CrystalFrequency {
    /// RCC XTAL field value
    #[inline]
    pub const fn xtal(self) -> u32 {
        match self {
            CrystalFrequency::_4mhz => 0x06,
            CrystalFrequency::_5mhz => 0x09,
            CrystalFrequency::_6mhz => 0x0B,
            CrystalFrequency::_8mhz => 0x0E,
            CrystalFrequency::_10mhz => 0x10,
            CrystalFrequency::_12mhz => 0x11,
            CrystalFrequency::_16mhz => 0x15,
            CrystalFrequency::_18mhz => 0x17,
            CrystalFrequency::_20mhz => 0x18,
            CrystalFrequency::_24mhz => 0x19,
            CrystalFrequency::_25mhz => 0x1A,
        }
    }

    /// Crystal frequency
    #[inline]
    pub const fn hertz(self) -> Hertz {
        let mhz = match self {
            CrystalFrequency::_4mhz => 4,
            CrystalFrequency::_5mhz => 5,
            CrystalFrequency::_6mhz => 6,
            CrystalFrequency::_8mhz => 8,
            CrystalFrequency::_10mhz => 10,
            CrystalFrequency::_12mhz => 12,
            CrystalFrequency::_16mhz => 16,
            CrystalFrequency::_18mhz => 18,
            CrystalFrequency::_20mhz => 20,
            CrystalFrequency::_24mhz => 24,
            CrystalFrequency::_25mhz => 25,
        };
        Hertz(mhz * 1_000_000)
    }
}

/// Selects what to divide the PLL's 400 MHz down to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PllOutputFrequency {
    /// 80.00 MHz
    _80_00mhz = 4,
    /// 66.67 MHz
    _66_67mhz = 5,
    /// 57.14 MHz
    _57_14mhz = 6,
    /// 50.00 MHz
    _50_00mhz = 7,
    /// 44.44 MHz
    _44_44mhz = 8,
    /// 40.00 MHz
    _40_00mhz = 9,
    /// 25.00 MHz
    _25_00mhz = 15,
    /// 20.00 MHz
    _20_00mhz = 19,
    /// 16.00 MHz
    _16_00mhz = 24,
}

impl PllOutputFrequency {
    /// The combined SYSDIV2:SYSDIV2LSB value, `n` in `400 MHz / (n + 1)`
    #[inline]
    pub const fn sysdiv(self) -> u32 {
        self as u32
    }

    /// System clock frequency
    #[inline]
    pub const fn hertz(self) -> Hertz {
        Hertz(400_000_000 / (self.sysdiv() + 1))
    }
}

mod rcc {
    pub const MOSCDIS: u32 = 1 << 0;
    pub const XTAL_SHIFT: u32 = 6;
    pub const XTAL_MASK: u32 = 0x1F << XTAL_SHIFT;
    pub const USESYSDIV: u32 = 1 << 22;
}

mod rcc2 {
    pub const OSCSRC2_MAIN: u32 = 0x0 << 4;
    pub const OSCSRC2_PIOSC: u32 = 0x1 << 4;
    pub const BYPASS2: u32 = 1 << 11;
    pub const PWRDN2: u32 = 1 << 13;
    pub const SYSDIV2LSB: u32 = 1 << 22;
    pub const SYSDIV2_SHIFT: u32 = 23;
    pub const DIV400: u32 = 1 << 30;
    pub const USERCC2: u32 = 1 << 31;
}

mod ris {
    pub const PLLLRIS: u32 = 1 << 6;
    pub const MOSCPUPRIS: u32 = 1 << 8;
}

impl Oscillator {
    /// The frequencies this configuration produces
    pub const fn clocks(self) -> Clocks {
        let (osc, system) = match self {
            Oscillator::Main(crystal, system) => (crystal.hertz(), system),
            Oscillator::PrecisionInternal(system) => (PIOSC, system),
        };
        let sysclk = match system {
            SystemClock::UseOscillator(div) => Hertz(osc.0 / div.divisor()),
            SystemClock::UsePll(output) => output.hertz(),
        };
        Clocks { osc, sysclk }
    }

    /// Final RCC2 value, with the PLL no longer bypassed
    pub const fn rcc2(self) -> u32 {
        let (source, system) = match self {
            Oscillator::Main(_, system) => (rcc2::OSCSRC2_MAIN, system),
            Oscillator::PrecisionInternal(system) => (rcc2::OSCSRC2_PIOSC, system),
        };
        match system {
            SystemClock::UseOscillator(div) => {
                rcc2::USERCC2
                    | ((div.divisor() - 1) << rcc2::SYSDIV2_SHIFT)
                    | rcc2::PWRDN2
                    | rcc2::BYPASS2
                    | source
            }
            SystemClock::UsePll(output) => {
                let n = output.sysdiv();
                let mut value =
                    rcc2::USERCC2 | rcc2::DIV400 | ((n >> 1) << rcc2::SYSDIV2_SHIFT) | source;
                if n & 1 != 0 {
                    value |= rcc2::SYSDIV2LSB;
                }
                value
            }
        }
    }

    /// Final RCC value, keeping the reserved bits of `current`
    pub const fn rcc(self, current: u32) -> u32 {
        let mut value = current & !(rcc::XTAL_MASK | rcc::USESYSDIV);
        match self {
            Oscillator::Main(crystal, _) => {
                value &= !rcc::MOSCDIS;
                value |= crystal.xtal() << rcc::XTAL_SHIFT;
            }
            Oscillator::PrecisionInternal(_) => {
                value |= rcc::MOSCDIS;
                value |= CrystalFrequency::_16mhz.xtal() << rcc::XTAL_SHIFT;
            }
        }
        let divided = match self {
            Oscillator::Main(_, SystemClock::UseOscillator(div))
            | Oscillator::PrecisionInternal(SystemClock::UseOscillator(div)) => div.divisor() > 1,
            _ => true,
        };
        if divided {
            value |= rcc::USESYSDIV;
        }
        value
    }

    const fn uses_pll(self) -> bool {
        matches!(
            self,
            Oscillator::Main(_, SystemClock::UsePll(_))
                | Oscillator::PrecisionInternal(SystemClock::UsePll(_))
        )
    }
}

/// List of peripherals that can be enabled or disabled
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Domain {
    /// SSI0
    Ssi0,
    /// SSI1
    Ssi1,
    /// SSI2
    Ssi2,
    /// SSI3
    Ssi3,
    /// I2C0
    I2c0,
    /// I2C1
    I2c1,
    /// I2C2
    I2c2,
    /// I2C3
    I2c3,
    /// GPIO A
    GpioA,
    /// GPIO B
    GpioB,
    /// GPIO C
    GpioC,
    /// GPIO D
    GpioD,
    /// GPIO E
    GpioE,
    /// GPIO F
    GpioF,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Ssi,
    I2c,
    Gpio,
}

impl Domain {
    const fn family(self) -> (Family, u8) {
        match self {
            Domain::Ssi0 => (Family::Ssi, 0),
            Domain::Ssi1 => (Family::Ssi, 1),
            Domain::Ssi2 => (Family::Ssi, 2),
            Domain::Ssi3 => (Family::Ssi, 3),
            Domain::I2c0 => (Family::I2c, 0),
            Domain::I2c1 => (Family::I2c, 1),
            Domain::I2c2 => (Family::I2c, 2),
            Domain::I2c3 => (Family::I2c, 3),
            Domain::GpioA => (Family::Gpio, 0),
            Domain::GpioB => (Family::Gpio, 1),
            Domain::GpioC => (Family::Gpio, 2),
            Domain::GpioD => (Family::Gpio, 3),
            Domain::GpioE => (Family::Gpio, 4),
            Domain::GpioF => (Family::Gpio, 5),
        }
    }
}

/// Reset a peripheral
pub fn reset(_lock: &PowerControl, pd: Domain) {
    // We use bit-banding to make an atomic write, so this is safe
    let p = unsafe { &*tm4c123x::SYSCTL::ptr() };
    let (family, bit) = pd.family();
    unsafe {
        match family {
            Family::Ssi => bb::toggle_bit(&p.srssi, bit),
            Family::I2c => bb::toggle_bit(&p.sri2c, bit),
            Family::Gpio => bb::toggle_bit(&p.srgpio, bit),
        }
    }
    wait_ready(family, bit);
}

/// Activate or De-Activate clocks and power to the given peripheral in the
/// given run mode.
///
/// We take a reference to PowerControl as a permission check. We don't need
/// an &mut reference as we use atomic writes in the bit-banding area so it's
/// interrupt safe.
pub fn control_power(_lock: &PowerControl, pd: Domain, run_mode: RunMode, state: PowerState) {
    let on: bool = state.into();
    let p = unsafe { &*tm4c123x::SYSCTL::ptr() };
    let (family, bit) = pd.family();
    unsafe {
        match (run_mode, family) {
            (RunMode::Run, Family::Ssi) => bb::change_bit(&p.rcgcssi, bit, on),
            (RunMode::Run, Family::I2c) => bb::change_bit(&p.rcgci2c, bit, on),
            (RunMode::Run, Family::Gpio) => bb::change_bit(&p.rcgcgpio, bit, on),
            (RunMode::Sleep, Family::Ssi) => bb::change_bit(&p.scgcssi, bit, on),
            (RunMode::Sleep, Family::I2c) => bb::change_bit(&p.scgci2c, bit, on),
            (RunMode::Sleep, Family::Gpio) => bb::change_bit(&p.scgcgpio, bit, on),
            (RunMode::DeepSleep, Family::Ssi) => bb::change_bit(&p.dcgcssi, bit, on),
            (RunMode::DeepSleep, Family::I2c) => bb::change_bit(&p.dcgci2c, bit, on),
            (RunMode::DeepSleep, Family::Gpio) => bb::change_bit(&p.dcgcgpio, bit, on),
        }
    }
    if run_mode == RunMode::Run && on {
        wait_ready(family, bit);
    }
}

fn wait_ready(family: Family, bit: u8) {
    let p = unsafe { &*tm4c123x::SYSCTL::ptr() };
    match family {
        Family::Ssi => bb::spin_bit(&p.prssi, bit),
        Family::I2c => bb::spin_bit(&p.pri2c, bit),
        Family::Gpio => bb::spin_bit(&p.prgpio, bit),
    }
}

/// Extension trait that constrains the `SYSCTL` peripheral
pub trait SysctlExt {
    /// Constrains the `SYSCTL` peripheral so it plays nicely with the other
    /// abstractions
    fn constrain(self) -> Sysctl;
}

impl SysctlExt for tm4c123x::SYSCTL {
    fn constrain(self) -> Sysctl {
        Sysctl {
            power_control: PowerControl { _0: () },
            clock_setup: ClockSetup {
                oscillator: Oscillator::PrecisionInternal(SystemClock::UseOscillator(
                    Divider::ONE,
                )),
                _0: (),
            },
        }
    }
}

impl ClockSetup {
    /// Fix the clock configuration and produce a record of the configuration
    /// so that other modules can calibrate themselves (e.g. the SSI bit rate).
    pub fn freeze(self) -> Clocks {
        switch(&mut SysctlRegisters, self.oscillator);
        self.oscillator.clocks()
    }
}

/// The registers a clock switch goes through.
trait ClockRegisters {
    fn rcc(&self) -> u32;
    fn set_rcc(&mut self, value: u32);
    fn rcc2(&self) -> u32;
    fn set_rcc2(&mut self, value: u32);
    /// Raw interrupt status
    fn ris(&mut self) -> u32;
    /// Clears raw interrupt status flags through MISC
    fn clear(&mut self, flags: u32);
}

struct SysctlRegisters;

impl SysctlRegisters {
    fn block(&self) -> &'static tm4c123x::sysctl::RegisterBlock {
        unsafe { &*tm4c123x::SYSCTL::ptr() }
    }
}

impl ClockRegisters for SysctlRegisters {
    fn rcc(&self) -> u32 {
        self.block().rcc.read().bits()
    }

    fn set_rcc(&mut self, value: u32) {
        self.block().rcc.write(|w| unsafe { w.bits(value) });
    }

    fn rcc2(&self) -> u32 {
        self.block().rcc2.read().bits()
    }

    fn set_rcc2(&mut self, value: u32) {
        self.block().rcc2.write(|w| unsafe { w.bits(value) });
    }

    fn ris(&mut self) -> u32 {
        self.block().ris.read().bits()
    }

    fn clear(&mut self, flags: u32) {
        self.block().misc.write(|w| unsafe { w.bits(flags) });
    }
}

/// Moves the system clock over to `target`.
fn switch<R: ClockRegisters>(regs: &mut R, target: Oscillator) {
    // Run from the raw oscillator while the dividers and PLL change.
    let value = regs.rcc2() | rcc2::USERCC2 | rcc2::BYPASS2;
    regs.set_rcc2(value);
    let value = regs.rcc() & !rcc::USESYSDIV;
    regs.set_rcc(value);

    if let Oscillator::Main(..) = target {
        let value = regs.rcc() & !rcc::MOSCDIS;
        regs.set_rcc(value);
        while regs.ris() & ris::MOSCPUPRIS == 0 {}
    }

    let value = target.rcc(regs.rcc());
    regs.set_rcc(value);

    let final_rcc2 = target.rcc2();
    if target.uses_pll() {
        // A lock flag left from an earlier configuration must not count, so
        // the PLL goes down and the flag is cleared before it relocks.
        let value = regs.rcc2() | rcc2::PWRDN2;
        regs.set_rcc2(value);
        regs.clear(ris::PLLLRIS);
        regs.set_rcc2(final_rcc2 | rcc2::BYPASS2);
        while regs.ris() & ris::PLLLRIS == 0 {}
    }
    regs.set_rcc2(final_rcc2);
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLL_80: Oscillator =
        Oscillator::Main(CrystalFrequency::_16mhz, SystemClock::UsePll(PllOutputFrequency::_80_00mhz));

    #[test]
    fn pll_frequencies() {
        assert_eq!(PllOutputFrequency::_80_00mhz.hertz(), Hertz(80_000_000));
        assert_eq!(PllOutputFrequency::_50_00mhz.hertz(), Hertz(50_000_000));
        assert_eq!(PllOutputFrequency::_16_00mhz.hertz(), Hertz(16_000_000));
        assert_eq!(PllOutputFrequency::_66_67mhz.hertz(), Hertz(66_666_666));
    }

    #[test]
    fn frozen_frequencies() {
        assert_eq!(
            PLL_80.clocks(),
            Clocks {
                osc: Hertz(16_000_000),
                sysclk: Hertz(80_000_000)
            }
        );
        let piosc_by_4 = Oscillator::PrecisionInternal(SystemClock::UseOscillator(
            Divider::new(4).unwrap(),
        ));
        assert_eq!(piosc_by_4.clocks().sysclk, Hertz(4_000_000));
        let crystal = Oscillator::Main(
            CrystalFrequency::_25mhz,
            SystemClock::UseOscillator(Divider::ONE),
        );
        assert_eq!(crystal.clocks().sysclk, Hertz(25_000_000));
    }

    #[test]
    fn divider_range() {
        assert_eq!(Divider::new(0), None);
        assert_eq!(Divider::new(65), None);
        assert_eq!(Divider::new(64).map(Divider::divisor), Some(64));
    }

    #[test]
    fn rcc2_for_pll() {
        // 80 MHz: SYSDIV2 = 2, SYSDIV2LSB = 0, DIV400.
        assert_eq!(PLL_80.rcc2(), 0xC100_0000);
        let odd = Oscillator::PrecisionInternal(SystemClock::UsePll(PllOutputFrequency::_50_00mhz));
        // n = 7: SYSDIV2 = 3, SYSDIV2LSB = 1, PIOSC source.
        assert_eq!(odd.rcc2(), 0xC000_0000 | (3 << 23) | (1 << 22) | (1 << 4));
    }

    #[test]
    fn rcc2_without_pll_keeps_it_off() {
        let direct = Oscillator::PrecisionInternal(SystemClock::UseOscillator(
            Divider::new(2).unwrap(),
        ));
        let value = direct.rcc2();
        assert_ne!(value & rcc2::BYPASS2, 0);
        assert_ne!(value & rcc2::PWRDN2, 0);
        assert_eq!((value >> rcc2::SYSDIV2_SHIFT) & 0x3F, 1);
    }

    #[test]
    fn rcc_crystal_and_divider() {
        let value = PLL_80.rcc(0xFFFF_FFFF);
        assert_eq!((value & rcc::XTAL_MASK) >> rcc::XTAL_SHIFT, 0x15);
        assert_eq!(value & rcc::MOSCDIS, 0);
        assert_ne!(value & rcc::USESYSDIV, 0);

        let undivided = Oscillator::PrecisionInternal(SystemClock::UseOscillator(Divider::ONE));
        let value = undivided.rcc(0);
        assert_ne!(value & rcc::MOSCDIS, 0);
        assert_eq!(value & rcc::USESYSDIV, 0);
    }

    #[derive(Debug, PartialEq)]
    enum Write {
        Rcc(u32),
        Rcc2(u32),
        Clear(u32),
    }

    /// RCC reset value: main oscillator disabled, PLL bypassed.
    const RCC_RESET: u32 = 0x078E_3AD1;
    /// RCC2 reset value
    const RCC2_RESET: u32 = 0x07C0_6810;

    /// Clock registers whose PLL takes a few status polls to lock.
    struct MockClock {
        rcc: u32,
        rcc2: u32,
        ris: u32,
        pll_locked: bool,
        polls_to_lock: u32,
        released_unlocked: bool,
        writes: Vec<Write>,
    }

    impl MockClock {
        fn after_reset() -> Self {
            MockClock {
                rcc: RCC_RESET,
                rcc2: RCC2_RESET,
                ris: 0,
                pll_locked: false,
                polls_to_lock: 0,
                released_unlocked: false,
                writes: Vec::new(),
            }
        }

        /// Already running from a locked PLL, its lock flag still raised.
        fn running_from_pll() -> Self {
            MockClock {
                rcc: PLL_80.rcc(RCC_RESET),
                rcc2: PLL_80.rcc2(),
                ris: ris::PLLLRIS | ris::MOSCPUPRIS,
                pll_locked: true,
                ..MockClock::after_reset()
            }
        }

        fn position(&self, write: Write) -> Option<usize> {
            self.writes.iter().position(|w| *w == write)
        }
    }

    impl ClockRegisters for MockClock {
        fn rcc(&self) -> u32 {
            self.rcc
        }

        fn set_rcc(&mut self, value: u32) {
            if self.rcc & rcc::MOSCDIS != 0 && value & rcc::MOSCDIS == 0 {
                self.ris |= ris::MOSCPUPRIS;
            }
            self.rcc = value;
            self.writes.push(Write::Rcc(value));
        }

        fn rcc2(&self) -> u32 {
            self.rcc2
        }

        fn set_rcc2(&mut self, value: u32) {
            let was_on = self.rcc2 & rcc2::PWRDN2 == 0;
            let on = value & rcc2::PWRDN2 == 0;
            if !on {
                self.pll_locked = false;
            } else if !was_on {
                self.polls_to_lock = 3;
            }
            if on && value & rcc2::BYPASS2 == 0 && !self.pll_locked {
                self.released_unlocked = true;
            }
            self.rcc2 = value;
            self.writes.push(Write::Rcc2(value));
        }

        fn ris(&mut self) -> u32 {
            if self.rcc2 & rcc2::PWRDN2 == 0 && !self.pll_locked {
                self.polls_to_lock = self.polls_to_lock.saturating_sub(1);
                if self.polls_to_lock == 0 {
                    self.pll_locked = true;
                    self.ris |= ris::PLLLRIS;
                }
            }
            self.ris
        }

        fn clear(&mut self, flags: u32) {
            self.ris &= !flags;
            self.writes.push(Write::Clear(flags));
        }
    }

    #[test]
    fn switch_from_reset_to_pll() {
        let mut regs = MockClock::after_reset();
        switch(&mut regs, PLL_80);
        assert!(!regs.released_unlocked);
        assert_eq!(regs.rcc, PLL_80.rcc(RCC_RESET));
        assert_eq!(regs.writes.last(), Some(&Write::Rcc2(PLL_80.rcc2())));
    }

    #[test]
    fn stale_pll_lock_flag_is_not_trusted() {
        let mut regs = MockClock::running_from_pll();
        switch(&mut regs, PLL_80);
        assert!(!regs.released_unlocked);

        let cleared = regs.position(Write::Clear(ris::PLLLRIS)).unwrap();
        let relock = regs
            .position(Write::Rcc2(PLL_80.rcc2() | rcc2::BYPASS2))
            .unwrap();
        assert!(cleared < relock);
        assert_eq!(regs.writes.last(), Some(&Write::Rcc2(PLL_80.rcc2())));
    }

    #[test]
    fn switch_without_pll_leaves_lock_flag_alone() {
        let direct = Oscillator::PrecisionInternal(SystemClock::UseOscillator(
            Divider::new(2).unwrap(),
        ));
        let mut regs = MockClock::running_from_pll();
        switch(&mut regs, direct);
        assert_eq!(regs.position(Write::Clear(ris::PLLLRIS)), None);
        assert_eq!(regs.rcc2, direct.rcc2());
        assert_ne!(regs.rcc2 & rcc2::PWRDN2, 0);
    }

    #[test]
    fn power_states() {
        assert!(bool::from(PowerState::On));
        assert!(!bool::from(PowerState::Off));
    }
}
