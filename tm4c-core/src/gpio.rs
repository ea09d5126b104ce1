//! Code for GPIO pins
//!
//! Pins are type-states: a pin's mode is part of its type, and changing mode
//! consumes the pin and hands back one of a new type. The per-port code is
//! generated by [`gpio_macro!`](crate::gpio_macro) in the chip crates.

use core::marker::PhantomData;

/// All unlocked pin modes implement this
pub trait IsUnlocked {}

/// All input modes implement this
pub trait InputMode {}

/// All output modes implement this
pub trait OutputMode {}

/// OpenDrain modes implement this
pub trait OpenDrainMode {
    /// Is pull-up enabled
    fn pup() -> bool;
}

/// All the different Alternate Functions you can choose implement this
pub trait AlternateFunctionChoice {
    /// Which Alternate Function (numbered 1 through 15) is this?
    fn number() -> u32;
}

/// Input mode (type state)
pub struct Input<MODE>
where
    MODE: InputMode,
{
    _mode: PhantomData<MODE>,
}
impl<MODE> IsUnlocked for Input<MODE> where MODE: InputMode {}

/// Sub-mode of Input: Floating input (type state)
pub struct Floating;
impl InputMode for Floating {}
impl OpenDrainMode for Floating {
    #[inline]
    fn pup() -> bool {
        false
    }
}

/// Sub-mode of Input: Pulled down input (type state)
pub struct PullDown;
impl InputMode for PullDown {}

/// Sub-mode of Input: Pulled up input (type state)
pub struct PullUp;
impl InputMode for PullUp {}
impl OpenDrainMode for PullUp {
    #[inline]
    fn pup() -> bool {
        true
    }
}

/// Tri-state
pub struct Tristate;
impl IsUnlocked for Tristate {}

/// Analog input, with the digital buffer disconnected (type state)
pub struct Analog;
impl IsUnlocked for Analog {}

/// Output mode (type state)
pub struct Output<MODE>
where
    MODE: OutputMode,
{
    _mode: PhantomData<MODE>,
}
impl<MODE> IsUnlocked for Output<MODE> where MODE: OutputMode {}

/// AlternateFunction mode (type state for a GPIO pin)
pub struct AlternateFunction<AF, MODE>
where
    AF: AlternateFunctionChoice,
    MODE: OutputMode,
{
    _func: PhantomData<AF>,
    _mode: PhantomData<MODE>,
}
impl<AF, MODE> IsUnlocked for AlternateFunction<AF, MODE>
where
    AF: AlternateFunctionChoice,
    MODE: OutputMode,
{
}

/// Sub-mode of Output/AlternateFunction: Push pull output (type state for
/// Output)
pub struct PushPull;
impl OutputMode for PushPull {}
impl OutputMode for PullDown {}
impl OutputMode for PullUp {}

/// Sub-mode of Output/AlternateFunction: Open drain output (type state for
/// Output)
pub struct OpenDrain<ODM>
where
    ODM: OpenDrainMode,
{
    _pull: PhantomData<ODM>,
}
impl<ODM> OutputMode for OpenDrain<ODM> where ODM: OpenDrainMode {}

macro_rules! alternate_functions {
    ($($AF:ident: $n:expr,)+) => {
        $(
            #[doc = concat!("Alternate function ", stringify!($n), " (type state)")]
            pub struct $AF;
            impl AlternateFunctionChoice for $AF {
                #[inline]
                fn number() -> u32 {
                    $n
                }
            }
        )+
    };
}

// 10 through 13 are not available on this chip.
alternate_functions! {
    AF1: 1,
    AF2: 2,
    AF3: 3,
    AF4: 4,
    AF5: 5,
    AF6: 6,
    AF7: 7,
    AF8: 8,
    AF9: 9,
    AF14: 14,
    AF15: 15,
}

/// Pin is locked through the GPIOCR register
pub struct Locked;

/// Value that unlocks the GPIOCR register when written to GPIOLOCK.
pub const UNLOCK_KEY: u32 = 0x4C4F_434B;

/// Pad settings applied when a pin changes mode, one bit per register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadConfig {
    /// GPIOAFSEL: peripheral controls the pin
    pub afsel: bool,
    /// GPIODIR: output
    pub dir: bool,
    /// GPIOODR: open drain
    pub odr: bool,
    /// GPIOPUR: weak pull-up
    pub pur: bool,
    /// GPIOPDR: weak pull-down
    pub pdr: bool,
    /// GPIODEN: digital buffer enabled
    pub den: bool,
    /// GPIOAMSEL: analog function connected
    pub amsel: bool,
}

impl PadConfig {
    const DIGITAL: PadConfig = PadConfig {
        afsel: false,
        dir: false,
        odr: false,
        pur: false,
        pdr: false,
        den: true,
        amsel: false,
    };

    /// Floating input
    pub const FLOATING_INPUT: PadConfig = PadConfig::DIGITAL;

    /// Input with pull-up
    pub const PULL_UP_INPUT: PadConfig = PadConfig {
        pur: true,
        ..PadConfig::DIGITAL
    };

    /// Input with pull-down
    pub const PULL_DOWN_INPUT: PadConfig = PadConfig {
        pdr: true,
        ..PadConfig::DIGITAL
    };

    /// Push-pull output
    pub const PUSH_PULL_OUTPUT: PadConfig = PadConfig {
        dir: true,
        ..PadConfig::DIGITAL
    };

    /// Neither driven nor sensed
    pub const TRI_STATE: PadConfig = PadConfig {
        den: false,
        ..PadConfig::DIGITAL
    };

    /// Analog input
    pub const ANALOG: PadConfig = PadConfig {
        den: false,
        amsel: true,
        ..PadConfig::DIGITAL
    };

    /// Open drain output, optionally with the pull-up
    #[inline]
    pub const fn open_drain_output(pull_up: bool) -> PadConfig {
        PadConfig {
            dir: true,
            odr: true,
            pur: pull_up,
            ..PadConfig::DIGITAL
        }
    }

    /// Pin handed to a peripheral
    #[inline]
    pub const fn alternate(open_drain: bool, pull_up: bool, pull_down: bool) -> PadConfig {
        PadConfig {
            afsel: true,
            odr: open_drain,
            pur: pull_up,
            pdr: pull_down,
            ..PadConfig::DIGITAL
        }
    }
}

/// Returns GPIOPCTL with pin `i` switched to alternate function `af`.
#[inline]
pub const fn pctl_with(pctl: u32, i: u8, af: u32) -> u32 {
    let shift = i as u32 * 4;
    (pctl & !(0xF << shift)) | ((af & 0xF) << shift)
}

/// Offset from the port base of the data window that only touches the pins
/// in `mask`. Address bits 9:2 mask GPIODATA accesses.
#[inline]
pub const fn masked_data_offset(mask: u8) -> usize {
    (mask as usize) << 2
}

/// Output pad drive strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveStrength {
    /// 2 mA (reset default)
    Ma2,
    /// 4 mA
    Ma4,
    /// 8 mA
    Ma8,
}

impl DriveStrength {
    /// Drive current in milliamps
    #[inline]
    pub const fn milliamps(self) -> u8 {
        match self {
            DriveStrength::Ma2 => 2,
            DriveStrength::Ma4 => 4,
            DriveStrength::Ma8 => 8,
        }
    }
}

/// Sets when a GPIO pin triggers an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptMode {
    /// Interrupt when level is low
    LevelLow,
    /// Interrupt when level is high
    LevelHigh,
    /// Interrupt on rising edge
    EdgeRising,
    /// Interrupt on falling edge
    EdgeFalling,
    /// Interrupt on both rising and falling edges
    EdgeBoth,
    /// Disable interrupts on this pin
    Disabled,
}

/// GPIOIS / GPIOIBE / GPIOIEV bits for one pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptSense {
    /// GPIOIS: level sensitive
    pub level: bool,
    /// GPIOIBE: both edges (overrides `high`)
    pub both_edges: bool,
    /// GPIOIEV: high level or rising edge
    pub high: bool,
}

impl InterruptMode {
    /// Sense bits for this mode, or `None` when the pin is masked.
    #[inline]
    pub const fn sense(self) -> Option<InterruptSense> {
        let (level, both_edges, high) = match self {
            InterruptMode::LevelLow => (true, false, false),
            InterruptMode::LevelHigh => (true, false, true),
            InterruptMode::EdgeRising => (false, false, true),
            InterruptMode::EdgeFalling => (false, false, false),
            InterruptMode::EdgeBoth => (false, true, true),
            InterruptMode::Disabled => return None,
        };
        Some(InterruptSense {
            level,
            both_edges,
            high,
        })
    }
}

/// An internal macro to implement the GPIO functionality for each port
#[allow(clippy::crate_in_macro_def)] // We want to use the macro call's crate for `Sealed`
#[macro_export]
macro_rules! gpio_macro {
    ($chip_crate:ident, $GPIOX:ident, $gpiox:ident, $iopd:ident, $PXx:ident, [
        $($PXi:ident: ($pxi:ident, $i:expr, $MODE:ty),)+
    ]) => {
        /// GPIO
        pub mod $gpiox {
            use super::*;
            use $chip_crate::$GPIOX;

            #[inline]
            fn regs() -> &'static <$GPIOX as ::core::ops::Deref>::Target {
                unsafe { &*$GPIOX::ptr() }
            }

            fn configure(i: u8, pad: PadConfig) {
                let p = regs();
                // Disconnect the digital side before changing anything else.
                if !pad.den {
                    unsafe { bb::change_bit(&p.den, i, false); }
                }
                unsafe {
                    bb::change_bit(&p.afsel, i, pad.afsel);
                    bb::change_bit(&p.dir, i, pad.dir);
                    bb::change_bit(&p.odr, i, pad.odr);
                    bb::change_bit(&p.pur, i, pad.pur);
                    bb::change_bit(&p.pdr, i, pad.pdr);
                    bb::change_bit(&p.amsel, i, pad.amsel);
                }
                if pad.den {
                    unsafe { bb::change_bit(&p.den, i, true); }
                }
            }

            fn select_function(i: u8, af: u32) {
                regs().pctl.modify(|r, w| unsafe { w.bits(pctl_with(r.bits(), i, af)) });
            }

            fn set_drive(i: u8, strength: DriveStrength) {
                let p = regs();
                // Setting a bit in one of the three registers clears it in
                // the other two.
                unsafe {
                    match strength {
                        DriveStrength::Ma2 => bb::change_bit(&p.dr2r, i, true),
                        DriveStrength::Ma4 => bb::change_bit(&p.dr4r, i, true),
                        DriveStrength::Ma8 => bb::change_bit(&p.dr8r, i, true),
                    }
                }
            }

            #[inline]
            fn level(i: u8) -> bool {
                bb::read_bit(&regs().data, i)
            }

            #[inline]
            fn drive(i: u8, high: bool) {
                unsafe { bb::change_bit(&regs().data, i, high); }
            }

            fn interrupt_mode(i: u8, mode: InterruptMode) {
                let p = regs();
                unsafe { bb::change_bit(&p.im, i, false); }
                if let Some(sense) = mode.sense() {
                    unsafe {
                        bb::change_bit(&p.is, i, sense.level);
                        bb::change_bit(&p.ibe, i, sense.both_edges);
                        bb::change_bit(&p.iev, i, sense.high);
                        bb::change_bit(&p.icr, i, true);
                        bb::change_bit(&p.im, i, true);
                    }
                }
            }

            /// Provides mutual-exclusion for certain GPIO operations (such as
            /// selecting an alternate mode) that can't be done atomically.
            pub struct GpioControl {
                _0: (),
            }

            impl GpioControl {
                /// Reads the level of every pin on the port
                #[inline]
                pub fn read_port(&self) -> u8 {
                    regs().data.read().bits() as u8
                }

                /// Drives the pins selected by `mask` to the matching bits of
                /// `value`, leaving the rest of the port alone. Pins that are
                /// not outputs ignore the write.
                #[inline]
                pub fn write_port(&mut self, mask: u8, value: u8) {
                    let window = ($GPIOX::ptr() as usize + masked_data_offset(mask)) as *mut u32;
                    unsafe { ::core::ptr::write_volatile(window, u32::from(value)) };
                }
            }

            /// GPIO parts
            pub struct Parts {
                /// Pass an &mut reference to methods that require it.
                pub control: GpioControl,
                $(
                    /// Pin
                    pub $pxi: $PXi<$MODE>,
                )+
            }

            impl GpioExt for $GPIOX {
                type Parts = Parts;

                /// Break this GPIO port into separate pins
                #[inline]
                fn split(self, pc: &sysctl::PowerControl) -> Parts {
                    sysctl::control_power(
                        pc, sysctl::Domain::$iopd,
                        sysctl::RunMode::Run, sysctl::PowerState::On);
                    sysctl::reset(pc, sysctl::Domain::$iopd);

                    Parts {
                        control: GpioControl { _0: () },
                        $(
                            $pxi: $PXi { _mode: PhantomData },
                        )+
                    }
                }
            }

            /// Partially erased pin
            pub struct $PXx<MODE> {
                i: u8,
                _mode: PhantomData<MODE>,
            }

            impl<MODE> $PXx<MODE> {
                /// Pin number within the port
                #[inline]
                pub fn pin_number(&self) -> u8 {
                    self.i
                }
            }

            impl<MODE> embedded_hal::digital::ErrorType for $PXx<Output<MODE>> where MODE: OutputMode {
                type Error = ::core::convert::Infallible;
            }

            impl<MODE> embedded_hal::digital::StatefulOutputPin for $PXx<Output<MODE>> where MODE: OutputMode {
                #[inline]
                fn is_set_high(&mut self) -> Result<bool, Self::Error> {
                    Ok(level(self.i))
                }

                #[inline]
                fn is_set_low(&mut self) -> Result<bool, Self::Error> {
                    Ok(!level(self.i))
                }
            }

            impl<MODE> embedded_hal::digital::OutputPin for $PXx<Output<MODE>> where MODE: OutputMode {
                #[inline]
                fn set_high(&mut self) -> Result<(), Self::Error> {
                    drive(self.i, true);
                    Ok(())
                }

                #[inline]
                fn set_low(&mut self) -> Result<(), Self::Error> {
                    drive(self.i, false);
                    Ok(())
                }
            }

            impl<MODE> embedded_hal::digital::ErrorType for $PXx<Input<MODE>> where MODE: InputMode {
                type Error = ::core::convert::Infallible;
            }

            impl<MODE> embedded_hal::digital::InputPin for $PXx<Input<MODE>> where MODE: InputMode {
                #[inline]
                fn is_high(&mut self) -> Result<bool, Self::Error> {
                    Ok(level(self.i))
                }

                #[inline]
                fn is_low(&mut self) -> Result<bool, Self::Error> {
                    Ok(!level(self.i))
                }
            }

            impl<MODE> $PXx<Input<MODE>> where MODE: InputMode {
                /// Enables or disables interrupts on this GPIO pin.
                #[inline]
                pub fn set_interrupt_mode(&mut self, mode: InterruptMode) {
                    interrupt_mode(self.i, mode);
                }

                /// Returns the current interrupt status for this pin.
                #[inline]
                pub fn get_interrupt_status(&self) -> bool {
                    bb::read_bit(&regs().mis, self.i)
                }

                /// Marks the interrupt for this pin as handled.
                #[inline]
                pub fn clear_interrupt(&self) {
                    unsafe { bb::change_bit(&regs().icr, self.i, true); }
                }
            }

            $(
                /// Pin
                pub struct $PXi<MODE> {
                    _mode: PhantomData<MODE>,
                }

                impl<MODE> crate::Sealed for $PXi<MODE> {}

                impl<MODE> $PXi<MODE> where MODE: IsUnlocked {
                    fn into_alternate<AF, NEW>(self, pad: PadConfig) -> $PXi<NEW>
                    where
                        AF: AlternateFunctionChoice,
                    {
                        select_function($i, AF::number());
                        configure($i, pad);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to serve as alternate function 1 through 15.
                    /// Disables open-drain to make the output a push-pull.
                    pub fn into_af_push_pull<AF>(
                        self,
                        _gpio_control: &mut GpioControl,
                    ) -> $PXi<AlternateFunction<AF, PushPull>> where AF: AlternateFunctionChoice {
                        self.into_alternate::<AF, _>(PadConfig::alternate(false, false, false))
                    }

                    /// Configures the pin to serve as alternate function 1 through 15 with
                    /// a weak pull-up resistor.
                    pub fn into_af_pull_up<AF>(
                        self,
                        _gpio_control: &mut GpioControl,
                    ) -> $PXi<AlternateFunction<AF, PullUp>> where AF: AlternateFunctionChoice {
                        self.into_alternate::<AF, _>(PadConfig::alternate(false, true, false))
                    }

                    /// Configures the pin to serve as alternate function 1 through 15 with
                    /// a weak pull-down resistor.
                    pub fn into_af_pull_down<AF>(
                        self,
                        _gpio_control: &mut GpioControl,
                    ) -> $PXi<AlternateFunction<AF, PullDown>> where AF: AlternateFunctionChoice {
                        self.into_alternate::<AF, _>(PadConfig::alternate(false, false, true))
                    }

                    /// Configures the pin to serve as alternate function 1 through 15.
                    /// Enables open-drain (I2C SDA needs this).
                    pub fn into_af_open_drain<AF, ODM>(
                        self,
                        _gpio_control: &mut GpioControl,
                    ) -> $PXi<AlternateFunction<AF, OpenDrain<ODM>>> where AF: AlternateFunctionChoice, ODM: OpenDrainMode {
                        self.into_alternate::<AF, _>(PadConfig::alternate(true, ODM::pup(), false))
                    }

                    /// Configures the pin to operate as a floating input pin
                    pub fn into_floating_input(self) -> $PXi<Input<Floating>> {
                        configure($i, PadConfig::FLOATING_INPUT);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as a pulled down input pin
                    pub fn into_pull_down_input(self) -> $PXi<Input<PullDown>> {
                        configure($i, PadConfig::PULL_DOWN_INPUT);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as a pulled up input pin
                    pub fn into_pull_up_input(self) -> $PXi<Input<PullUp>> {
                        configure($i, PadConfig::PULL_UP_INPUT);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as an open drain output pin
                    pub fn into_open_drain_output<ODM>(self) -> $PXi<Output<OpenDrain<ODM>>> where ODM: OpenDrainMode {
                        configure($i, PadConfig::open_drain_output(ODM::pup()));
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as an push pull output pin
                    pub fn into_push_pull_output(self) -> $PXi<Output<PushPull>> {
                        configure($i, PadConfig::PUSH_PULL_OUTPUT);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin as tri-state
                    pub fn into_tri_state(self) -> $PXi<Tristate> {
                        configure($i, PadConfig::TRI_STATE);
                        $PXi { _mode: PhantomData }
                    }

                    /// Connects the pin to the analog comparators and ADC
                    pub fn into_analog(self) -> $PXi<Analog> {
                        configure($i, PadConfig::ANALOG);
                        $PXi { _mode: PhantomData }
                    }
                }

                impl<MODE> $PXi<MODE> {
                    /// Erases the pin number from the type
                    ///
                    /// This is useful when you want to collect the pins into an array where you
                    /// need all the elements to have the same type
                    #[inline]
                    pub fn downgrade(self) -> $PXx<MODE> {
                        $PXx {
                            i: $i,
                            _mode: self._mode,
                        }
                    }
                }

                impl<MODE> $PXi<Output<MODE>> where MODE: OutputMode {
                    /// Selects the output drive current
                    #[inline]
                    pub fn set_drive_strength(&mut self, strength: DriveStrength) {
                        set_drive($i, strength);
                    }
                }

                impl<AF, MODE> $PXi<AlternateFunction<AF, MODE>> where AF: AlternateFunctionChoice, MODE: OutputMode {
                    /// Selects the output drive current
                    #[inline]
                    pub fn set_drive_strength(&mut self, strength: DriveStrength) {
                        set_drive($i, strength);
                    }
                }

                impl<MODE> embedded_hal::digital::ErrorType for $PXi<Output<MODE>> where MODE: OutputMode {
                    type Error = ::core::convert::Infallible;
                }

                impl<MODE> embedded_hal::digital::StatefulOutputPin for $PXi<Output<MODE>> where MODE: OutputMode {
                    #[inline]
                    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
                        Ok(level($i))
                    }

                    #[inline]
                    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
                        Ok(!level($i))
                    }
                }

                impl<MODE> embedded_hal::digital::OutputPin for $PXi<Output<MODE>> where MODE: OutputMode {
                    #[inline]
                    fn set_high(&mut self) -> Result<(), Self::Error> {
                        drive($i, true);
                        Ok(())
                    }

                    #[inline]
                    fn set_low(&mut self) -> Result<(), Self::Error> {
                        drive($i, false);
                        Ok(())
                    }
                }

                impl<MODE> embedded_hal::digital::ErrorType for $PXi<Input<MODE>> where MODE: InputMode {
                    type Error = ::core::convert::Infallible;
                }

                impl<MODE> embedded_hal::digital::InputPin for $PXi<Input<MODE>> where MODE: InputMode {
                    #[inline]
                    fn is_high(&mut self) -> Result<bool, Self::Error> {
                        Ok(level($i))
                    }

                    #[inline]
                    fn is_low(&mut self) -> Result<bool, Self::Error> {
                        Ok(!level($i))
                    }
                }

                impl<MODE> $PXi<Input<MODE>> where MODE: InputMode {
                    /// Enables or disables interrupts on this GPIO pin. Any
                    /// stale edge is cleared before the pin is unmasked.
                    #[inline]
                    pub fn set_interrupt_mode(&mut self, mode: InterruptMode) {
                        interrupt_mode($i, mode);
                    }

                    /// Returns the current interrupt status for this pin.
                    #[inline]
                    pub fn get_interrupt_status(&self) -> bool {
                        bb::read_bit(&regs().mis, $i)
                    }

                    /// Marks the interrupt for this pin as handled. You should
                    /// call this (or perform its functionality) from the ISR.
                    #[inline]
                    pub fn clear_interrupt(&self) {
                        unsafe { bb::change_bit(&regs().icr, $i, true); }
                    }
                }

                impl $PXi<Locked> {
                    /// Unlock a GPIO so that it can be used. This is required
                    /// on 'special' GPIOs that the manufacturer doesn't want
                    /// you to change by accident - like NMI and JTAG pins.
                    pub fn unlock(self, _gpio_control: &mut GpioControl) -> $PXi<Tristate> {
                        let p = regs();
                        p.lock.write(|w| unsafe { w.bits(UNLOCK_KEY) });
                        unsafe { bb::change_bit(&p.cr, $i, true); }
                        p.lock.write(|w| unsafe { w.bits(0) });
                        configure($i, PadConfig::TRI_STATE);
                        $PXi { _mode: PhantomData }
                    }
                }
            )+
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_configs() {
        assert_eq!(
            PadConfig::PUSH_PULL_OUTPUT,
            PadConfig {
                afsel: false,
                dir: true,
                odr: false,
                pur: false,
                pdr: false,
                den: true,
                amsel: false,
            }
        );
        assert!(PadConfig::PULL_UP_INPUT.pur && !PadConfig::PULL_UP_INPUT.dir);
        assert!(PadConfig::PULL_DOWN_INPUT.pdr);
        assert!(!PadConfig::TRI_STATE.den && !PadConfig::TRI_STATE.amsel);
        assert!(PadConfig::ANALOG.amsel && !PadConfig::ANALOG.den);

        let od = PadConfig::open_drain_output(true);
        assert!(od.dir && od.odr && od.pur && od.den);

        let af = PadConfig::alternate(true, true, false);
        assert!(af.afsel && af.odr && af.pur && !af.dir);
    }

    #[test]
    fn port_control_fields() {
        // PD0..PD3 to SSI3 (function 1) on top of whatever was there.
        let mut pctl = 0xFFFF_FFFF;
        for i in 0..4 {
            pctl = pctl_with(pctl, i, 1);
        }
        assert_eq!(pctl, 0xFFFF_1111);
        assert_eq!(pctl_with(0, 7, AF14::number()), 0xE000_0000);
    }

    #[test]
    fn data_window() {
        assert_eq!(masked_data_offset(0xFF), 0x3FC);
        assert_eq!(masked_data_offset(0b0000_1110), 0x38);
        assert_eq!(masked_data_offset(0), 0);
    }

    #[test]
    fn interrupt_sense_bits() {
        assert_eq!(InterruptMode::Disabled.sense(), None);
        let high = InterruptMode::LevelHigh.sense();
        assert_eq!(
            high,
            Some(InterruptSense {
                level: true,
                both_edges: false,
                high: true
            })
        );
        let falling = InterruptMode::EdgeFalling.sense();
        assert_eq!(falling.map(|s| (s.level, s.high)), Some((false, false)));
        let both = InterruptMode::EdgeBoth.sense();
        assert_eq!(both.map(|s| s.both_edges), Some(true));
    }

    #[test]
    fn drive_strengths() {
        assert_eq!(DriveStrength::Ma2.milliamps(), 2);
        assert_eq!(DriveStrength::Ma8.milliamps(), 8);
    }
}
