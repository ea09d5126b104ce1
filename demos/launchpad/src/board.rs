//! The LaunchPad's RGB LED and the usual clock set-up.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use tm4c123x_drivers::gpio::gpiof::{PF1, PF2, PF3};
use tm4c123x_drivers::gpio::{IsUnlocked, Output, PushPull};
use tm4c123x_drivers::sysctl::{
    ClockSetup, Clocks, CrystalFrequency, Oscillator, PllOutputFrequency, SystemClock,
};

/// How long a blink keeps the LED lit, and then dark.
pub const BLINK_MS: u32 = 250;

/// Runs the system from the LaunchPad's 16 MHz crystal through the PLL at
/// 80 MHz.
pub fn clocks_80mhz(mut setup: ClockSetup) -> Clocks {
    setup.oscillator = Oscillator::Main(
        CrystalFrequency::_16mhz,
        SystemClock::UsePll(PllOutputFrequency::_80_00mhz),
    );
    setup.freeze()
}

/// One colour of the RGB LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colour {
    /// PF1
    Red,
    /// PF2
    Blue,
    /// PF3
    Green,
}

/// The three channels of the RGB LED.
pub struct Leds {
    red: PF1<Output<PushPull>>,
    blue: PF2<Output<PushPull>>,
    green: PF3<Output<PushPull>>,
}

impl Leds {
    /// Takes PF1-PF3 as push-pull outputs, all dark.
    pub fn new<R, B, G>(red: PF1<R>, blue: PF2<B>, green: PF3<G>) -> Self
    where
        R: IsUnlocked,
        B: IsUnlocked,
        G: IsUnlocked,
    {
        let mut leds = Leds {
            red: red.into_push_pull_output(),
            blue: blue.into_push_pull_output(),
            green: green.into_push_pull_output(),
        };
        leds.white(false);
        leds
    }

    /// Lights or darkens one colour.
    pub fn set(&mut self, colour: Colour, on: bool) {
        let state = PinState::from(on);
        // GPIO writes cannot fail.
        match colour {
            Colour::Red => self.red.set_state(state).ok(),
            Colour::Blue => self.blue.set_state(state).ok(),
            Colour::Green => self.green.set_state(state).ok(),
        };
    }

    /// All three colours together.
    pub fn white(&mut self, on: bool) {
        self.set(Colour::Red, on);
        self.set(Colour::Blue, on);
        self.set(Colour::Green, on);
    }

    /// Flashes one colour once.
    pub fn blink<D: DelayNs>(&mut self, colour: Colour, delay: &mut D) {
        self.set(colour, true);
        delay.delay_ms(BLINK_MS);
        self.set(colour, false);
        delay.delay_ms(BLINK_MS);
    }

    /// Flashes one colour `times` times.
    pub fn blink_n<D: DelayNs>(&mut self, colour: Colour, times: u32, delay: &mut D) {
        for _ in 0..times {
            self.blink(colour, delay);
        }
    }
}
