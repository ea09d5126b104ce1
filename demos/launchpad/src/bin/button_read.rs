//! Flashes red then green for as long as SW2 (PF0) is held down.

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use embedded_hal::digital::InputPin;
use launchpad_demos::board::{self, Colour, Leds};
use tm4c123x_drivers::{self as hal, delay::Delay, prelude::*};

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    let sc = p.SYSCTL.constrain();
    let clocks = board::clocks_80mhz(sc.clock_setup);
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let mut portf = p.GPIO_PORTF.split(&sc.power_control);
    // SW2 shares PF0 with NMI, so it starts locked.
    let mut button = portf.pf0.unlock(&mut portf.control).into_pull_up_input();
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);

    hprintln!("button_read: hold SW2");

    loop {
        // The button pulls the pin to ground.
        if button.is_low().unwrap_or(false) {
            leds.blink(Colour::Red, &mut delay);
            leds.blink(Colour::Green, &mut delay);
        }
    }
}
