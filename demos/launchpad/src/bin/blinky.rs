//! Cycles the RGB LED through red, blue and green, flashes white twice and
//! then idles.

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use embedded_hal::delay::DelayNs;
use launchpad_demos::board::{self, Colour, Leds};
use tm4c123x_drivers::{self as hal, delay::Delay, prelude::*};

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    let sc = p.SYSCTL.constrain();
    let clocks = board::clocks_80mhz(sc.clock_setup);
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let portf = p.GPIO_PORTF.split(&sc.power_control);
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);

    hprintln!("blinky: sysclk {} Hz", clocks.sysclk.0);

    for colour in [Colour::Red, Colour::Blue, Colour::Green] {
        leds.set(colour, true);
        delay.delay_ms(1_000);
        leds.set(colour, false);
    }
    delay.delay_ms(1_000);

    for _ in 0..2 {
        leds.white(true);
        delay.delay_ms(1_000);
        leds.white(false);
        delay.delay_ms(1_000);
    }

    hprintln!("blinky: done");
    loop {
        cortex_m::asm::wfi();
    }
}
