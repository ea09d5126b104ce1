//! SSI3 slave that listens, without driving SSI3Tx, for one-word commands
//! reporting a master's buttons:
//!
//! | word | meaning               | LED             |
//! |------|-----------------------|-----------------|
//! | 0    | no button pressed     | red on          |
//! | 1    | button 1 pressed      | blink green     |
//! | 2    | button 2 pressed      | blink blue      |
//! | 3    | both buttons pressed  | blink red       |
//! | else | unknown               | white on        |

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use launchpad_demos::board::{Colour, Leds};
use tm4c123x_drivers::{
    self as hal,
    delay::Delay,
    gpio::AF1,
    prelude::*,
    ssi::{Config, Role, Ssi},
};

/// Shows what one command word means on the LEDs.
fn show<D: embedded_hal::delay::DelayNs>(leds: &mut Leds, command: u16, delay: &mut D) {
    match command {
        0 => leds.set(Colour::Red, true),
        1 => {
            leds.white(false);
            leds.blink(Colour::Green, delay);
        }
        2 => {
            leds.white(false);
            leds.blink(Colour::Blue, delay);
        }
        3 => {
            leds.white(false);
            leds.blink(Colour::Red, delay);
        }
        _ => leds.white(true),
    }
}

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    let sc = p.SYSCTL.constrain();
    let clocks = sc.clock_setup.freeze();
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let portf = p.GPIO_PORTF.split(&sc.power_control);
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);
    leds.blink(Colour::Red, &mut delay);

    let mut portd = p.GPIO_PORTD.split(&sc.power_control);
    let pins = (
        portd.pd0.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd1.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd2.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd3.into_af_push_pull::<AF1>(&mut portd.control),
    );
    let config = Config {
        role: Role::SlaveOutputDisabled,
        ..Config::default()
    };
    let mut ssi = Ssi::ssi3(p.SSI3, pins, config, &sc.power_control);
    hprintln!("ssi_slave: listening");

    let mut command = [0u16; 1];
    loop {
        match ssi.read_words(&mut command) {
            Ok(()) => show(&mut leds, command[0], &mut delay),
            Err(e) => hprintln!("ssi_slave: {:?}", e),
        }
    }
}
