//! SSI3 slave that receives commands four words at a time and plays each one
//! on the LEDs: 0 lights red, 1 to 3 blink green, blue and red, anything else
//! lights white.

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
    hprintln!("ssi_slave_sequence: listening");

    let mut commands = [0u16; 4];
    loop {
        if let Err(e) = ssi.read_words(&mut commands) {
            hprintln!("ssi_slave_sequence: {:?}", e);
            continue;
        }
        hprintln!("received {:?}", commands);
        for &command in &commands {
            match command {
                0 => leds.set(Colour::Red, true),
                1 => {
                    leds.white(false);
                    leds.blink(Colour::Green, &mut delay);
                }
                2 => {
                    leds.white(false);
                    leds.blink(Colour::Blue, &mut delay);
                }
                3 => {
                    leds.white(false);
                    leds.blink(Colour::Red, &mut delay);
                }
                _ => leds.white(true),
            }
        }
    }
}
