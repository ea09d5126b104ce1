//! SSI3 master that sends a one-word command for each button held on
//! PC4..PC7. A slave (an Arduino, say) reacts to commands
//! 51 to 54 by blinking its LED 1, 2, 4 or 9 times.

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
    ssi::{Config, Ssi},
};

/// Command words, one per button from PC4 up.
const COMMANDS: [u16; 4] = [51, 52, 53, 54];

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    // Stay on the 16 MHz PIOSC so the default SSI set-up clocks at 2 MHz.
    let sc = p.SYSCTL.constrain();
    let clocks = sc.clock_setup.freeze();
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let portf = p.GPIO_PORTF.split(&sc.power_control);
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);

    let portc = p.GPIO_PORTC.split(&sc.power_control);
    let control_c = portc.control;
    let _buttons = (
        portc.pc4.into_pull_up_input(),
        portc.pc5.into_pull_up_input(),
        portc.pc6.into_pull_up_input(),
        portc.pc7.into_pull_up_input(),
    );

    leds.blink(Colour::Red, &mut delay);

    let mut portd = p.GPIO_PORTD.split(&sc.power_control);
    let pins = (
        portd.pd0.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd1.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd2.into_af_push_pull::<AF1>(&mut portd.control),
        portd.pd3.into_af_push_pull::<AF1>(&mut portd.control),
    );
    let mut ssi = Ssi::ssi3(p.SSI3, pins, Config::default(), &sc.power_control);
    hprintln!(
        "ssi_master_commands: {} Hz serial clock",
        ssi.config().bit_rate(clocks.sysclk).0
    );

    loop {
        // Pressed buttons read low.
        let pressed = !control_c.read_port() & 0xF0;
        leds.blink(Colour::Green, &mut delay);

        for (i, &command) in COMMANDS.iter().enumerate() {
            if pressed & (0x10 << i) != 0 {
                match ssi.write_words(&[command]) {
                    Ok(()) => hprintln!("sent command {}", command),
                    Err(e) => hprintln!("command {} failed: {:?}", command, e),
                }
            }
        }

        leds.blink_n(Colour::Red, 2, &mut delay);
    }
}
