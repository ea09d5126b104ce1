//! Walks a bit up port B through the masked data window: PB0..PB7 light one
//! by one, then go dark one by one. Each write only touches the pin its
//! address selects, even though every data bit is set or cleared.

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use embedded_hal::delay::DelayNs;
use launchpad_demos::board::{self, Colour, Leds};
use tm4c123x_drivers::{self as hal, delay::Delay, prelude::*};

const STEP_MS: u32 = 100;

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    let sc = p.SYSCTL.constrain();
    let clocks = board::clocks_80mhz(sc.clock_setup);
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let portf = p.GPIO_PORTF.split(&sc.power_control);
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);
    leds.blink(Colour::Red, &mut delay);

    let portb = p.GPIO_PORTB.split(&sc.power_control);
    let mut control = portb.control;
    // Keep the pins alive as outputs; the port is driven through `control`.
    let _outputs = (
        portb.pb0.into_push_pull_output(),
        portb.pb1.into_push_pull_output(),
        portb.pb2.into_push_pull_output(),
        portb.pb3.into_push_pull_output(),
        portb.pb4.into_push_pull_output(),
        portb.pb5.into_push_pull_output(),
        portb.pb6.into_push_pull_output(),
        portb.pb7.into_push_pull_output(),
    );

    hprintln!("port_walk: running");

    loop {
        for i in 0..8 {
            control.write_port(1 << i, 0xFF);
            delay.delay_ms(STEP_MS);
        }
        for i in 0..8 {
            control.write_port(1 << i, 0x00);
            delay.delay_ms(STEP_MS);
        }
        hprintln!("port_walk: PB = {:#04x}", control.read_port());
    }
}
