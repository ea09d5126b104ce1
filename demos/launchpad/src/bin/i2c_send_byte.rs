//! Sends 0x69 to the I2C device at 0x68 over and over, showing green while
//! it is acknowledged and red while it is not.

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use embedded_hal::delay::DelayNs;
use launchpad_demos::board::{self, Colour, Leds};
use tm4c123x_drivers::{
    self as hal,
    delay::Delay,
    gpio::{Floating, AF3},
    i2c::{I2c, Speed},
    prelude::*,
};

const HELLO: u8 = 0x69;
const SLAVE_ADDRESS: u8 = 0x68;

#[entry]
fn main() -> ! {
    let p = hal::Peripherals::take().unwrap();
    let cp = hal::CorePeripherals::take().unwrap();

    let sc = p.SYSCTL.constrain();
    let clocks = board::clocks_80mhz(sc.clock_setup);
    let mut delay = Delay::new(cp.SYST, &clocks).unwrap();

    let portf = p.GPIO_PORTF.split(&sc.power_control);
    let mut leds = Leds::new(portf.pf1, portf.pf2, portf.pf3);

    let mut portb = p.GPIO_PORTB.split(&sc.power_control);
    let scl = portb.pb2.into_af_push_pull::<AF3>(&mut portb.control);
    let sda = portb.pb3.into_af_open_drain::<AF3, Floating>(&mut portb.control);

    let mut i2c = match I2c::i2c0(p.I2C0, (scl, sda), Speed::Standard.hertz(), &clocks, &sc.power_control) {
        Ok(i2c) => i2c,
        Err(e) => {
            hprintln!("i2c_send_byte: {:?}", e);
            loop {}
        }
    };

    let mut previous = None;
    loop {
        let result = i2c.send_byte(SLAVE_ADDRESS, HELLO);
        let ok = result.is_ok();
        if previous != Some(ok) {
            match result {
                Ok(()) => hprintln!("i2c_send_byte: acknowledged"),
                Err(e) => hprintln!("i2c_send_byte: {:?}", e),
            }
            leds.set(Colour::Green, ok);
            leds.set(Colour::Red, !ok);
            previous = Some(ok);
        }
        delay.delay_ms(100);
    }
}
