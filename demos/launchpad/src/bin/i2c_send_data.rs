//! Sends "test" to the I2C device at 0x68 in one burst, blinking red after
//! every delivery. The first failure stops the loop and lights blue.

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

const MESSAGE: &[u8] = b"test";
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

    leds.set(Colour::Green, true);

    let error = match I2c::i2c0(p.I2C0, (scl, sda), Speed::Standard.hertz(), &clocks, &sc.power_control) {
        Ok(mut i2c) => {
            let mut sent = 0u32;
            loop {
                if let Err(e) = i2c.send(SLAVE_ADDRESS, MESSAGE) {
                    hprintln!("i2c_send_data: stopped after {} messages", sent);
                    break e;
                }
                sent += 1;
                delay.delay_ms(1_000);
                leds.blink(Colour::Red, &mut delay);
            }
        }
        Err(e) => e,
    };

    hprintln!("i2c_send_data: {:?}", error);
    leds.set(Colour::Green, false);
    leds.set(Colour::Blue, true);
    loop {
        cortex_m::asm::wfi();
    }
}
