//! Interrupt-driven SSI0 transfer in loopback mode: a 16-word pattern is sent
//! and received entirely from the SSI0 interrupt handler, then compared.

#![no_std]
#![no_main]

use panic_halt as _; // you can put a breakpoint on `rust_begin_unwind` to catch panics

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use cortex_m_semihosting::hprintln;
use launchpad_demos::board::{Colour, Leds};
use tm4c123x_drivers::{
    self as hal,
    delay::Delay,
    gpio::AF2,
    prelude::*,
    ssi::{self, Config, Ssi},
    tm4c123x::{interrupt, Interrupt},
};

static PATTERN: [u16; 16] = [
    0x0001, 0x0203, 0x0405, 0x0607, 0x0809, 0x0A0B, 0x0C0D, 0x0E0F,
    0x1234, 0x5678, 0x9ABC, 0xDEF0, 0xFFFF, 0x0000, 0xA5A5, 0x5A5A,
];

#[interrupt]
fn SSI0() {
    ssi::on_interrupt::<hal::tm4c123x::SSI0>();
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

    let mut porta = p.GPIO_PORTA.split(&sc.power_control);
    let pins = (
        porta.pa2.into_af_push_pull::<AF2>(&mut porta.control),
        porta.pa3.into_af_push_pull::<AF2>(&mut porta.control),
        porta.pa4.into_af_push_pull::<AF2>(&mut porta.control),
        porta.pa5.into_af_push_pull::<AF2>(&mut porta.control),
    );
    let config = Config {
        loopback: true,
        ..Config::default()
    };
    let mut ssi = Ssi::ssi0(p.SSI0, pins, config, &sc.power_control);

    let Some(received) = cortex_m::singleton!(: [u16; 16] = [0; 16]) else {
        hprintln!("ssi_interrupt: receive buffer already taken");
        loop {}
    };

    unsafe { NVIC::unmask(Interrupt::SSI0) };

    // Arm the receive side first so no looped-back frame is missed.
    let started = ssi
        .read_with_interrupt(received)
        .and_then(|()| ssi.write_with_interrupt(&PATTERN));
    if let Err(e) = started {
        hprintln!("ssi_interrupt: could not start: {:?}", e);
        loop {}
    }

    while ssi.is_transfer_pending() {
        cortex_m::asm::wfi();
    }

    if ssi.take_written().is_none() {
        hprintln!("ssi_interrupt: transmit incomplete");
    }
    match ssi.take_read() {
        Some(words) if words[..] == PATTERN[..] => {
            hprintln!("ssi_interrupt: PASS, {} words", words.len());
            leds.set(Colour::Green, true);
        }
        Some(words) => {
            hprintln!("ssi_interrupt: FAIL, got {:04x?}", words);
            leds.set(Colour::Red, true);
        }
        None => {
            hprintln!("ssi_interrupt: FAIL, receive incomplete");
            leds.set(Colour::Red, true);
        }
    }
    loop {
        leds.blink(Colour::Blue, &mut delay);
    }
}
