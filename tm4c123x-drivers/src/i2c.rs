//! Inter-Integrated Circuit (I2C) bus, master mode

pub use tm4c_core::i2c::*;

use cortex_m::asm::delay;
use embedded_hal::i2c::{Operation, SevenBitAddress};

use crate::{
    gpio::{
        gpioa::{PA6, PA7},
        gpiob::{PB2, PB3},
        gpiod::{PD0, PD1},
        gpioe::{PE4, PE5},
        AlternateFunction, OpenDrain, OpenDrainMode, PushPull, AF3,
    },
    sysctl::{self, Clocks},
    time::Hertz,
    Sealed,
};

use tm4c123x::{I2C0, I2C1, I2C2, I2C3};

/// SCL pin
pub trait SclPin<I2C>: Sealed {}

/// SDA pin
pub trait SdaPin<I2C>: Sealed {}

macro_rules! i2c_pins {
    ($($I2CX:ident: (scl: $SCL:ident, sda: $SDA:ident),)+) => {
        $(
            impl SclPin<$I2CX> for $SCL<AlternateFunction<AF3, PushPull>> {}
            impl<ODM> SdaPin<$I2CX> for $SDA<AlternateFunction<AF3, OpenDrain<ODM>>> where ODM: OpenDrainMode {}
        )+
    };
}

i2c_pins! {
    I2C0: (scl: PB2, sda: PB3),
    I2C1: (scl: PA6, sda: PA7),
    I2C2: (scl: PE4, sda: PE5),
    I2C3: (scl: PD0, sda: PD1),
}

/// MTPR: high-speed timer period
const MTPR_HS: u32 = 1 << 7;

/// Clock-low timeout, in units of 16 SCL periods.
const CLOCK_LOW_TIMEOUT: u8 = (1_000 >> 4) as u8;

/// Status polls allowed for another master to release the bus.
const BUS_IDLE_POLLS: u32 = 100_000;

/// I2C peripheral operating in master mode
pub struct I2c<I2C, PINS> {
    i2c: I2C,
    pins: PINS,
    high_speed: bool,
}

macro_rules! hal {
    ($($I2CX:ident: ($powerDomain:ident, $i2cX:ident),)+) => {
        $(
            impl<SCL, SDA> I2c<$I2CX, (SCL, SDA)> {
                /// Configures the I2C peripheral to work in master mode with
                /// an SCL rate of `freq`.
                pub fn $i2cX<F>(
                    i2c: $I2CX,
                    pins: (SCL, SDA),
                    freq: F,
                    clocks: &Clocks,
                    pc: &sysctl::PowerControl,
                ) -> Result<Self, Error>
                where
                    F: Into<Hertz>,
                    SCL: SclPin<$I2CX>,
                    SDA: SdaPin<$I2CX>,
                {
                    let freq = freq.into();
                    let tpr = timer_period(clocks.sysclk, freq)?;
                    let high_speed = Speed::for_hertz(freq).is_high_speed();

                    sysctl::control_power(
                        pc, sysctl::Domain::$powerDomain,
                        sysctl::RunMode::Run, sysctl::PowerState::On);
                    sysctl::reset(pc, sysctl::Domain::$powerDomain);

                    // Master Function Enable, and clear other bits.
                    i2c.mcr.write(|w| w.mfe().set_bit());

                    let mut mtpr = u32::from(tpr);
                    if high_speed {
                        mtpr |= MTPR_HS;
                    }
                    i2c.mtpr.write(|w| unsafe { w.bits(mtpr) });
                    i2c.mclkocnt.write(|w| unsafe { w.cntl().bits(CLOCK_LOW_TIMEOUT) });

                    Ok(I2c { i2c, pins, high_speed })
                }
            }

            impl<PINS> I2c<$I2CX, PINS> {
                /// Releases the I2C peripheral and associated pins
                pub fn free(self) -> ($I2CX, PINS) {
                    (self.i2c, self.pins)
                }

                /// Disables the master, resets the module and gates its
                /// clock off.
                pub fn deinit(self, pc: &sysctl::PowerControl) -> ($I2CX, PINS) {
                    self.i2c.mcr.write(|w| unsafe { w.bits(0) });
                    sysctl::reset(pc, sysctl::Domain::$powerDomain);
                    sysctl::control_power(
                        pc, sysctl::Domain::$powerDomain,
                        sysctl::RunMode::Run, sysctl::PowerState::Off);
                    (self.i2c, self.pins)
                }

                /// Sends a single byte to the device at `address`.
                pub fn send_byte(&mut self, address: SevenBitAddress, byte: u8) -> Result<(), Error> {
                    self.send(address, &[byte])
                }

                /// Sends `bytes` to the device at `address` in one burst,
                /// framed by START and STOP.
                pub fn send(&mut self, address: SevenBitAddress, bytes: &[u8]) -> Result<(), Error> {
                    self.wait_bus_idle()?;
                    self.write_bytes(address, bytes, Segment::single(Direction::Write))
                }

                /// Reads `buffer.len()` bytes from the device at `address`.
                pub fn read(&mut self, address: SevenBitAddress, buffer: &mut [u8]) -> Result<(), Error> {
                    self.wait_bus_idle()?;
                    self.read_bytes(address, buffer, Segment::single(Direction::Read))
                }

                fn command(&self, mut cmd: u32) {
                    if self.high_speed {
                        cmd |= command::HS;
                    }
                    self.i2c.mcs.write(|w| unsafe { w.bits(cmd) });
                }

                /// Spins until the controller finishes the last command and
                /// reports how it went.
                fn wait(&self) -> Result<(), Error> {
                    // BUSY can take up to 8 clock cycles to rise after RUN.
                    delay(8);
                    loop {
                        let mcs = self.i2c.mcs.read().bits();
                        if mcs & status::BUSY == 0 {
                            return check_status(mcs);
                        }
                    }
                }

                /// Waits for the last command and, if it failed while this
                /// master still owns the bus, releases the bus with a STOP.
                fn finish(&self, cmd: u32) -> Result<(), Error> {
                    self.wait().map_err(|e| {
                        if e.needs_stop() && cmd & command::STOP == 0 {
                            self.command(command::STOP);
                            let _ = self.wait();
                        }
                        e
                    })
                }

                fn wait_bus_idle(&self) -> Result<(), Error> {
                    for _ in 0..BUS_IDLE_POLLS {
                        if self.i2c.mcs.read().bits() & status::BUSBSY == 0 {
                            return Ok(());
                        }
                    }
                    Err(Error::BusBusy)
                }

                fn write_bytes(
                    &mut self,
                    address: SevenBitAddress,
                    bytes: &[u8],
                    segment: Segment,
                ) -> Result<(), Error> {
                    if segment.start {
                        self.i2c.msa.write(|w| unsafe { w.sa().bits(address).rs().clear_bit() });
                    }
                    for (i, &byte) in bytes.iter().enumerate() {
                        self.i2c.mdr.write(|w| unsafe { w.data().bits(byte) });
                        let cmd = segment.command(i, bytes.len());
                        self.command(cmd);
                        self.finish(cmd)?;
                    }
                    Ok(())
                }

                fn read_bytes(
                    &mut self,
                    address: SevenBitAddress,
                    buffer: &mut [u8],
                    segment: Segment,
                ) -> Result<(), Error> {
                    if segment.start {
                        self.i2c.msa.write(|w| unsafe { w.sa().bits(address).rs().set_bit() });
                    }
                    let len = buffer.len();
                    for (i, slot) in buffer.iter_mut().enumerate() {
                        let cmd = segment.command(i, len);
                        self.command(cmd);
                        self.finish(cmd)?;
                        *slot = self.i2c.mdr.read().data().bits();
                    }
                    Ok(())
                }
            }

            impl<PINS> embedded_hal::i2c::ErrorType for I2c<$I2CX, PINS> {
                type Error = Error;
            }

            impl<PINS> embedded_hal::i2c::I2c<SevenBitAddress> for I2c<$I2CX, PINS> {
                fn transaction(
                    &mut self,
                    address: SevenBitAddress,
                    operations: &mut [Operation<'_>],
                ) -> Result<(), Self::Error> {
                    self.wait_bus_idle()?;
                    for n in 0..operations.len() {
                        // Empty operations put nothing on the wire.
                        let Some(framing) = segment(operations, n) else {
                            continue;
                        };
                        match &mut operations[n] {
                            Operation::Write(bytes) => self.write_bytes(address, bytes, framing)?,
                            Operation::Read(buffer) => self.read_bytes(address, buffer, framing)?,
                        }
                    }
                    Ok(())
                }
            }
        )+
    }
}

hal! {
    I2C0: (I2c0, i2c0),
    I2C1: (I2c1, i2c1),
    I2C2: (I2c2, i2c2),
    I2C3: (I2c3, i2c3),
}
