//! Synchronous Serial Interface (SSI)
//!
//! Each of the four SSI modules runs as SPI master or slave, with blocking,
//! non-blocking and interrupt-driven transfers. Interrupt-driven transfers
//! borrow `'static` buffers and are serviced from the module's interrupt
//! handler, which must call [`on_interrupt`]:
//!
//! ```ignore
//! #[interrupt]
//! fn SSI0() {
//!     ssi::on_interrupt::<SSI0>();
//! }
//! ```

pub use tm4c_core::ssi::*;

use core::cell::RefCell;
use core::marker::PhantomData;

use cortex_m::interrupt::{self, Mutex};

use crate::{
    gpio::{
        gpioa::{PA2, PA3, PA4, PA5},
        gpiob::{PB4, PB5, PB6, PB7},
        gpiod::{PD0, PD1, PD2, PD3},
        gpiof::{PF0, PF1, PF2, PF3},
        AlternateFunction, OutputMode, AF1, AF2,
    },
    sysctl,
    sysctl::Clocks,
    time::Hertz,
    Sealed,
};

use tm4c123x::{SSI0, SSI1, SSI2, SSI3};

/// Clock (SSInClk) pin
pub trait ClkPin<SSI>: Sealed {}

/// Frame signal (SSInFss) pin
pub trait FssPin<SSI>: Sealed {}

/// Receive (SSInRx) pin
pub trait RxPin<SSI>: Sealed {}

/// Transmit (SSInTx) pin
pub trait TxPin<SSI>: Sealed {}

// A master that selects its slaves through GPIOs has no use for SSInFss.
impl<SSI> FssPin<SSI> for () {}

macro_rules! ssi_pins {
    ($SSIX:ident, $AF:ident, clk: $CLK:ident, fss: $FSS:ident, rx: $RX:ident, tx: $TX:ident) => {
        impl<T> ClkPin<$SSIX> for $CLK<AlternateFunction<$AF, T>> where T: OutputMode {}
        impl<T> FssPin<$SSIX> for $FSS<AlternateFunction<$AF, T>> where T: OutputMode {}
        impl<T> RxPin<$SSIX> for $RX<AlternateFunction<$AF, T>> where T: OutputMode {}
        impl<T> TxPin<$SSIX> for $TX<AlternateFunction<$AF, T>> where T: OutputMode {}
    };
}

ssi_pins!(SSI0, AF2, clk: PA2, fss: PA3, rx: PA4, tx: PA5);
ssi_pins!(SSI1, AF2, clk: PF2, fss: PF3, rx: PF0, tx: PF1);
ssi_pins!(SSI1, AF2, clk: PD0, fss: PD1, rx: PD2, tx: PD3);
ssi_pins!(SSI2, AF2, clk: PB4, fss: PB5, rx: PB6, tx: PB7);
ssi_pins!(SSI3, AF1, clk: PD0, fss: PD1, rx: PD2, tx: PD3);

/// An SSI module that has an interrupt handler to service.
pub trait Instance: Sealed {
    /// Moves frames for this module's pending interrupt-driven transfers.
    fn on_interrupt();
}

/// Services the pending interrupt-driven transfers of `SSI`. Call this from
/// the module's interrupt handler.
#[inline]
pub fn on_interrupt<SSI: Instance>() {
    SSI::on_interrupt();
}

const IDLE: Mutex<RefCell<Channel>> = Mutex::new(RefCell::new(Channel::new()));

/// Interrupt transfer state, indexed by SSI module number.
static CHANNELS: [Mutex<RefCell<Channel>>; 4] = [IDLE; 4];

/// FIFO access to one module from interrupt context.
struct Registers<SSI> {
    _ssi: PhantomData<SSI>,
}

impl<SSI> Registers<SSI> {
    fn new() -> Self {
        Registers { _ssi: PhantomData }
    }
}

/// What [`Ssi::deinit`] hands back.
pub struct Released<SSI, PINS> {
    /// The peripheral
    pub ssi: SSI,
    /// Its pins
    pub pins: PINS,
    /// Buffer of an abandoned interrupt-driven write
    pub written: Option<&'static [u16]>,
    /// Buffer of an abandoned interrupt-driven read, partly filled
    pub read: Option<&'static mut [u16]>,
}

/// SSI peripheral
pub struct Ssi<SSI, PINS> {
    ssi: SSI,
    pins: PINS,
    config: Config,
}

macro_rules! hal {
    ($($SSIX:ident: ($powerDomain:ident, $ssiX:ident, $spiX:ident, $index:expr),)+) => {
        $(
            impl Sealed for $SSIX {}

            impl Instance for $SSIX {
                fn on_interrupt() {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.icr.write(|w| unsafe { w.bits(regs::ICR_RORIC | regs::ICR_RTIC) });
                    interrupt::free(|cs| {
                        CHANNELS[$index]
                            .borrow(cs)
                            .borrow_mut()
                            .service(&mut Registers::<$SSIX>::new());
                    });
                }
            }

            impl Fifo for Registers<$SSIX> {
                #[inline]
                fn tx_ready(&self) -> bool {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.sr.read().tnf().bit_is_set()
                }

                #[inline]
                fn rx_ready(&self) -> bool {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.sr.read().rne().bit_is_set()
                }

                #[inline]
                fn push(&mut self, word: u16) {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.dr.write(|w| unsafe { w.data().bits(word) });
                }

                #[inline]
                fn pop(&mut self) -> u16 {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.dr.read().data().bits()
                }

                #[inline]
                fn disable(&mut self, interrupts: Interrupts) {
                    let ssi = unsafe { &*$SSIX::ptr() };
                    ssi.im.modify(|r, w| unsafe { w.bits(r.bits() & !interrupts.bits()) });
                }
            }

            impl<CLK, FSS, RX, TX> Ssi<$SSIX, (CLK, FSS, RX, TX)> {
                /// Powers up the module and configures it as described by
                /// `config`. The port is enabled on return.
                pub fn $ssiX(
                    ssi: $SSIX,
                    pins: (CLK, FSS, RX, TX),
                    config: Config,
                    pc: &sysctl::PowerControl,
                ) -> Self
                where
                    CLK: ClkPin<$SSIX>,
                    FSS: FssPin<$SSIX>,
                    RX: RxPin<$SSIX>,
                    TX: TxPin<$SSIX>,
                {
                    sysctl::control_power(
                        pc, sysctl::Domain::$powerDomain,
                        sysctl::RunMode::Run, sysctl::PowerState::On);
                    sysctl::reset(pc, sysctl::Domain::$powerDomain);

                    // The port must be disabled while it is configured.
                    ssi.cr1.write(|w| unsafe { w.bits(0) });
                    ssi.cr1.write(|w| unsafe { w.bits(config.cr1()) });
                    ssi.cc.write(|w| unsafe { w.bits(config.cc()) });
                    ssi.cpsr.write(|w| unsafe { w.cpsdvsr().bits(config.cpsr()) });
                    ssi.cr0.write(|w| unsafe { w.bits(config.cr0()) });
                    ssi.im.write(|w| unsafe { w.bits(config.im()) });
                    ssi.cr1.write(|w| unsafe { w.bits(config.cr1() | regs::CR1_SSE) });

                    Ssi { ssi, pins, config }
                }

                /// Configures the module as a Freescale SPI master with 8-bit
                /// frames running at `freq`.
                pub fn $spiX<F>(
                    ssi: $SSIX,
                    pins: (CLK, FSS, RX, TX),
                    mode: Mode,
                    freq: F,
                    clocks: &Clocks,
                    pc: &sysctl::PowerControl,
                ) -> Result<Self, Error>
                where
                    F: Into<Hertz>,
                    CLK: ClkPin<$SSIX>,
                    FSS: FssPin<$SSIX>,
                    RX: RxPin<$SSIX>,
                    TX: TxPin<$SSIX>,
                {
                    let config = Config {
                        divider: ClockDivider::for_bit_rate(clocks.sysclk, freq.into())?,
                        mode,
                        data_size: DataSize::EIGHT,
                        ..Config::default()
                    };
                    Ok(Self::$ssiX(ssi, pins, config, pc))
                }
            }

            impl<PINS> Ssi<$SSIX, PINS> {
                /// Releases the SSI peripheral and associated pins. Pending
                /// interrupt-driven transfers keep running.
                pub fn free(self) -> ($SSIX, PINS) {
                    (self.ssi, self.pins)
                }

                /// Abandons pending interrupt-driven transfers, resets the
                /// module and gates its clock off. The buffers of abandoned
                /// transfers come back with the peripheral.
                pub fn deinit(self, pc: &sysctl::PowerControl) -> Released<$SSIX, PINS> {
                    let (written, read) = interrupt::free(|cs| {
                        CHANNELS[$index]
                            .borrow(cs)
                            .borrow_mut()
                            .cancel(&mut Registers::<$SSIX>::new())
                    });
                    self.ssi.cr1.modify(|r, w| unsafe { w.bits(r.bits() & !regs::CR1_SSE) });
                    sysctl::reset(pc, sysctl::Domain::$powerDomain);
                    sysctl::control_power(
                        pc, sysctl::Domain::$powerDomain,
                        sysctl::RunMode::Run, sysctl::PowerState::Off);
                    Released {
                        ssi: self.ssi,
                        pins: self.pins,
                        written,
                        read,
                    }
                }

                /// The configuration the module was brought up with, with
                /// any later change of bit rate.
                #[inline]
                pub fn config(&self) -> &Config {
                    &self.config
                }

                /// Changes the serial clock frequency.
                pub fn reclock<F>(&mut self, freq: F, clocks: &Clocks) -> Result<(), Error>
                where
                    F: Into<Hertz>,
                {
                    let source = self.config.clock_source.frequency(clocks.sysclk);
                    self.config.divider = ClockDivider::for_bit_rate(source, freq.into())?;

                    self.ssi.cr1.modify(|r, w| unsafe { w.bits(r.bits() & !regs::CR1_SSE) });
                    self.ssi.cpsr.write(|w| unsafe { w.cpsdvsr().bits(self.config.cpsr()) });
                    self.ssi.cr0.write(|w| unsafe { w.bits(self.config.cr0()) });
                    self.ssi.cr1.modify(|r, w| unsafe { w.bits(r.bits() | regs::CR1_SSE) });
                    Ok(())
                }

                /// Unmasks interrupt sources
                #[inline]
                pub fn listen(&mut self, interrupts: Interrupts) {
                    self.ssi.im.modify(|r, w| unsafe { w.bits(r.bits() | interrupts.bits()) });
                }

                /// Masks interrupt sources
                #[inline]
                pub fn unlisten(&mut self, interrupts: Interrupts) {
                    self.ssi.im.modify(|r, w| unsafe { w.bits(r.bits() & !interrupts.bits()) });
                }

                /// Is a frame being shifted, or is the transmit FIFO non-empty?
                #[inline]
                pub fn is_busy(&self) -> bool {
                    self.ssi.sr.read().bsy().bit_is_set()
                }

                fn check_overrun(&self) -> Result<(), Error> {
                    if self.ssi.ris.read().bits() & Interrupts::RX_OVERRUN.bits() != 0 {
                        self.ssi.icr.write(|w| unsafe { w.bits(regs::ICR_RORIC) });
                        Err(Error::Overrun)
                    } else {
                        Ok(())
                    }
                }

                #[inline]
                fn push(&mut self, word: u16) {
                    while self.ssi.sr.read().tnf().bit_is_clear() {}
                    self.ssi.dr.write(|w| unsafe { w.data().bits(word) });
                }

                fn pop(&mut self) -> Result<u16, Error> {
                    while self.ssi.sr.read().rne().bit_is_clear() {
                        self.check_overrun()?;
                    }
                    self.check_overrun()?;
                    Ok(self.ssi.dr.read().data().bits() & self.config.data_size.mask())
                }

                /// Sends `word` and returns the frame clocked in alongside it.
                #[inline]
                fn exchange(&mut self, word: u16) -> Result<u16, Error> {
                    self.push(word);
                    self.pop()
                }

                /// Sends every word, discarding what comes back.
                pub fn write_words(&mut self, words: &[u16]) -> Result<(), Error> {
                    for &word in words {
                        self.exchange(word)?;
                    }
                    Ok(())
                }

                /// Fills `words` with received frames. A master clocks out
                /// all-ones filler frames to receive; a slave waits for its
                /// master.
                pub fn read_words(&mut self, words: &mut [u16]) -> Result<(), Error> {
                    let master = self.config.role.is_master();
                    for word in words {
                        if master {
                            self.push(regs::FILL_WORD);
                        }
                        *word = self.pop()?;
                    }
                    Ok(())
                }

                /// Sends `write` while receiving into `read`. The shorter one
                /// is padded: filler frames are sent, extra replies dropped.
                pub fn transfer_words(&mut self, read: &mut [u16], write: &[u16]) -> Result<(), Error> {
                    transfer_padded(read, write, regs::FILL_WORD, |word| self.exchange(word))
                }

                /// Sends `words`, replacing each one with the frame received
                /// in its place.
                pub fn transfer_words_in_place(&mut self, words: &mut [u16]) -> Result<(), Error> {
                    for word in words {
                        *word = self.exchange(*word)?;
                    }
                    Ok(())
                }

                /// Waits until the last frame has left the shift register
                pub fn flush(&mut self) {
                    while self.is_busy() {}
                }

                /// Queues one frame if the transmit FIFO has room
                pub fn send(&mut self, word: u16) -> nb::Result<(), Error> {
                    if self.ssi.sr.read().tnf().bit_is_clear() {
                        return Err(nb::Error::WouldBlock);
                    }
                    self.ssi.dr.write(|w| unsafe { w.data().bits(word) });
                    Ok(())
                }

                /// Takes one frame from the receive FIFO
                pub fn receive(&mut self) -> nb::Result<u16, Error> {
                    self.check_overrun()?;
                    if self.ssi.sr.read().rne().bit_is_clear() {
                        return Err(nb::Error::WouldBlock);
                    }
                    Ok(self.ssi.dr.read().data().bits() & self.config.data_size.mask())
                }

                /// Starts sending `words` from the interrupt handler. Replies
                /// that no interrupt-driven read is waiting for are dropped.
                /// Fails with [`Error::Busy`] while a previous
                /// interrupt-driven write is still going.
                pub fn write_with_interrupt(&mut self, words: &'static [u16]) -> Result<(), Error> {
                    interrupt::free(|cs| {
                        let mut channel = CHANNELS[$index].borrow(cs).borrow_mut();
                        channel.start_tx(words)?;
                        self.listen(channel.interrupts());
                        Ok(())
                    })
                }

                /// Starts filling `words` from the interrupt handler. A master
                /// only receives while it sends, so pair this with
                /// [`write_with_interrupt`](Self::write_with_interrupt) of the
                /// same length. Fails with [`Error::Busy`] while a previous
                /// interrupt-driven read is still going.
                pub fn read_with_interrupt(&mut self, words: &'static mut [u16]) -> Result<(), Error> {
                    let data_size = self.config.data_size;
                    interrupt::free(|cs| {
                        let mut channel = CHANNELS[$index].borrow(cs).borrow_mut();
                        channel.start_rx(words, data_size)?;
                        self.listen(channel.interrupts());
                        Ok(())
                    })
                }

                /// Gives back the buffer of a completed interrupt-driven write
                pub fn take_written(&mut self) -> Option<&'static [u16]> {
                    interrupt::free(|cs| CHANNELS[$index].borrow(cs).borrow_mut().take_tx())
                }

                /// Gives back the buffer of a completed interrupt-driven read
                pub fn take_read(&mut self) -> Option<&'static mut [u16]> {
                    interrupt::free(|cs| CHANNELS[$index].borrow(cs).borrow_mut().take_rx())
                }

                /// Is either interrupt-driven transfer still moving frames, or
                /// are replies to an interrupt-driven write still coming in?
                pub fn is_transfer_pending(&self) -> bool {
                    interrupt::free(|cs| CHANNELS[$index].borrow(cs).borrow().is_active())
                }
            }

            impl<PINS> embedded_hal::spi::ErrorType for Ssi<$SSIX, PINS> {
                type Error = Error;
            }

            impl<PINS> embedded_hal::spi::SpiBus<u16> for Ssi<$SSIX, PINS> {
                fn read(&mut self, words: &mut [u16]) -> Result<(), Self::Error> {
                    self.read_words(words)
                }

                fn write(&mut self, words: &[u16]) -> Result<(), Self::Error> {
                    self.write_words(words)
                }

                fn transfer(&mut self, read: &mut [u16], write: &[u16]) -> Result<(), Self::Error> {
                    self.transfer_words(read, write)
                }

                fn transfer_in_place(&mut self, words: &mut [u16]) -> Result<(), Self::Error> {
                    self.transfer_words_in_place(words)
                }

                fn flush(&mut self) -> Result<(), Self::Error> {
                    Ssi::<$SSIX, PINS>::flush(self);
                    Ok(())
                }
            }

            impl<PINS> embedded_hal::spi::SpiBus<u8> for Ssi<$SSIX, PINS> {
                fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
                    let master = self.config.role.is_master();
                    for word in words {
                        if master {
                            self.push(regs::FILL_WORD);
                        }
                        *word = self.pop()? as u8;
                    }
                    Ok(())
                }

                fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
                    for &word in words {
                        self.exchange(u16::from(word))?;
                    }
                    Ok(())
                }

                fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
                    transfer_padded(read, write, regs::FILL_WORD as u8, |byte| {
                        self.exchange(u16::from(byte)).map(|reply| reply as u8)
                    })
                }

                fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
                    for word in words {
                        *word = self.exchange(u16::from(*word))? as u8;
                    }
                    Ok(())
                }

                fn flush(&mut self) -> Result<(), Self::Error> {
                    Ssi::<$SSIX, PINS>::flush(self);
                    Ok(())
                }
            }
        )+
    }
}

hal! {
    SSI0: (Ssi0, ssi0, spi0, 0),
    SSI1: (Ssi1, ssi1, spi1, 1),
    SSI2: (Ssi2, ssi2, spi2, 2),
    SSI3: (Ssi3, ssi3, spi3, 3),
}
