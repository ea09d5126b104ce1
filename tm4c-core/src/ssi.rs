//! Synchronous Serial Interface code that does not depend on a particular
//! chip: register encodings, the bit-rate divider search and the bookkeeping
//! behind interrupt-driven transfers.
//!
//! An SSI module speaks Freescale SPI, TI synchronous serial or MICROWIRE
//! frames of 4 to 16 bits, as master or as slave. The serial clock is
//!
//! ```text
//! SSInClk = SysClk / (CPSDVSR * (1 + SCR))
//! ```
//!
//! with CPSDVSR an even number in `2..=254` and SCR in `0..=255`.

pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

use core::ops::BitOr;

use crate::time::Hertz;

/// Register bit positions and masks.
pub mod regs {
    /// CR0: serial clock rate, bits 8..=15
    pub const CR0_SCR_SHIFT: u32 = 8;
    /// CR0: clock phase
    pub const CR0_SPH: u32 = 1 << 7;
    /// CR0: clock polarity
    pub const CR0_SPO: u32 = 1 << 6;
    /// CR0: frame format, bits 4..=5
    pub const CR0_FRF_SHIFT: u32 = 4;

    /// CR1: loopback mode
    pub const CR1_LBM: u32 = 1 << 0;
    /// CR1: synchronous serial port enable
    pub const CR1_SSE: u32 = 1 << 1;
    /// CR1: master/slave select (set for slave)
    pub const CR1_MS: u32 = 1 << 2;
    /// CR1: slave mode output disable
    pub const CR1_SOD: u32 = 1 << 3;

    /// SR: transmit FIFO empty
    pub const SR_TFE: u32 = 1 << 0;
    /// SR: transmit FIFO not full
    pub const SR_TNF: u32 = 1 << 1;
    /// SR: receive FIFO not empty
    pub const SR_RNE: u32 = 1 << 2;
    /// SR: receive FIFO full
    pub const SR_RFF: u32 = 1 << 3;
    /// SR: busy
    pub const SR_BSY: u32 = 1 << 4;

    /// ICR: clear receive overrun
    pub const ICR_RORIC: u32 = 1 << 0;
    /// ICR: clear receive timeout
    pub const ICR_RTIC: u32 = 1 << 1;

    /// CC: clock from the system clock
    pub const CC_SYSCLK: u32 = 0x0;
    /// CC: clock from the precision internal oscillator
    pub const CC_PIOSC: u32 = 0x5;

    /// Word the master clocks out when it only wants to receive.
    pub const FILL_WORD: u16 = 0xFFFF;
}

/// SSI error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The receive FIFO was full when another frame arrived
    Overrun,
    /// No CPSDVSR/SCR pair produces the requested bit rate
    UnreachableBitRate,
    /// An interrupt-driven transfer in the same direction is still running
    Busy,
}

impl embedded_hal::spi::Error for Error {
    #[inline]
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        match *self {
            Error::Overrun => embedded_hal::spi::ErrorKind::Overrun,
            Error::UnreachableBitRate | Error::Busy => embedded_hal::spi::ErrorKind::Other,
        }
    }
}

/// Who drives the serial clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Drives SSInClk and SSInFss
    Master,
    /// Follows an external master and drives SSInTx while selected
    Slave,
    /// Follows an external master without ever driving SSInTx. Use this when
    /// several slaves share one return line and this one only listens.
    SlaveOutputDisabled,
}

impl Role {
    /// CR1 bits selecting this role
    #[inline]
    pub const fn cr1(self) -> u32 {
        match self {
            Role::Master => 0,
            Role::Slave => regs::CR1_MS,
            Role::SlaveOutputDisabled => regs::CR1_MS | regs::CR1_SOD,
        }
    }

    /// Is this the master role?
    #[inline]
    pub const fn is_master(self) -> bool {
        matches!(self, Role::Master)
    }
}

/// Source of the SSI baud clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// The system clock
    System,
    /// The 16 MHz precision internal oscillator, which keeps running when the
    /// system clock is changed
    PrecisionInternal,
}

impl ClockSource {
    /// CC register value for this source
    #[inline]
    pub const fn cc(self) -> u32 {
        match self {
            ClockSource::System => regs::CC_SYSCLK,
            ClockSource::PrecisionInternal => regs::CC_PIOSC,
        }
    }

    /// Frequency this source runs at, given the system clock
    #[inline]
    pub const fn frequency(self, sysclk: Hertz) -> Hertz {
        match self {
            ClockSource::System => sysclk,
            ClockSource::PrecisionInternal => crate::sysctl::PIOSC,
        }
    }
}

/// Frame format on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    /// Freescale (Motorola) SPI; the only format that honours clock phase and
    /// polarity
    Freescale,
    /// Texas Instruments synchronous serial
    TexasInstruments,
    /// National Semiconductor MICROWIRE
    Microwire,
}

impl FrameFormat {
    /// FRF field value
    #[inline]
    pub const fn frf(self) -> u32 {
        match self {
            FrameFormat::Freescale => 0,
            FrameFormat::TexasInstruments => 1,
            FrameFormat::Microwire => 2,
        }
    }
}

/// Bits per frame, between 4 and 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataSize(u8);

impl DataSize {
    /// 8-bit frames
    pub const EIGHT: DataSize = DataSize(8);
    /// 16-bit frames
    pub const SIXTEEN: DataSize = DataSize(16);

    /// Frames of `bits` bits, if the hardware supports that width
    #[inline]
    pub const fn new(bits: u8) -> Option<Self> {
        if bits >= 4 && bits <= 16 {
            Some(DataSize(bits))
        } else {
            None
        }
    }

    /// Bits per frame
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// DSS field value
    #[inline]
    pub const fn dss(self) -> u32 {
        self.0 as u32 - 1
    }

    /// Mask covering the valid bits of one frame
    #[inline]
    pub const fn mask(self) -> u16 {
        (((1u32) << self.0) - 1) as u16
    }
}

/// Prescaler pair that sets the serial clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockDivider {
    cpsdvsr: u8,
    scr: u8,
}

impl ClockDivider {
    /// Checks a raw CPSDVSR/SCR pair. CPSDVSR must be even and at least 2.
    #[inline]
    pub const fn new(cpsdvsr: u8, scr: u8) -> Option<Self> {
        if cpsdvsr >= 2 && cpsdvsr % 2 == 0 {
            Some(ClockDivider { cpsdvsr, scr })
        } else {
            None
        }
    }

    /// Finds the divider reaching `bit_rate` from `source` with the smallest
    /// prescaler, which keeps SCR (and so the rate resolution) as large as
    /// possible. Rates that do not divide evenly come out slightly fast.
    pub fn for_bit_rate(source: Hertz, bit_rate: Hertz) -> Result<Self, Error> {
        if bit_rate.0 == 0 || bit_rate.0 > source.0 / 2 {
            return Err(Error::UnreachableBitRate);
        }
        let ratio = source.0 / bit_rate.0;

        let mut cpsdvsr = 2u32;
        while cpsdvsr <= 254 {
            let scr = (ratio / cpsdvsr).saturating_sub(1);
            match cast::u8(scr) {
                Ok(scr) if scr < u8::MAX => {
                    let cpsdvsr = cast::u8(cpsdvsr).map_err(|_| Error::UnreachableBitRate)?;
                    return Ok(ClockDivider { cpsdvsr, scr });
                }
                _ => {}
            }
            cpsdvsr += 2;
        }
        Err(Error::UnreachableBitRate)
    }

    /// CPSDVSR value
    #[inline]
    pub const fn cpsdvsr(self) -> u8 {
        self.cpsdvsr
    }

    /// SCR value
    #[inline]
    pub const fn scr(self) -> u8 {
        self.scr
    }

    /// Serial clock produced from `source`
    #[inline]
    pub const fn bit_rate(self, source: Hertz) -> Hertz {
        Hertz(source.0 / (self.cpsdvsr as u32 * (1 + self.scr as u32)))
    }
}

/// A set of SSI interrupt sources, laid out as in the IM/RIS/MIS registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interrupts(u32);

impl Interrupts {
    /// No interrupts
    pub const NONE: Interrupts = Interrupts(0);
    /// Receive FIFO overrun
    pub const RX_OVERRUN: Interrupts = Interrupts(1 << 0);
    /// Receive FIFO not empty and idle for 32 bit periods
    pub const RX_TIMEOUT: Interrupts = Interrupts(1 << 1);
    /// Receive FIFO at least half full
    pub const RX_FIFO: Interrupts = Interrupts(1 << 2);
    /// Transmit FIFO at most half full
    pub const TX_FIFO: Interrupts = Interrupts(1 << 3);

    /// Sources an interrupt-driven transmit waits on
    pub const TX_TRANSFER: Interrupts = Interrupts::TX_FIFO;
    /// Sources an interrupt-driven receive waits on. The timeout catches the
    /// final frames that never fill half the FIFO.
    pub const RX_TRANSFER: Interrupts = Interrupts(Interrupts::RX_FIFO.0 | Interrupts::RX_TIMEOUT.0);

    /// Register bits
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a set from register bits, ignoring reserved ones
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Interrupts(bits & 0xF)
    }

    /// Does this set include every source in `other`?
    #[inline]
    pub const fn contains(self, other: Interrupts) -> bool {
        self.0 & other.0 == other.0
    }

    /// Does this set share any source with `other`?
    #[inline]
    pub const fn intersects(self, other: Interrupts) -> bool {
        self.0 & other.0 != 0
    }

    /// Sources in `self` but not in `other`
    #[inline]
    pub const fn without(self, other: Interrupts) -> Self {
        Interrupts(self.0 & !other.0)
    }

    /// Is the set empty?
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Interrupts {
    type Output = Interrupts;

    #[inline]
    fn bitor(self, rhs: Interrupts) -> Interrupts {
        Interrupts(self.0 | rhs.0)
    }
}

/// Everything needed to bring up an SSI module.
///
/// The default is a Freescale SPI master with 16-bit frames in mode 0, clocked
/// from the system clock divided by 2 * (1 + 3), with no interrupts. At a
/// 16 MHz system clock that is a 2 MHz serial clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Master or slave
    pub role: Role,
    /// Baud clock source
    pub clock_source: ClockSource,
    /// Baud clock divider
    pub divider: ClockDivider,
    /// Clock polarity and phase (Freescale frames only)
    pub mode: Mode,
    /// Frame format
    pub frame_format: FrameFormat,
    /// Bits per frame
    pub data_size: DataSize,
    /// Internally connect the transmit shift register to the receive one
    pub loopback: bool,
    /// Interrupt sources unmasked at start-up
    pub interrupts: Interrupts,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            role: Role::Master,
            clock_source: ClockSource::System,
            divider: ClockDivider { cpsdvsr: 2, scr: 3 },
            mode: MODE_0,
            frame_format: FrameFormat::Freescale,
            data_size: DataSize::SIXTEEN,
            loopback: false,
            interrupts: Interrupts::NONE,
        }
    }
}

impl Config {
    /// CR0 value: SCR, SPH, SPO, FRF and DSS
    pub fn cr0(&self) -> u32 {
        let mut cr0 = (u32::from(self.divider.scr) << regs::CR0_SCR_SHIFT)
            | (self.frame_format.frf() << regs::CR0_FRF_SHIFT)
            | self.data_size.dss();
        if self.mode.phase == Phase::CaptureOnSecondTransition {
            cr0 |= regs::CR0_SPH;
        }
        if self.mode.polarity == Polarity::IdleHigh {
            cr0 |= regs::CR0_SPO;
        }
        cr0
    }

    /// CR1 value with the port still disabled
    #[inline]
    pub fn cr1(&self) -> u32 {
        let mut cr1 = self.role.cr1();
        if self.loopback {
            cr1 |= regs::CR1_LBM;
        }
        cr1
    }

    /// CC value
    #[inline]
    pub fn cc(&self) -> u32 {
        self.clock_source.cc()
    }

    /// CPSR value
    #[inline]
    pub fn cpsr(&self) -> u8 {
        self.divider.cpsdvsr
    }

    /// IM value
    #[inline]
    pub fn im(&self) -> u32 {
        self.interrupts.bits()
    }

    /// Serial clock this configuration produces
    #[inline]
    pub fn bit_rate(&self, sysclk: Hertz) -> Hertz {
        self.divider.bit_rate(self.clock_source.frequency(sysclk))
    }
}

/// Runs a full-duplex transfer one frame at a time through `exchange`.
///
/// `max(read.len(), write.len())` frames go out. Past the end of `write` the
/// `fill` frame is sent; replies past the end of `read` are dropped.
pub fn transfer_padded<T, E>(
    read: &mut [T],
    write: &[T],
    fill: T,
    mut exchange: impl FnMut(T) -> Result<T, E>,
) -> Result<(), E>
where
    T: Copy,
{
    for i in 0..read.len().max(write.len()) {
        let reply = exchange(write.get(i).copied().unwrap_or(fill))?;
        if let Some(slot) = read.get_mut(i) {
            *slot = reply;
        }
    }
    Ok(())
}

/// The FIFO-level access the interrupt bookkeeping needs from one SSI module.
pub trait Fifo {
    /// Transmit FIFO has room for another frame
    fn tx_ready(&self) -> bool;

    /// Receive FIFO holds at least one frame
    fn rx_ready(&self) -> bool;

    /// Queues one frame for transmission
    fn push(&mut self, word: u16);

    /// Takes one received frame
    fn pop(&mut self) -> u16;

    /// Masks the given interrupt sources
    fn disable(&mut self, interrupts: Interrupts);
}

/// An outgoing interrupt-driven transfer.
#[derive(Debug)]
pub struct TxTransfer {
    buffer: &'static [u16],
    sent: usize,
}

impl TxTransfer {
    /// Starts tracking `buffer`
    #[inline]
    pub const fn new(buffer: &'static [u16]) -> Self {
        TxTransfer { buffer, sent: 0 }
    }

    /// Frames not yet queued
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.sent
    }

    /// Has every frame been queued?
    #[inline]
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Queues frames while the FIFO has room. Returns how many were queued.
    pub fn service<F: Fifo>(&mut self, fifo: &mut F) -> usize {
        let start = self.sent;
        while let Some(&word) = self.buffer.get(self.sent) {
            if !fifo.tx_ready() {
                break;
            }
            fifo.push(word);
            self.sent += 1;
        }
        self.sent - start
    }

    /// Gives the buffer back
    #[inline]
    pub fn into_buffer(self) -> &'static [u16] {
        self.buffer
    }
}

/// An incoming interrupt-driven transfer.
#[derive(Debug)]
pub struct RxTransfer {
    buffer: &'static mut [u16],
    received: usize,
    mask: u16,
}

impl RxTransfer {
    /// Starts filling `buffer`, keeping only the bits of `data_size`
    #[inline]
    pub fn new(buffer: &'static mut [u16], data_size: DataSize) -> Self {
        RxTransfer {
            buffer,
            received: 0,
            mask: data_size.mask(),
        }
    }

    /// Frames still expected
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.received
    }

    /// Has the buffer been filled?
    #[inline]
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Drains the FIFO into the buffer. Returns how many frames were stored.
    pub fn service<F: Fifo>(&mut self, fifo: &mut F) -> usize {
        let start = self.received;
        while let Some(slot) = self.buffer.get_mut(self.received) {
            if !fifo.rx_ready() {
                break;
            }
            *slot = fifo.pop() & self.mask;
            self.received += 1;
        }
        self.received - start
    }

    /// Gives the buffer back
    #[inline]
    pub fn into_buffer(self) -> &'static mut [u16] {
        self.buffer
    }
}

/// Interrupt transfer state of one SSI module: at most one transfer in each
/// direction.
///
/// Every frame sent clocks a frame in. Replies that no receive transfer is
/// waiting for are read and dropped, as the blocking writes do, so a later
/// transfer never sees them.
#[derive(Debug)]
pub struct Channel {
    tx: Option<TxTransfer>,
    rx: Option<RxTransfer>,
    /// Replies to queued frames not yet taken from the receive FIFO
    unclaimed: usize,
}

impl Default for Channel {
    fn default() -> Self {
        Channel::new()
    }
}

impl Channel {
    /// A channel with nothing in flight
    #[inline]
    pub const fn new() -> Self {
        Channel {
            tx: None,
            rx: None,
            unclaimed: 0,
        }
    }

    /// Registers an outgoing transfer. The caller unmasks
    /// [`Channel::interrupts`] afterwards.
    pub fn start_tx(&mut self, buffer: &'static [u16]) -> Result<(), Error> {
        if self.tx_pending() {
            return Err(Error::Busy);
        }
        self.tx = Some(TxTransfer::new(buffer));
        Ok(())
    }

    /// Registers an incoming transfer. The caller unmasks
    /// [`Channel::interrupts`] afterwards.
    pub fn start_rx(&mut self, buffer: &'static mut [u16], data_size: DataSize) -> Result<(), Error> {
        if self.rx_pending() {
            return Err(Error::Busy);
        }
        self.rx = Some(RxTransfer::new(buffer, data_size));
        Ok(())
    }

    /// Is an outgoing transfer still queuing frames?
    #[inline]
    pub fn tx_pending(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_done())
    }

    /// Is an incoming transfer still waiting for frames?
    #[inline]
    pub fn rx_pending(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| !rx.is_done())
    }

    /// Are replies to sent frames still to be read and dropped?
    #[inline]
    pub fn is_draining(&self) -> bool {
        self.unclaimed > 0 && !self.rx_pending()
    }

    /// Is anything still moving in either direction?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.tx_pending() || self.rx_pending() || self.unclaimed > 0
    }

    /// Interrupt sources the pending work needs. An outgoing transfer needs
    /// the receive sources too, to drop its replies.
    pub fn interrupts(&self) -> Interrupts {
        let mut wanted = Interrupts::NONE;
        if self.tx_pending() {
            wanted = wanted | Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER;
        }
        if self.rx_pending() || self.unclaimed > 0 {
            wanted = wanted | Interrupts::RX_TRANSFER;
        }
        wanted
    }

    /// Moves frames between the FIFOs and the pending buffers. Each direction
    /// that has nothing left to do gets its interrupt sources masked, so an
    /// idle channel never keeps the handler firing.
    pub fn service<F: Fifo>(&mut self, fifo: &mut F) {
        if let Some(rx) = self.rx.as_mut() {
            let stored = rx.service(fifo);
            self.unclaimed = self.unclaimed.saturating_sub(stored);
        }
        if let Some(tx) = self.tx.as_mut() {
            self.unclaimed += tx.service(fifo);
        }
        while self.is_draining() && fifo.rx_ready() {
            fifo.pop();
            self.unclaimed -= 1;
        }

        let mut idle = Interrupts::NONE;
        if !self.tx_pending() {
            idle = idle | Interrupts::TX_TRANSFER;
        }
        if !self.rx_pending() && self.unclaimed == 0 {
            idle = idle | Interrupts::RX_TRANSFER;
        }
        if !idle.is_empty() {
            fifo.disable(idle);
        }
    }

    /// Takes back the buffer of a finished outgoing transfer
    pub fn take_tx(&mut self) -> Option<&'static [u16]> {
        if self.tx.as_ref()?.is_done() {
            self.tx.take().map(TxTransfer::into_buffer)
        } else {
            None
        }
    }

    /// Takes back the buffer of a finished incoming transfer
    pub fn take_rx(&mut self) -> Option<&'static mut [u16]> {
        if self.rx.as_ref()?.is_done() {
            self.rx.take().map(RxTransfer::into_buffer)
        } else {
            None
        }
    }

    /// Abandons whatever is in flight, masking both directions, and hands
    /// back the buffers.
    pub fn cancel<F: Fifo>(
        &mut self,
        fifo: &mut F,
    ) -> (Option<&'static [u16]>, Option<&'static mut [u16]>) {
        fifo.disable(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER);
        self.unclaimed = 0;
        (
            self.tx.take().map(TxTransfer::into_buffer),
            self.rx.take().map(RxTransfer::into_buffer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// A FIFO pair with the hardware's eight-entry depth.
    struct MockFifo {
        tx: Vec<u16>,
        tx_depth: usize,
        rx: VecDeque<u16>,
        im: u32,
        /// Every frame pushed comes straight back, as with `LBM` set.
        loopback: bool,
    }

    impl MockFifo {
        fn new(im: Interrupts) -> Self {
            MockFifo {
                tx: Vec::new(),
                tx_depth: 0,
                rx: VecDeque::new(),
                im: im.bits(),
                loopback: false,
            }
        }

        fn looped(im: Interrupts) -> Self {
            MockFifo {
                loopback: true,
                ..MockFifo::new(im)
            }
        }

        /// The shifter sends everything queued so far.
        fn shift_out(&mut self) {
            self.tx_depth = 0;
        }
    }

    impl Fifo for MockFifo {
        fn tx_ready(&self) -> bool {
            self.tx_depth < 8
        }

        fn rx_ready(&self) -> bool {
            !self.rx.is_empty()
        }

        fn push(&mut self, word: u16) {
            self.tx.push(word);
            self.tx_depth += 1;
            if self.loopback {
                self.rx.push_back(word);
            }
        }

        fn pop(&mut self) -> u16 {
            self.rx.pop_front().unwrap_or(0)
        }

        fn disable(&mut self, interrupts: Interrupts) {
            self.im &= !interrupts.bits();
        }
    }

    fn leak<T: Copy>(words: &[T]) -> &'static mut [T] {
        Box::leak(words.to_vec().into_boxed_slice())
    }

    #[test]
    fn default_config_matches_spi_start() {
        let config = Config::default();
        // SCR 3, mode 0, Freescale, 16-bit frames.
        assert_eq!(config.cr0(), 0x0000_030F);
        assert_eq!(config.cr1(), 0);
        assert_eq!(config.cc(), 0);
        assert_eq!(config.cpsr(), 2);
        assert_eq!(config.im(), 0);
        assert_eq!(config.bit_rate(Hertz(16_000_000)), Hertz(2_000_000));
    }

    #[test]
    fn cr0_places_every_field() {
        let config = Config {
            divider: ClockDivider::new(4, 0xA5).unwrap(),
            mode: MODE_3,
            frame_format: FrameFormat::Microwire,
            data_size: DataSize::EIGHT,
            ..Config::default()
        };
        assert_eq!(config.cr0(), 0xA500 | regs::CR0_SPH | regs::CR0_SPO | (2 << 4) | 7);

        let ti = Config {
            mode: MODE_1,
            frame_format: FrameFormat::TexasInstruments,
            data_size: DataSize::new(4).unwrap(),
            ..Config::default()
        };
        assert_eq!(ti.cr0(), 0x0300 | regs::CR0_SPH | (1 << 4) | 3);
    }

    #[test]
    fn roles_select_master_slave_bits() {
        let slave = Config {
            role: Role::Slave,
            ..Config::default()
        };
        assert_eq!(slave.cr1(), 0x4);

        let quiet = Config {
            role: Role::SlaveOutputDisabled,
            loopback: true,
            ..Config::default()
        };
        assert_eq!(quiet.cr1(), 0xC | regs::CR1_LBM);
        assert_eq!(quiet.cr1() & regs::CR1_SSE, 0);
    }

    #[test]
    fn piosc_clock_source() {
        let config = Config {
            clock_source: ClockSource::PrecisionInternal,
            ..Config::default()
        };
        assert_eq!(config.cc(), 0x5);
        // The system clock is ignored once PIOSC feeds the module.
        assert_eq!(config.bit_rate(Hertz(80_000_000)), Hertz(2_000_000));
    }

    #[test]
    fn data_size_limits() {
        assert_eq!(DataSize::new(3), None);
        assert_eq!(DataSize::new(17), None);
        assert_eq!(DataSize::new(4).map(DataSize::dss), Some(3));
        assert_eq!(DataSize::SIXTEEN.dss(), 0xF);
        assert_eq!(DataSize::new(12).map(DataSize::mask), Some(0x0FFF));
        assert_eq!(DataSize::SIXTEEN.mask(), 0xFFFF);
    }

    #[test]
    fn divider_rejects_odd_prescaler() {
        assert_eq!(ClockDivider::new(3, 0), None);
        assert_eq!(ClockDivider::new(0, 0), None);
        assert!(ClockDivider::new(254, 255).is_some());
    }

    #[test]
    fn divider_for_common_rates() {
        let sysclk = Hertz(16_000_000);
        let d = ClockDivider::for_bit_rate(sysclk, Hertz(2_000_000)).unwrap();
        assert_eq!((d.cpsdvsr(), d.scr()), (2, 3));
        assert_eq!(d.bit_rate(sysclk), Hertz(2_000_000));

        let d = ClockDivider::for_bit_rate(sysclk, Hertz(8_000_000)).unwrap();
        assert_eq!((d.cpsdvsr(), d.scr()), (2, 0));

        let sysclk = Hertz(80_000_000);
        let d = ClockDivider::for_bit_rate(sysclk, Hertz(100_000)).unwrap();
        assert_eq!((d.cpsdvsr(), d.scr()), (4, 199));
        assert_eq!(d.bit_rate(sysclk), Hertz(100_000));
    }

    #[test]
    fn divider_out_of_range() {
        let sysclk = Hertz(16_000_000);
        assert_eq!(
            ClockDivider::for_bit_rate(sysclk, Hertz(0)),
            Err(Error::UnreachableBitRate)
        );
        assert_eq!(
            ClockDivider::for_bit_rate(sysclk, Hertz(10_000_000)),
            Err(Error::UnreachableBitRate)
        );
        // 16 MHz / (254 * 256) is about 246 Hz.
        assert_eq!(
            ClockDivider::for_bit_rate(sysclk, Hertz(200)),
            Err(Error::UnreachableBitRate)
        );
        assert!(ClockDivider::for_bit_rate(sysclk, Hertz(300)).is_ok());
    }

    #[test]
    fn divider_never_uses_top_scr() {
        // 512:1 fits CPSDVSR 2 only with SCR 255; the next prescaler is used.
        let sysclk = Hertz(16_000_000);
        let d = ClockDivider::for_bit_rate(sysclk, Hertz(31_250)).unwrap();
        assert_eq!((d.cpsdvsr(), d.scr()), (4, 127));
        assert_eq!(d.bit_rate(sysclk), Hertz(31_250));
    }

    #[test]
    fn padded_transfer_fills_short_write() {
        let mut sent = Vec::new();
        let mut read = [0u16; 4];
        transfer_padded(&mut read, &[1, 2], regs::FILL_WORD, |word| {
            sent.push(word);
            Ok::<_, Error>(word + 1)
        })
        .unwrap();
        assert_eq!(sent, [1, 2, 0xFFFF, 0xFFFF]);
        assert_eq!(read, [2, 3, 0, 0]);
    }

    #[test]
    fn padded_transfer_drops_extra_replies() {
        let mut sent = Vec::new();
        let mut read = [0u8; 1];
        transfer_padded(&mut read, &[7, 8, 9], 0xFF, |byte| {
            sent.push(byte);
            Ok::<_, Error>(byte * 2)
        })
        .unwrap();
        assert_eq!(sent, [7, 8, 9]);
        assert_eq!(read, [14]);
    }

    #[test]
    fn padded_transfer_stops_at_first_error() {
        let mut calls = 0;
        let mut read = [0u16; 3];
        let result = transfer_padded(&mut read, &[1, 2, 3], 0, |word| {
            calls += 1;
            if word == 2 {
                Err(Error::Overrun)
            } else {
                Ok(word)
            }
        });
        assert_eq!(result, Err(Error::Overrun));
        assert_eq!(calls, 2);
        assert_eq!(read, [1, 0, 0]);
    }

    #[test]
    fn interrupt_sets() {
        let both = Interrupts::TX_FIFO | Interrupts::RX_FIFO;
        assert_eq!(both.bits(), 0xC);
        assert!(both.contains(Interrupts::TX_FIFO));
        assert!(!both.contains(Interrupts::RX_TRANSFER));
        assert!(both.intersects(Interrupts::RX_TRANSFER));
        assert_eq!(both.without(Interrupts::TX_FIFO), Interrupts::RX_FIFO);
        assert_eq!(Interrupts::from_bits(0xFF).bits(), 0xF);
    }

    #[test]
    fn tx_transfer_refills_fifo_until_done() {
        let words: &'static [u16] = leak(&[1u16, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let mut fifo = MockFifo::new(Interrupts::TX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_tx(words).unwrap();

        channel.service(&mut fifo);
        assert_eq!(fifo.tx, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(channel.tx_pending());
        assert!(Interrupts::from_bits(fifo.im).contains(Interrupts::TX_FIFO));
        assert_eq!(channel.take_tx(), None);

        fifo.shift_out();
        channel.service(&mut fifo);
        assert_eq!(fifo.tx, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert!(!channel.tx_pending());
        assert!(!Interrupts::from_bits(fifo.im).intersects(Interrupts::TX_FIFO));
        assert_eq!(channel.take_tx(), Some(words));
        assert_eq!(channel.take_tx(), None);
    }

    #[test]
    fn rx_transfer_masks_sources_when_full() {
        let buffer = leak(&[0u16; 3]);
        let mut fifo = MockFifo::new(Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_rx(buffer, DataSize::SIXTEEN).unwrap();

        fifo.rx.push_back(0xAAAA);
        channel.service(&mut fifo);
        assert!(channel.rx_pending());
        assert_eq!(fifo.im, Interrupts::RX_TRANSFER.bits());

        fifo.rx.extend([0xBBBB, 0xCCCC, 0xDDDD]);
        channel.service(&mut fifo);
        assert!(!channel.rx_pending());
        assert_eq!(fifo.im, 0);
        // Frames beyond the buffer stay in the FIFO.
        assert_eq!(fifo.rx, [0xDDDD]);
        assert_eq!(channel.take_rx().map(|b| b.to_vec()), Some(vec![0xAAAA, 0xBBBB, 0xCCCC]));
    }

    #[test]
    fn rx_transfer_keeps_only_frame_bits() {
        let buffer = leak(&[0u16; 2]);
        let mut fifo = MockFifo::new(Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_rx(buffer, DataSize::EIGHT).unwrap();
        fifo.rx.extend([0x1234, 0xFF56]);
        channel.service(&mut fifo);
        assert_eq!(channel.take_rx().map(|b| b.to_vec()), Some(vec![0x34, 0x56]));
    }

    #[test]
    fn tx_only_transfer_drops_its_replies() {
        let mut fifo = MockFifo::looped(Interrupts::NONE);
        let mut channel = Channel::new();
        channel.start_tx(leak(&[1u16, 2, 3])).unwrap();
        let wanted = channel.interrupts();
        assert!(wanted.contains(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER));
        fifo.im = wanted.bits();

        channel.service(&mut fifo);
        assert_eq!(fifo.tx, [1, 2, 3]);
        assert!(fifo.rx.is_empty());
        assert!(!channel.is_active());
        assert_eq!(fifo.im, 0);
    }

    #[test]
    fn late_replies_are_dropped_on_a_later_interrupt() {
        let mut fifo = MockFifo::new(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_tx(leak(&[1u16, 2, 3])).unwrap();

        channel.service(&mut fifo);
        assert!(!channel.tx_pending());
        assert!(channel.is_draining());
        // Receive sources stay live until the replies are in.
        assert_eq!(fifo.im, Interrupts::RX_TRANSFER.bits());

        // Two replies arrive, then the third with a frame nobody sent for.
        fifo.rx.extend([0xA1, 0xA2]);
        channel.service(&mut fifo);
        assert!(channel.is_draining());
        fifo.rx.extend([0xA3, 0x55]);
        channel.service(&mut fifo);
        assert!(!channel.is_active());
        assert_eq!(fifo.rx, [0x55]);
        assert_eq!(fifo.im, 0);
    }

    #[test]
    fn replies_past_a_short_read_are_dropped() {
        let mut fifo = MockFifo::looped(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_rx(leak(&[0u16; 2]), DataSize::SIXTEEN).unwrap();
        channel.start_tx(leak(&[5u16, 6, 7, 8])).unwrap();

        channel.service(&mut fifo);
        channel.service(&mut fifo);
        assert!(fifo.rx.is_empty());
        assert!(!channel.is_active());
        assert_eq!(channel.take_rx().map(|b| b.to_vec()), Some(vec![5, 6]));
    }

    #[test]
    fn read_claims_replies_before_they_are_dropped() {
        let mut fifo = MockFifo::looped(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_rx(leak(&[0u16; 3]), DataSize::SIXTEEN).unwrap();
        channel.start_tx(leak(&[1u16, 2, 3])).unwrap();

        // The first pass queues the frames; the second collects the replies.
        channel.service(&mut fifo);
        channel.service(&mut fifo);
        assert!(!channel.is_active());
        assert_eq!(channel.take_rx().map(|b| b.to_vec()), Some(vec![1, 2, 3]));
    }

    #[test]
    fn second_transfer_in_flight_is_refused() {
        let mut channel = Channel::new();
        channel.start_tx(leak(&[1u16, 2])).unwrap();
        assert_eq!(channel.start_tx(leak(&[3u16])), Err(Error::Busy));

        // The receive direction is independent.
        channel.start_rx(leak(&[0u16]), DataSize::SIXTEEN).unwrap();
        assert_eq!(
            channel.start_rx(leak(&[0u16]), DataSize::SIXTEEN),
            Err(Error::Busy)
        );
    }

    #[test]
    fn finished_transfer_can_be_replaced() {
        let mut fifo = MockFifo::new(Interrupts::TX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_tx(leak(&[1u16])).unwrap();
        channel.service(&mut fifo);
        assert!(channel.start_tx(leak(&[2u16])).is_ok());
        assert!(channel.tx_pending());
    }

    #[test]
    fn empty_transfers_are_done_at_once() {
        let mut channel = Channel::new();
        channel.start_tx(leak::<u16>(&[])).unwrap();
        channel.start_rx(leak::<u16>(&[]), DataSize::SIXTEEN).unwrap();
        assert!(!channel.tx_pending());
        assert!(!channel.rx_pending());
        assert_eq!(channel.take_tx().map(<[u16]>::len), Some(0));
        assert_eq!(channel.take_rx().map(|b| b.len()), Some(0));
    }

    #[test]
    fn idle_channel_masks_stray_sources() {
        let mut fifo = MockFifo::new(Interrupts::TX_FIFO | Interrupts::RX_OVERRUN);
        Channel::new().service(&mut fifo);
        assert_eq!(fifo.im, Interrupts::RX_OVERRUN.bits());
    }

    #[test]
    fn cancel_returns_buffers() {
        let mut fifo = MockFifo::new(Interrupts::TX_TRANSFER | Interrupts::RX_TRANSFER);
        let mut channel = Channel::new();
        channel.start_tx(leak(&[1u16, 2])).unwrap();
        channel.start_rx(leak(&[0u16; 4]), DataSize::SIXTEEN).unwrap();
        channel.service(&mut fifo);
        let (tx, rx) = channel.cancel(&mut fifo);
        assert_eq!(tx.map(<[u16]>::len), Some(2));
        assert_eq!(rx.map(|b| b.len()), Some(4));
        assert_eq!(fifo.im, 0);
        assert!(!channel.is_active());
    }

    #[test]
    fn overrun_maps_to_embedded_hal_kind() {
        use embedded_hal::spi::{Error as _, ErrorKind};
        assert_eq!(Error::Overrun.kind(), ErrorKind::Overrun);
        assert_eq!(Error::Busy.kind(), ErrorKind::Other);
    }
}
