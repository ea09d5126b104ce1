//! Common I2C code: errors, bus speeds and master status decoding

use embedded_hal::i2c::{self, Operation};

use crate::time::Hertz;

/// Bits of the master control/status register as read back
pub mod status {
    /// Controller busy
    pub const BUSY: u32 = 1 << 0;
    /// Last operation failed
    pub const ERROR: u32 = 1 << 1;
    /// Address not acknowledged
    pub const ADRACK: u32 = 1 << 2;
    /// Data not acknowledged
    pub const DATACK: u32 = 1 << 3;
    /// Arbitration lost
    pub const ARBLST: u32 = 1 << 4;
    /// Controller idle
    pub const IDLE: u32 = 1 << 5;
    /// Bus busy
    pub const BUSBSY: u32 = 1 << 6;
    /// Clock low timeout
    pub const CLKTO: u32 = 1 << 7;
}

/// Bits of the master control/status register as written
pub mod command {
    /// Enable the controller for one step
    pub const RUN: u32 = 1 << 0;
    /// Generate (repeated) START
    pub const START: u32 = 1 << 1;
    /// Generate STOP
    pub const STOP: u32 = 1 << 2;
    /// Acknowledge received data
    pub const ACK: u32 = 1 << 3;
    /// High-speed mode
    pub const HS: u32 = 1 << 4;
}

/// I2C error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Bus Busy
    BusBusy,

    /// Arbitration loss
    Arbitration,

    /// Missing Data ACK
    DataAck,

    /// Missing Address ACK
    AdrAck,

    /// I2C Timeout
    Timeout,

    /// The requested SCL rate cannot be derived from the system clock
    UnreachableClock,
}

impl Error {
    /// Does the master still own the bus after this error? If so it has to
    /// release it with a STOP. After arbitration loss another master owns it.
    #[inline]
    pub const fn needs_stop(self) -> bool {
        !matches!(self, Error::Arbitration | Error::UnreachableClock)
    }
}

impl i2c::Error for Error {
    #[inline]
    fn kind(&self) -> i2c::ErrorKind {
        match *self {
            Error::BusBusy => i2c::ErrorKind::Bus,
            Error::Arbitration => i2c::ErrorKind::ArbitrationLoss,
            Error::DataAck => i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Data),
            Error::AdrAck => i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address),
            Error::Timeout | Error::UnreachableClock => i2c::ErrorKind::Other,
        }
    }
}

/// Turns a master status value into the error it reports, if any.
///
/// Only meaningful once BUSY has cleared.
pub fn check_status(mcs: u32) -> Result<(), Error> {
    if mcs & status::CLKTO != 0 {
        Err(Error::Timeout)
    } else if mcs & status::ARBLST != 0 {
        Err(Error::Arbitration)
    } else if mcs & status::ERROR != 0 {
        if mcs & status::ADRACK != 0 {
            Err(Error::AdrAck)
        } else {
            Err(Error::DataAck)
        }
    } else {
        Ok(())
    }
}

/// Standard bus speeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    /// 100 kbit/s
    Standard,
    /// 400 kbit/s
    Fast,
    /// 1 Mbit/s
    FastPlus,
    /// 3.33 Mbit/s
    High,
}

impl Speed {
    /// Nominal SCL rate
    #[inline]
    pub const fn hertz(self) -> Hertz {
        match self {
            Speed::Standard => Hertz(100_000),
            Speed::Fast => Hertz(400_000),
            Speed::FastPlus => Hertz(1_000_000),
            Speed::High => Hertz(3_333_333),
        }
    }

    /// Slowest standard speed able to carry `scl`
    pub fn for_hertz(scl: Hertz) -> Self {
        if scl <= Speed::Standard.hertz() {
            Speed::Standard
        } else if scl <= Speed::Fast.hertz() {
            Speed::Fast
        } else if scl <= Speed::FastPlus.hertz() {
            Speed::FastPlus
        } else {
            Speed::High
        }
    }

    /// Does this speed need the high-speed timing and the HS command bit?
    #[inline]
    pub const fn is_high_speed(self) -> bool {
        matches!(self, Speed::High)
    }

    /// SCL low plus high period in timer ticks
    #[inline]
    const fn scl_period(self) -> u32 {
        if self.is_high_speed() {
            3
        } else {
            10
        }
    }
}

/// Computes the master timer period (TPR) for an SCL rate of `scl`.
///
/// `TPR = sysclk / (2 * (SCL_LP + SCL_HP) * scl) - 1`, where the low and high
/// periods add up to 10 ticks, or 3 in high-speed mode. TPR is 7 bits wide.
pub fn timer_period(sysclk: Hertz, scl: Hertz) -> Result<u8, Error> {
    if scl.0 == 0 {
        return Err(Error::UnreachableClock);
    }
    let per_bit = 2 * Speed::for_hertz(scl).scl_period() * scl.0;
    let tpr = (sysclk.0 / per_bit)
        .checked_sub(1)
        .ok_or(Error::UnreachableClock)?;
    match cast::u8(tpr) {
        Ok(tpr) if tpr <= 0x7F => Ok(tpr),
        _ => Err(Error::UnreachableClock),
    }
}

/// Which way the data of a segment moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Master to slave
    Write,
    /// Slave to master
    Read,
}

/// How one run of bytes in a single direction is framed on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Direction of the bytes
    pub direction: Direction,
    /// Address the slave first, with a (repeated) START
    pub start: bool,
    /// End the transaction with STOP after the last byte
    pub stop: bool,
    /// Acknowledge the last byte read, because the next segment goes on
    /// reading without a restart
    pub ack_last: bool,
}

impl Segment {
    /// A whole transaction in one direction: START, the bytes, STOP.
    #[inline]
    pub const fn single(direction: Direction) -> Self {
        Segment {
            direction,
            start: true,
            stop: true,
            ack_last: false,
        }
    }

    /// Master command moving byte `index` of a `len`-byte segment.
    ///
    /// A read NACKs its last byte unless `ack_last` is set; without `stop`
    /// that NACK is followed by the next segment's repeated START.
    pub fn command(&self, index: usize, len: usize) -> u32 {
        let mut cmd = command::RUN;
        if index == 0 && self.start {
            cmd |= command::START;
        }
        let last = index + 1 >= len;
        match self.direction {
            Direction::Write => {
                if last && self.stop {
                    cmd |= command::STOP;
                }
            }
            Direction::Read => {
                if !last || self.ack_last {
                    cmd |= command::ACK;
                } else if self.stop {
                    cmd |= command::STOP;
                }
            }
        }
        cmd
    }
}

fn operation_direction(operation: &Operation<'_>) -> Option<Direction> {
    match operation {
        Operation::Write(bytes) if !bytes.is_empty() => Some(Direction::Write),
        Operation::Read(buffer) if !buffer.is_empty() => Some(Direction::Read),
        _ => None,
    }
}

/// Frames operation `n` of a transaction.
///
/// Empty operations put nothing on the wire and give `None`; the STOP then
/// goes with the last operation that moves data. Adjacent operations in the
/// same direction are merged, and a change of direction gets a repeated
/// START.
pub fn segment(operations: &[Operation<'_>], n: usize) -> Option<Segment> {
    let direction = operations.get(n).and_then(operation_direction)?;
    let previous = operations[..n].iter().rev().find_map(operation_direction);
    let next = operations[n + 1..].iter().find_map(operation_direction);
    Some(Segment {
        direction,
        start: previous != Some(direction),
        stop: next.is_none(),
        ack_last: direction == Direction::Read && next == Some(Direction::Read),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    use super::command::{ACK, RUN, START, STOP};

    fn commands(segment: Segment, len: usize) -> Vec<u32> {
        (0..len).map(|i| segment.command(i, len)).collect()
    }

    fn plan(operations: &[Operation<'_>]) -> Vec<Option<Segment>> {
        (0..operations.len()).map(|n| segment(operations, n)).collect()
    }

    #[test]
    fn single_byte_read_nacks_and_stops() {
        let read = Segment::single(Direction::Read);
        assert_eq!(commands(read, 1), [RUN | START | STOP]);
        assert_eq!(commands(read, 3), [RUN | START | ACK, RUN | ACK, RUN | STOP]);
    }

    #[test]
    fn write_burst_framing() {
        let write = Segment::single(Direction::Write);
        assert_eq!(commands(write, 1), [RUN | START | STOP]);
        assert_eq!(commands(write, 3), [RUN | START, RUN, RUN | STOP]);
    }

    #[test]
    fn write_then_read_restarts() {
        let mut buffer = [0u8; 2];
        let operations = [Operation::Write(&[0x10, 0x11]), Operation::Read(&mut buffer)];
        let segments = plan(&operations);

        let write = segments[0].unwrap();
        assert!(write.start && !write.stop);
        assert_eq!(commands(write, 2), [RUN | START, RUN]);

        let read = segments[1].unwrap();
        assert!(read.start && read.stop && !read.ack_last);
        assert_eq!(commands(read, 2), [RUN | START | ACK, RUN | STOP]);
    }

    #[test]
    fn consecutive_reads_are_merged() {
        let (mut first, mut second) = ([0u8; 2], [0u8; 2]);
        let operations = [Operation::Read(&mut first), Operation::Read(&mut second)];
        let segments = plan(&operations);

        // The first read ACKs its last byte and the second carries on.
        let first = segments[0].unwrap();
        assert_eq!(commands(first, 2), [RUN | START | ACK, RUN | ACK]);
        let second = segments[1].unwrap();
        assert!(!second.start);
        assert_eq!(commands(second, 2), [RUN | ACK, RUN | STOP]);
    }

    #[test]
    fn read_then_write_nacks_without_stop() {
        let mut buffer = [0u8; 1];
        let operations = [Operation::Read(&mut buffer), Operation::Write(&[0xAA])];
        let segments = plan(&operations);

        // NACK, then the write's repeated START.
        assert_eq!(commands(segments[0].unwrap(), 1), [RUN | START]);
        assert_eq!(commands(segments[1].unwrap(), 1), [RUN | START | STOP]);
    }

    #[test]
    fn consecutive_writes_are_merged() {
        let operations = [Operation::Write(&[1]), Operation::Write(&[2, 3])];
        let segments = plan(&operations);
        assert_eq!(commands(segments[0].unwrap(), 1), [RUN | START]);
        assert_eq!(commands(segments[1].unwrap(), 2), [RUN, RUN | STOP]);
    }

    #[test]
    fn empty_operations_are_skipped() {
        let mut buffer = [0u8; 1];
        let mut nothing = [0u8; 0];
        let operations = [
            Operation::Write(&[]),
            Operation::Write(&[0x42]),
            Operation::Read(&mut nothing),
            Operation::Write(&[]),
        ];
        let segments = plan(&operations);
        assert_eq!(segments[0], None);
        assert_eq!(segments[2], None);
        assert_eq!(segments[3], None);
        // STOP moves onto the only write that sends anything.
        assert_eq!(segments[1], Some(Segment::single(Direction::Write)));

        let operations = [Operation::Read(&mut buffer), Operation::Write(&[])];
        assert_eq!(plan(&operations)[0], Some(Segment::single(Direction::Read)));
    }

    #[test]
    fn empty_transaction_has_no_segments() {
        assert!(plan(&[]).is_empty());
        assert_eq!(segment(&[], 0), None);
    }

    #[test]
    fn timer_period_for_standard_and_fast() {
        assert_eq!(timer_period(Hertz(16_000_000), Hertz(100_000)), Ok(7));
        assert_eq!(timer_period(Hertz(80_000_000), Hertz(100_000)), Ok(39));
        assert_eq!(timer_period(Hertz(80_000_000), Hertz(400_000)), Ok(9));
        assert_eq!(timer_period(Hertz(80_000_000), Hertz(1_000_000)), Ok(3));
    }

    #[test]
    fn timer_period_for_high_speed() {
        // 80 MHz / (2 * 3 * 3.33 MHz) - 1
        assert_eq!(timer_period(Hertz(80_000_000), Speed::High.hertz()), Ok(3));
    }

    #[test]
    fn timer_period_limits() {
        assert_eq!(
            timer_period(Hertz(16_000_000), Hertz(0)),
            Err(Error::UnreachableClock)
        );
        // Too fast: the quotient is zero.
        assert_eq!(
            timer_period(Hertz(16_000_000), Hertz(1_000_000)),
            Err(Error::UnreachableClock)
        );
        assert_eq!(timer_period(Hertz(16_000_000), Hertz(400_000)), Ok(1));
        assert_eq!(
            timer_period(Hertz(1_000_000), Hertz(100_000)),
            Err(Error::UnreachableClock)
        );
        // Too slow: TPR would not fit in 7 bits.
        assert_eq!(
            timer_period(Hertz(80_000_000), Hertz(10_000)),
            Err(Error::UnreachableClock)
        );
    }

    #[test]
    fn speed_classes() {
        assert_eq!(Speed::for_hertz(Hertz(50_000)), Speed::Standard);
        assert_eq!(Speed::for_hertz(Hertz(100_000)), Speed::Standard);
        assert_eq!(Speed::for_hertz(Hertz(400_000)), Speed::Fast);
        assert_eq!(Speed::for_hertz(Hertz(800_000)), Speed::FastPlus);
        assert_eq!(Speed::for_hertz(Hertz(3_400_000)), Speed::High);
        assert!(Speed::High.is_high_speed());
        assert!(!Speed::FastPlus.is_high_speed());
    }

    #[test]
    fn status_decoding() {
        assert_eq!(check_status(status::IDLE), Ok(()));
        assert_eq!(check_status(status::BUSBSY), Ok(()));
        assert_eq!(
            check_status(status::ERROR | status::ADRACK),
            Err(Error::AdrAck)
        );
        assert_eq!(
            check_status(status::ERROR | status::DATACK),
            Err(Error::DataAck)
        );
        assert_eq!(
            check_status(status::ERROR | status::ARBLST),
            Err(Error::Arbitration)
        );
        assert_eq!(
            check_status(status::CLKTO | status::ERROR),
            Err(Error::Timeout)
        );
    }

    #[test]
    fn stop_after_error() {
        assert!(Error::AdrAck.needs_stop());
        assert!(Error::DataAck.needs_stop());
        assert!(!Error::Arbitration.needs_stop());
    }

    #[test]
    fn error_kinds() {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        assert_eq!(
            Error::AdrAck.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(Error::Arbitration.kind(), ErrorKind::ArbitrationLoss);
        assert_eq!(Error::BusBusy.kind(), ErrorKind::Bus);
    }
}
