//! SSI, I2C and GPIO drivers for the TM4C123x family of microcontrollers
//!
//! Built on the `tm4c123x` peripheral access crate, implementing the
//! `embedded-hal` 1.0 traits.
//!
//! ```ignore
//! let p = tm4c123x_drivers::Peripherals::take().unwrap();
//! let mut sc = p.SYSCTL.constrain();
//! sc.clock_setup.oscillator = Oscillator::Main(
//!     CrystalFrequency::_16mhz,
//!     SystemClock::UsePll(PllOutputFrequency::_80_00mhz),
//! );
//! let clocks = sc.clock_setup.freeze();
//! let mut portd = p.GPIO_PORTD.split(&sc.power_control);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub use tm4c123x::{self, CorePeripherals, Peripherals};
pub use tm4c_core::{bb, delay, time};

pub mod gpio;
pub mod i2c;
pub mod prelude;
pub mod ssi;
pub mod sysctl;

mod sealed {
    pub trait Sealed {}

    // An unused FSS pin.
    impl Sealed for () {}
}
pub(crate) use sealed::Sealed;
