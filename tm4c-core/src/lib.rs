//! Chip-independent building blocks for the TM4C123x drivers: register
//! encodings, clock divider math and the interrupt transfer bookkeeping.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod bb;
pub mod delay;
pub mod gpio;
pub mod i2c;
pub mod ssi;
pub mod sysctl;
pub mod time;
