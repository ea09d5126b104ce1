//! Prelude

pub use crate::gpio::GpioExt as _tm4c123x_drivers_gpio_GpioExt;
pub use crate::sysctl::SysctlExt as _tm4c123x_drivers_sysctl_SysctlExt;
pub use crate::time::U32Ext as _tm4c123x_drivers_time_U32Ext;
pub use embedded_hal::delay::DelayNs as _embedded_hal_delay_DelayNs;
pub use embedded_hal::digital::{
    InputPin as _embedded_hal_digital_InputPin, OutputPin as _embedded_hal_digital_OutputPin,
    StatefulOutputPin as _embedded_hal_digital_StatefulOutputPin,
};
pub use embedded_hal::i2c::I2c as _embedded_hal_i2c_I2c;
pub use embedded_hal::spi::SpiBus as _embedded_hal_spi_SpiBus;
