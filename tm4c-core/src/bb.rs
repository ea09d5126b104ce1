//! Bit-band access to single register bits.
//!
//! The Cortex-M4 aliases every bit of the peripheral region `0x4000_0000` to
//! `0x400F_FFFF` onto its own word in `0x4200_0000` and up. Writing 0 or 1 to
//! the alias word clears or sets the bit without a read-modify-write cycle, so
//! an interrupt cannot slip in between.

use core::ptr::{read_volatile, write_volatile};

const ALIAS_OFFSET: usize = 0x0200_0000;

/// Computes the bit-band alias address of `bit` in the register at `address`.
#[inline]
pub const fn alias_address(address: usize, bit: u8) -> usize {
    let region = address & 0xF000_0000;
    let byte_offset = address & 0x0FFF_FFFF;
    region + ALIAS_OFFSET + (byte_offset * 32) + (bit as usize * 4)
}

#[inline]
fn alias<T>(register: &T, bit: u8) -> *mut u32 {
    alias_address(register as *const T as usize, bit) as *mut u32
}

/// Sets or clears one bit of a register.
///
/// # Safety
///
/// `register` must be a peripheral register inside the bit-band region, and
/// changing the bit must not break an invariant some other owner relies on.
#[inline]
pub unsafe fn change_bit<T>(register: &T, bit: u8, value: bool) {
    write_volatile(alias(register, bit), u32::from(value));
}

/// Pulses one bit of a register high then low, as the software reset
/// registers require.
///
/// # Safety
///
/// Same requirements as [`change_bit`].
#[inline]
pub unsafe fn toggle_bit<T>(register: &T, bit: u8) {
    change_bit(register, bit, true);
    change_bit(register, bit, false);
}

/// Reads one bit of a register.
#[inline]
pub fn read_bit<T>(register: &T, bit: u8) -> bool {
    unsafe { read_volatile(alias(register, bit)) != 0 }
}

/// Spins until one bit of a register reads as set.
#[inline]
pub fn spin_bit<T>(register: &T, bit: u8) {
    while !read_bit(register, bit) {}
}

#[cfg(test)]
mod tests {
    use super::alias_address;

    #[test]
    fn alias_of_sysctl_ssi_gate() {
        // RCGCSSI lives at 0x400F_E61C; bit 3 gates SSI3.
        assert_eq!(alias_address(0x400F_E61C, 0), 0x43FC_C380);
        assert_eq!(alias_address(0x400F_E61C, 3), 0x43FC_C38C);
    }

    #[test]
    fn alias_of_gpio_data() {
        // GPIODATA of port F (APB) with all mask bits set.
        assert_eq!(alias_address(0x4002_53FC, 1), 0x424A_7F84);
    }

    #[test]
    fn consecutive_bits_are_one_word_apart() {
        let base = alias_address(0x4000_8000, 0);
        for bit in 0..32u8 {
            assert_eq!(alias_address(0x4000_8000, bit), base + usize::from(bit) * 4);
        }
    }
}
