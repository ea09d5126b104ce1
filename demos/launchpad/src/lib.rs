//! Shared pieces of the EK-TM4C123GXL demo programs

#![no_std]

pub mod board;
