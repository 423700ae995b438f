//! USB Subsystem
//!
//! Provides the operator console as a USB CDC ACM serial port.

pub mod cdc;
