//! Transceiver interface
//!
//! What the link controller needs from a packet radio. Framing, CRC and
//! modem configuration stay inside the driver.

use core::fmt;

use super::state::RadioEvent;

/// Transceiver bring-up failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    /// Chip answered with an unexpected silicon version
    VersionMismatch {
        /// Version register contents
        found: u8,
    },
    /// Bus transfer failed
    Bus,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch { found } => write!(f, "unexpected radio version 0x{found:02X}"),
            Self::Bus => write!(f, "radio bus error"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for InitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::VersionMismatch { found } => defmt::write!(f, "VersionMismatch(0x{:02X})", found),
            Self::Bus => defmt::write!(f, "Bus"),
        }
    }
}

/// Half-duplex packet transceiver
///
/// Everything past [`Transceiver::begin`] is infallible at this interface;
/// drivers log and drop bus errors.
pub trait Transceiver {
    /// Reset and configure the chip for the given channel
    fn begin(&mut self, frequency_hz: u32) -> Result<(), InitError>;

    /// Enter standby
    fn idle(&mut self);

    /// Enter continuous receive
    fn receive_continuous(&mut self);

    /// Enable or disable I/Q inversion
    fn set_invert_iq(&mut self, inverted: bool);

    /// Start sending one frame; completion is reported through
    /// [`Transceiver::take_irq`]
    fn transmit(&mut self, frame: &[u8]);

    /// Copy the received frame into `buf`, returns bytes copied
    fn read_packet(&mut self, buf: &mut [u8]) -> usize;

    /// Read and clear pending interrupt flags
    fn take_irq(&mut self) -> Option<RadioEvent>;

    /// RSSI of the last received frame in dBm
    fn packet_rssi(&mut self) -> i16;
}
