//! Packet Codec
//!
//! Wire layout of a link payload: one destination node id byte followed by
//! up to [`MAX_BODY_LEN`] body bytes. No length prefix and no checksum; the
//! transceiver's PHY framing and CRC are all the integrity there is.
//!
//! Received frames are never decoded back into a [`Payload`]: the receiver
//! only knows the physical frame size, so inbound bytes are rendered for the
//! console with [`render`] instead.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::config::{MAX_BODY_LEN, MAX_PAYLOAD_LEN};
use crate::console::LINE_END;
use crate::types::DisplayFormat;

/// Encoded on-air frame
pub type Frame = Vec<u8, MAX_PAYLOAD_LEN>;

/// Outgoing link payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    destination: u8,
    body: Vec<u8, MAX_BODY_LEN>,
}

impl Payload {
    /// Build a payload; body bytes past [`MAX_BODY_LEN`] are dropped
    #[must_use]
    pub fn new(destination: u8, body: &[u8]) -> Self {
        let take = body.len().min(MAX_BODY_LEN);
        let mut stored = Vec::new();
        // Cannot fail: take <= capacity
        let _ = stored.extend_from_slice(&body[..take]);
        Self {
            destination,
            body: stored,
        }
    }

    /// Destination node id
    #[must_use]
    pub const fn destination(&self) -> u8 {
        self.destination
    }

    /// Body bytes
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Size on air in bytes
    #[must_use]
    pub fn wire_len(&self) -> usize {
        1 + self.body.len()
    }

    /// Flat copy into an on-air frame
    #[must_use]
    pub fn encode(&self) -> Frame {
        let mut frame = Frame::new();
        let _ = frame.push(self.destination);
        let _ = frame.extend_from_slice(&self.body);
        frame
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Payload {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Payload(dst={}, {=[u8]})", self.destination, self.body.as_slice());
    }
}

/// Render received bytes as one console line
///
/// Decimal prefixes each byte with a space (`" 171"`), hex prints two
/// uppercase digits per byte with no separator, hex+ASCII appends a space
/// and a printable column with `.` for everything outside `0x20..=0x7E`.
pub fn render<W: Write>(bytes: &[u8], format: DisplayFormat, out: &mut W) -> fmt::Result {
    match format {
        DisplayFormat::Decimal => {
            for b in bytes {
                write!(out, " {b}")?;
            }
        }
        DisplayFormat::Hex => write_hex(bytes, out)?,
        DisplayFormat::HexAscii => {
            write_hex(bytes, out)?;
            out.write_char(' ')?;
            for &b in bytes {
                out.write_char(printable(b))?;
            }
        }
    }
    out.write_str(LINE_END)
}

fn write_hex<W: Write>(bytes: &[u8], out: &mut W) -> fmt::Result {
    for b in bytes {
        write!(out, "{b:02X}")?;
    }
    Ok(())
}

const fn printable(b: u8) -> char {
    if b >= 0x20 && b <= 0x7E {
        b as char
    } else {
        '.'
    }
}
