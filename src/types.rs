//! Shared types used across the link firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use crate::config::{BOOT_NODE_ID_MAX, BOOT_NODE_ID_MIN, DEFAULT_NODE_ID, NODE_ID_MASK};

/// Device node identifier
///
/// Always within `0..=63`. Values accepted at boot are narrower (`1..=7`),
/// see [`NodeId::from_stored`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u8);

impl NodeId {
    /// Node id used when storage holds an invalid value
    pub const DEFAULT: Self = Self(DEFAULT_NODE_ID);

    /// Build a node id from an accumulator value, keeping the low 6 bits
    #[must_use]
    pub const fn from_masked(value: u16) -> Self {
        Self((value & NODE_ID_MASK as u16) as u8)
    }

    /// Validate a persisted byte, returns None outside `1..=7`
    #[must_use]
    pub const fn from_stored(raw: u8) -> Option<Self> {
        if raw >= BOOT_NODE_ID_MIN && raw <= BOOT_NODE_ID_MAX {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Get the raw id
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for NodeId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "node {}", self.0);
    }
}

/// How received bytes are printed on the console
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayFormat {
    /// Each byte as ` <decimal>`
    #[default]
    Decimal,
    /// Each byte as two uppercase hex digits
    Hex,
    /// Hex digits followed by a printable-ASCII column
    HexAscii,
}

impl DisplayFormat {
    /// Interpret a console value. Anything other than 1 or 2 prints as
    /// decimal.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            1 => Self::Hex,
            2 => Self::HexAscii,
            _ => Self::Decimal,
        }
    }

    /// Console value selecting this format
    #[must_use]
    pub const fn as_raw(self) -> u16 {
        match self {
            Self::Decimal => 0,
            Self::Hex => 1,
            Self::HexAscii => 2,
        }
    }

    /// Check if bytes render as hex digits
    #[must_use]
    pub const fn is_hex(self) -> bool {
        matches!(self, Self::Hex | Self::HexAscii)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DisplayFormat {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Decimal => defmt::write!(f, "DEC"),
            Self::Hex => defmt::write!(f, "HEX"),
            Self::HexAscii => defmt::write!(f, "HEX+ASCII"),
        }
    }
}

/// Device role on the shared channel
///
/// Each role transmits with the I/Q polarity the other role receives with,
/// so a device never decodes frames from a peer of its own role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Role {
    /// Transmits inverted, receives normal
    #[default]
    Gateway,
    /// Transmits normal, receives inverted
    Node,
}

impl Role {
    /// I/Q inversion while transmitting
    #[must_use]
    pub const fn tx_inverted(self) -> bool {
        matches!(self, Self::Gateway)
    }

    /// I/Q inversion while receiving
    #[must_use]
    pub const fn rx_inverted(self) -> bool {
        matches!(self, Self::Node)
    }

    /// Short display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Node => "node",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Role {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.as_str());
    }
}

/// Transceiver mode as tracked by the link controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RadioMode {
    /// Continuous receive
    #[default]
    Receiving,
    /// Transmission in flight, waiting for TX done
    Transmitting,
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Receiving => defmt::write!(f, "RX"),
            Self::Transmitting => defmt::write!(f, "TX"),
        }
    }
}
