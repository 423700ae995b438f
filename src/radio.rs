//! Radio Link Control
//!
//! Transceiver abstraction, radio events and the half-duplex link
//! controller that keeps Gateway and Node traffic apart.

pub mod link;
pub mod state;
pub mod transceiver;
pub mod transmit;
