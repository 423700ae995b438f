//! Radio Link Controller
//!
//! Owns the transceiver and the RX/TX mode. Each role receives with the
//! opposite I/Q polarity to the one it transmits with, and the two roles use
//! mirrored polarities, so a Gateway only ever decodes Nodes and a Node only
//! ever decodes Gateways.
//!
//! ```text
//!             send()                  TX done / watchdog
//! Receiving ---------> Transmitting ---------------------> Receiving
//! ```

use core::fmt::Write;

use super::state::RadioEvent;
use super::transceiver::Transceiver;
use super::transmit::TxWatchdog;
use crate::config::{MAX_PAYLOAD_LEN, TX_TIMEOUT_MS};
use crate::console::LINE_END;
use crate::packet::{self, Payload};
use crate::types::{DisplayFormat, RadioMode, Role};

/// Link traffic counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames handed to the transceiver
    pub sent: u32,
    /// Frames received and printed
    pub received: u32,
    /// Received frames rejected as oversized
    pub oversized: u32,
    /// Transmissions ended by the watchdog
    pub timeouts: u32,
}

/// Half-duplex link controller
pub struct RadioLink<T: Transceiver> {
    radio: T,
    role: Role,
    mode: RadioMode,
    watchdog: TxWatchdog,
    rx_buffer: [u8; MAX_PAYLOAD_LEN],
    stats: LinkStats,
}

impl<T: Transceiver> RadioLink<T> {
    /// Wrap an initialised transceiver; call [`RadioLink::start`] before use
    #[must_use]
    pub fn new(radio: T, role: Role) -> Self {
        Self::with_timeout(radio, role, TX_TIMEOUT_MS)
    }

    /// Same as [`RadioLink::new`] with a custom TX watchdog limit
    /// (0 disables the watchdog)
    #[must_use]
    pub fn with_timeout(radio: T, role: Role, tx_timeout_ms: u32) -> Self {
        Self {
            radio,
            role,
            mode: RadioMode::Receiving,
            watchdog: TxWatchdog::new(tx_timeout_ms),
            rx_buffer: [0; MAX_PAYLOAD_LEN],
            stats: LinkStats::default(),
        }
    }

    /// Put the transceiver into receive for the first time
    pub fn start(&mut self) {
        info!("link starting as {}", self.role.as_str());
        self.enter_receive_mode();
    }

    /// Receive polarity, continuous receive
    pub fn enter_receive_mode(&mut self) {
        self.radio.set_invert_iq(self.role.rx_inverted());
        self.radio.receive_continuous();
        self.mode = RadioMode::Receiving;
        self.watchdog.disarm();
    }

    /// Standby, transmit polarity
    pub fn enter_transmit_mode(&mut self) {
        self.radio.idle();
        self.radio.set_invert_iq(self.role.tx_inverted());
        self.mode = RadioMode::Transmitting;
    }

    /// Transmit one payload
    ///
    /// The link stays in [`RadioMode::Transmitting`] until the transceiver
    /// reports TX done or the watchdog expires.
    pub fn send(&mut self, payload: &Payload) {
        self.enter_transmit_mode();
        let frame = payload.encode();
        debug!(
            "tx {} bytes to node {}",
            frame.len(),
            payload.destination()
        );
        self.radio.transmit(&frame);
        self.watchdog.arm();
        self.stats.sent = self.stats.sent.wrapping_add(1);
    }

    /// Transmit-complete notification
    pub fn on_transmit_complete<W: Write>(&mut self, out: &mut W) {
        if self.mode != RadioMode::Transmitting {
            debug!("stale tx done ignored");
            return;
        }
        info!("tx done");
        let _ = write!(out, "TX done{LINE_END}");
        self.enter_receive_mode();
    }

    /// Receive-complete notification
    ///
    /// Frames larger than [`MAX_PAYLOAD_LEN`] are reported and left unread.
    pub fn on_receive_complete<W: Write>(&mut self, size: usize, format: DisplayFormat, out: &mut W) {
        if size > MAX_PAYLOAD_LEN {
            warn!("rx frame of {} bytes exceeds {}", size, MAX_PAYLOAD_LEN);
            self.stats.oversized = self.stats.oversized.wrapping_add(1);
            let _ = write!(out, "RX error: size {size}{LINE_END}");
            return;
        }

        let read = self.radio.read_packet(&mut self.rx_buffer[..size]).min(size);
        let rssi = self.radio.packet_rssi();
        debug!("rx {} bytes, rssi {}", read, rssi);
        self.stats.received = self.stats.received.wrapping_add(1);
        let _ = packet::render(&self.rx_buffer[..read], format, out);
    }

    /// Dispatch a queued radio event
    pub fn handle_event<W: Write>(&mut self, event: RadioEvent, format: DisplayFormat, out: &mut W) {
        match event {
            RadioEvent::TransmitDone => self.on_transmit_complete(out),
            RadioEvent::PacketReceived { size } => self.on_receive_complete(size, format, out),
        }
    }

    /// Advance the TX watchdog
    pub fn tick<W: Write>(&mut self, elapsed_ms: u32, out: &mut W) {
        if self.mode == RadioMode::Transmitting && self.watchdog.tick(elapsed_ms) {
            warn!("no tx done received, forcing receive");
            self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            let _ = write!(out, "TX timeout{LINE_END}");
            self.enter_receive_mode();
        }
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Check if a transmission is in flight
    #[must_use]
    pub const fn is_transmitting(&self) -> bool {
        matches!(self.mode, RadioMode::Transmitting)
    }

    /// Device role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Traffic counters
    #[must_use]
    pub const fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Borrow the transceiver
    #[must_use]
    pub const fn radio(&self) -> &T {
        &self.radio
    }

    /// Mutably borrow the transceiver (interrupt servicing)
    pub fn radio_mut(&mut self) -> &mut T {
        &mut self.radio
    }
}
