//! Radio events
//!
//! Interrupt-side notifications never touch link state directly. They are
//! posted to a single-producer/single-consumer queue that the main loop
//! drains, so the link mode is only ever written from one context.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::config::EVENT_QUEUE_LEN;

/// Notification raised by the transceiver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioEvent {
    /// The last transmission left the antenna
    TransmitDone,
    /// A frame of `size` bytes is waiting in the receive buffer
    PacketReceived {
        /// Physical frame size reported by the transceiver
        size: usize,
    },
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::TransmitDone => defmt::write!(f, "TxDone"),
            Self::PacketReceived { size } => defmt::write!(f, "RxDone({})", size),
        }
    }
}

/// Event queue storage (holds `EVENT_QUEUE_LEN - 1` events)
pub type EventQueue = Queue<RadioEvent, EVENT_QUEUE_LEN>;

/// Interrupt-side handle
pub type EventSender<'q> = Producer<'q, RadioEvent, EVENT_QUEUE_LEN>;

/// Main-loop handle
pub type EventReceiver<'q> = Consumer<'q, RadioEvent, EVENT_QUEUE_LEN>;

/// Post an event, dropping it if the queue is full
///
/// Returns false when the event was dropped.
pub fn post(sender: &mut EventSender<'_>, event: RadioEvent) -> bool {
    if sender.enqueue(event).is_ok() {
        true
    } else {
        warn!("radio event queue full, event dropped");
        false
    }
}
