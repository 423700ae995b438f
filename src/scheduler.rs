//! Main loop scheduler
//!
//! One cooperative iteration at a time: radio events first, then console
//! input, then a pending send, otherwise idle. Input always wins over a
//! pending send, so a continuous stream of keystrokes holds sends back.

use core::fmt::Write;

use crate::config::{IDENT, LORA_FREQUENCY_HZ};
use crate::console::LINE_END;
use crate::packet::Payload;
use crate::protocol::{self, CommandInterpreter, PendingSend};
use crate::radio::link::RadioLink;
use crate::radio::state::EventReceiver;
use crate::radio::transceiver::{InitError, Transceiver};
use crate::settings::{ByteStore, ConfigStore};
use crate::types::Role;

/// What one loop iteration did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStep {
    /// Consumed one console byte
    Input,
    /// Started a transmission
    Sent,
    /// Nothing to do; the caller should sleep
    Idle,
}

#[cfg(feature = "embedded")]
impl defmt::Format for LoopStep {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Input => defmt::write!(f, "Input"),
            Self::Sent => defmt::write!(f, "Sent"),
            Self::Idle => defmt::write!(f, "Idle"),
        }
    }
}

/// Device state driven by the main loop
pub struct Scheduler<'q, T: Transceiver, S: ByteStore> {
    interpreter: CommandInterpreter,
    settings: ConfigStore<S>,
    link: RadioLink<T>,
    pending: PendingSend,
    events: EventReceiver<'q>,
}

impl<'q, T: Transceiver, S: ByteStore> Scheduler<'q, T, S> {
    /// Bring the device up
    ///
    /// Radio bring-up failure is reported on the console and returned; the
    /// caller is expected to halt.
    pub fn boot<W: Write>(
        mut radio: T,
        store: S,
        role: Role,
        events: EventReceiver<'q>,
        out: &mut W,
    ) -> Result<Self, InitError> {
        if let Err(e) = radio.begin(LORA_FREQUENCY_HZ) {
            error!("radio init failed");
            let _ = write!(out, "Starting radio failed! ({e}){LINE_END}");
            return Err(e);
        }

        let settings = ConfigStore::load(store);
        let mut link = RadioLink::new(radio, role);
        link.start();
        let _ = write!(
            out,
            "{IDENT} {} node {}{LINE_END}",
            link.role().as_str(),
            settings.node_id()
        );

        Ok(Self::from_parts(settings, link, events))
    }

    /// Assemble from already initialised parts
    #[must_use]
    pub fn from_parts(settings: ConfigStore<S>, link: RadioLink<T>, events: EventReceiver<'q>) -> Self {
        Self {
            interpreter: CommandInterpreter::new(),
            settings,
            link,
            pending: PendingSend::new(),
            events,
        }
    }

    /// Run one loop iteration
    ///
    /// `elapsed_ms` is the time since the previous call and drives the TX
    /// watchdog.
    pub fn step<W: Write>(&mut self, input: Option<u8>, elapsed_ms: u32, out: &mut W) -> LoopStep {
        self.drain_events(out);
        self.link.tick(elapsed_ms, out);

        if let Some(byte) = input {
            if let Some(command) = self.interpreter.feed(byte, out) {
                protocol::execute(command, &mut self.settings, &mut self.pending, out);
            }
            return LoopStep::Input;
        }

        // A send requested mid-transmission waits for the link to return to RX
        if self.pending.is_armed() && !self.link.is_transmitting() {
            if let Some(request) = self.pending.take() {
                let payload = Payload::new(request.destination(), request.body());
                self.link.send(&payload);
                return LoopStep::Sent;
            }
        }

        LoopStep::Idle
    }

    /// Hand every queued radio event to the link
    pub fn drain_events<W: Write>(&mut self, out: &mut W) {
        let format = self.settings.display_format();
        while let Some(event) = self.events.dequeue() {
            self.link.handle_event(event, format, out);
        }
    }

    /// Link controller
    #[must_use]
    pub const fn link(&self) -> &RadioLink<T> {
        &self.link
    }

    /// Mutable link controller (interrupt servicing)
    pub fn link_mut(&mut self) -> &mut RadioLink<T> {
        &mut self.link
    }

    /// Settings
    #[must_use]
    pub const fn settings(&self) -> &ConfigStore<S> {
        &self.settings
    }

    /// Command interpreter
    #[must_use]
    pub const fn interpreter(&self) -> &CommandInterpreter {
        &self.interpreter
    }

    /// Pending send slot
    #[must_use]
    pub const fn pending(&self) -> &PendingSend {
        &self.pending
    }
}
