//! Console Command Protocol
//!
//! Single-character streaming interpreter for the operator console.
//! Digits build a 16-bit value, `,` pushes that value as a byte onto a small
//! argument stack, and any other printable character tries to dispatch a
//! command. Every non-digit, non-comma character leaves the accumulator and
//! stack empty, so malformed input can never carry state into the next
//! command.
//!
//! ```text
//! 5,10,3s   -> send [5, 10] to node 3
//! 4n        -> node id = 4
//! 1x        -> print received bytes as hex
//! ```

use core::fmt::Write;

use heapless::Vec;

use crate::config::{ARG_STACK_CAPACITY, IDENT, MAX_BODY_LEN};
use crate::console::LINE_END;
use crate::settings::{ByteStore, ConfigStore};

/// Streaming command interpreter
#[derive(Clone, Debug, Default)]
pub struct CommandInterpreter {
    /// Decimal accumulator, wraps on overflow
    value: u16,
    /// Arguments pushed with `,`
    stack: Vec<u8, ARG_STACK_CAPACITY>,
}

impl CommandInterpreter {
    /// Create an interpreter with an empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0,
            stack: Vec::new(),
        }
    }

    /// Feed one console byte
    ///
    /// Lowercase letters print a debug line with the stack and value before
    /// dispatch. Returns a command when the byte names one.
    pub fn feed<W: Write>(&mut self, byte: u8, out: &mut W) -> Option<Command> {
        match byte {
            b'0'..=b'9' => {
                self.value = self
                    .value
                    .wrapping_mul(10)
                    .wrapping_add(u16::from(byte - b'0'));
                None
            }
            b',' => {
                self.push();
                None
            }
            _ => {
                if byte.is_ascii_lowercase() {
                    self.echo(out);
                }
                let command = if byte > b' ' { self.dispatch(byte) } else { None };
                self.reset();
                command
            }
        }
    }

    /// Current accumulator value
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Bytes on the argument stack
    #[must_use]
    pub fn stack(&self) -> &[u8] {
        &self.stack
    }

    /// Clear accumulator and stack
    pub fn reset(&mut self) {
        self.value = 0;
        self.stack.clear();
    }

    fn push(&mut self) {
        // Full stack drops the argument; the value resets either way
        if self.stack.push(self.low_byte()).is_err() {
            trace!("argument stack full, {} dropped", self.value);
        }
        self.value = 0;
    }

    /// Accumulator truncated to a byte; `300,` pushes 44
    const fn low_byte(&self) -> u8 {
        self.value.to_le_bytes()[0]
    }

    fn echo<W: Write>(&self, out: &mut W) {
        let _ = out.write_char('[');
        for (i, b) in self.stack.iter().enumerate() {
            if i > 0 {
                let _ = out.write_char(' ');
            }
            let _ = write!(out, "{b}");
        }
        let _ = write!(out, "] {}{LINE_END}", self.value);
    }

    fn dispatch(&self, byte: u8) -> Option<Command> {
        match byte {
            b's' => Some(Command::Send(SendRequest::new(
                self.low_byte(),
                &self.stack,
            ))),
            b'n' => Some(Command::SetNodeId(self.value)),
            b'x' => Some(Command::SetDisplayFormat(self.value)),
            b'v' => Some(Command::Identify),
            b'h' => Some(Command::Help),
            _ => None,
        }
    }
}

/// Console command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Queue a transmission
    Send(SendRequest),
    /// Set node id (raw accumulator value, masked when applied)
    SetNodeId(u16),
    /// Set display format (raw accumulator value)
    SetDisplayFormat(u16),
    /// Print the identification string
    Identify,
    /// Print usage and the current node id
    Help,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Command {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Send(req) => defmt::write!(f, "Send({})", req),
            Self::SetNodeId(v) => defmt::write!(f, "SetNodeId({})", v),
            Self::SetDisplayFormat(v) => defmt::write!(f, "SetDisplayFormat({})", v),
            Self::Identify => defmt::write!(f, "Identify"),
            Self::Help => defmt::write!(f, "Help"),
        }
    }
}

/// Send request captured by the `s` command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRequest {
    destination: u8,
    length: u8,
    body: Vec<u8, MAX_BODY_LEN>,
}

impl SendRequest {
    /// Capture a destination and the pushed arguments
    ///
    /// `length` records how many arguments were pushed; only the first
    /// [`MAX_BODY_LEN`] of them fit in a payload body.
    #[must_use]
    pub fn new(destination: u8, args: &[u8]) -> Self {
        let take = args.len().min(MAX_BODY_LEN);
        let mut body = Vec::new();
        let _ = body.extend_from_slice(&args[..take]);
        Self {
            destination,
            length: u8::try_from(args.len()).unwrap_or(u8::MAX),
            body,
        }
    }

    /// Destination node id
    #[must_use]
    pub const fn destination(&self) -> u8 {
        self.destination
    }

    /// Number of arguments pushed before `s`
    #[must_use]
    pub const fn length(&self) -> u8 {
        self.length
    }

    /// Payload body bytes
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SendRequest {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "dst={} len={}", self.destination, self.length);
    }
}

/// At most one outstanding send request
///
/// A new request before the main loop consumes the previous one replaces it.
#[derive(Clone, Debug, Default)]
pub struct PendingSend {
    request: Option<SendRequest>,
}

impl PendingSend {
    /// Create an unarmed slot
    #[must_use]
    pub const fn new() -> Self {
        Self { request: None }
    }

    /// Arm with a request, replacing any unconsumed one
    pub fn arm(&mut self, request: SendRequest) {
        if self.request.is_some() {
            debug!("pending send replaced");
        }
        self.request = Some(request);
    }

    /// Take the request and disarm
    pub fn take(&mut self) -> Option<SendRequest> {
        self.request.take()
    }

    /// Check if a request is waiting
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.request.is_some()
    }

    /// Look at the waiting request
    #[must_use]
    pub const fn peek(&self) -> Option<&SendRequest> {
        self.request.as_ref()
    }
}

/// Apply a command to the device state
pub fn execute<S: ByteStore, W: Write>(
    command: Command,
    settings: &mut ConfigStore<S>,
    pending: &mut PendingSend,
    out: &mut W,
) {
    match command {
        Command::Send(request) => pending.arm(request),
        Command::SetNodeId(value) => {
            let id = settings.set_node_id(value);
            info!("node id now {}", id.as_u8());
        }
        Command::SetDisplayFormat(value) => {
            let _ = settings.set_display_format(value);
        }
        Command::Identify => {
            let _ = write!(out, "{IDENT}{LINE_END}");
        }
        Command::Help => print_help(settings.node_id().as_u8(), out),
    }
}

fn print_help<W: Write>(node_id: u8, out: &mut W) {
    const USAGE: [&str; 6] = [
        "commands (arguments come first, ',' pushes one byte):",
        "  b,b,...,Ds  send bytes b to node D",
        "  Nn          set node id to N",
        "  Fx          display format 0=dec 1=hex 2=hex+ascii",
        "  v           version",
        "  h           this help",
    ];
    for line in USAGE {
        let _ = write!(out, "{line}{LINE_END}");
    }
    let _ = write!(out, "node id: {node_id}{LINE_END}");
}
