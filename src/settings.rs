//! Persistent device settings
//!
//! Holds the node id and display format. The node id lives in one byte of
//! non-volatile storage at [`NODE_ID_ADDR`]; the display format is runtime
//! only and starts as decimal on every boot.

use crate::config::NODE_ID_ADDR;
use crate::types::{DisplayFormat, NodeId};

/// Byte-addressed non-volatile storage
///
/// Writes are synchronous and treated as infallible; implementations log
/// and swallow their own failures.
pub trait ByteStore {
    /// Read one byte
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Write one byte
    fn write_byte(&mut self, addr: u16, value: u8);
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    fn read_byte(&mut self, addr: u16) -> u8 {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        (**self).write_byte(addr, value);
    }
}

/// RAM-backed store for host simulation
///
/// Starts erased (`0xFF`) like fresh EEPROM or flash.
#[derive(Clone, Debug)]
pub struct RamStore<const N: usize> {
    bytes: [u8; N],
    writes: u32,
}

impl<const N: usize> RamStore<N> {
    /// Create an erased store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
        }
    }

    /// Create a store with one byte preset
    #[must_use]
    pub fn with_byte(addr: u16, value: u8) -> Self {
        let mut store = Self::new();
        if let Some(slot) = store.bytes.get_mut(usize::from(addr)) {
            *slot = value;
        }
        store
    }

    /// Raw contents
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of writes performed
    #[must_use]
    pub const fn writes(&self) -> u32 {
        self.writes
    }
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for RamStore<N> {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.bytes.get(usize::from(addr)).copied().unwrap_or(0xFF)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        if let Some(slot) = self.bytes.get_mut(usize::from(addr)) {
            *slot = value;
            self.writes += 1;
        }
    }
}

/// Device configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Configuration {
    /// This device's node id
    pub node_id: NodeId,
    /// How received bytes are printed
    pub display_format: DisplayFormat,
}

/// Owner of the device configuration and its backing store
pub struct ConfigStore<S: ByteStore> {
    store: S,
    config: Configuration,
}

impl<S: ByteStore> ConfigStore<S> {
    /// Load settings, repairing an out-of-range node id
    ///
    /// A stored id outside `1..=7` (including erased storage) is replaced by
    /// the default and written back before returning.
    #[must_use]
    pub fn load(mut store: S) -> Self {
        let raw = store.read_byte(NODE_ID_ADDR);
        let node_id = if let Some(id) = NodeId::from_stored(raw) {
            id
        } else {
            warn!("stored node id {} out of range, resetting", raw);
            store.write_byte(NODE_ID_ADDR, NodeId::DEFAULT.as_u8());
            NodeId::DEFAULT
        };
        info!("node id {}", node_id.as_u8());

        Self {
            store,
            config: Configuration {
                node_id,
                display_format: DisplayFormat::default(),
            },
        }
    }

    /// Persist the node id
    pub fn save(&mut self) {
        self.store
            .write_byte(NODE_ID_ADDR, self.config.node_id.as_u8());
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    /// Current node id
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.config.node_id
    }

    /// Current display format
    #[must_use]
    pub const fn display_format(&self) -> DisplayFormat {
        self.config.display_format
    }

    /// Set the node id (low 6 bits of `value`) and persist it
    pub fn set_node_id(&mut self, value: u16) -> NodeId {
        self.config.node_id = NodeId::from_masked(value);
        self.save();
        debug!("node id set to {}", self.config.node_id.as_u8());
        self.config.node_id
    }

    /// Set the display format from a raw console value
    pub fn set_display_format(&mut self, value: u16) -> DisplayFormat {
        self.config.display_format = DisplayFormat::from_raw(value);
        self.config.display_format
    }

    /// Borrow the backing store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Release the backing store
    pub fn into_store(self) -> S {
        self.store
    }
}
