//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the LoRa link firmware.
//! Radio parameters, buffer bounds, storage layout and pin mappings are
//! centralized here.

use crate::types::Role;

/// LoRa channel frequency (US 915 MHz ISM band)
pub const LORA_FREQUENCY_HZ: u32 = 915_000_000;

/// Maximum on-air payload size in bytes (destination byte + body)
pub const MAX_PAYLOAD_LEN: usize = 10;

/// Maximum payload body size in bytes
pub const MAX_BODY_LEN: usize = MAX_PAYLOAD_LEN - 1;

/// Argument stack capacity of the command interpreter
pub const ARG_STACK_CAPACITY: usize = MAX_PAYLOAD_LEN + 4;

/// Storage offset of the persisted node id byte
pub const NODE_ID_ADDR: u16 = 0;

/// Node id written when the persisted value is out of range
pub const DEFAULT_NODE_ID: u8 = 1;

/// Lowest node id accepted at boot
pub const BOOT_NODE_ID_MIN: u8 = 1;

/// Highest node id accepted at boot
pub const BOOT_NODE_ID_MAX: u8 = 7;

/// Mask applied to node ids set from the console (6 bits)
pub const NODE_ID_MASK: u8 = 0x3F;

/// Main loop idle delay when there is nothing to do
pub const IDLE_DELAY_MS: u64 = 10;

/// Time allowed for a transmit-complete notification before the
/// watchdog forces the link back to receive
pub const TX_TIMEOUT_MS: u32 = 2_000;

/// Radio event queue depth (holds `EVENT_QUEUE_LEN - 1` events)
pub const EVENT_QUEUE_LEN: usize = 8;

/// Console output buffer size per main loop iteration
pub const CONSOLE_BUFFER_SIZE: usize = 512;

/// Console input channel depth in bytes
pub const CONSOLE_RX_DEPTH: usize = 64;

/// USB CDC ACM packet size
pub const USB_CDC_PACKET_SIZE: u16 = 64;

/// USB VID (use test VID for development)
pub const USB_VID: u16 = 0x1209;

/// USB PID (get from pid.codes for production)
pub const USB_PID: u16 = 0x0002;

/// SPI clock for the SX127x transceiver
pub const SPI_FREQUENCY_HZ: u32 = 8_000_000;

/// Flash offset of the settings page (last 2 KiB page of 512 KiB)
pub const SETTINGS_FLASH_OFFSET: u32 = 0x7_F800;

/// Flash page size on STM32G474
pub const FLASH_PAGE_SIZE: u32 = 2048;

/// Identification string printed by `v` and at boot
pub const IDENT: &str = concat!("lora-link v", env!("CARGO_PKG_VERSION"));

/// Role this build runs as
#[cfg(feature = "role-node")]
pub const DEFAULT_ROLE: Role = Role::Node;

/// Role this build runs as
#[cfg(not(feature = "role-node"))]
pub const DEFAULT_ROLE: Role = Role::Gateway;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// SPI1 SCK to SX127x
    pub const RADIO_SCK: &str = "PA5";

    /// SPI1 MISO from SX127x
    pub const RADIO_MISO: &str = "PA6";

    /// SPI1 MOSI to SX127x
    pub const RADIO_MOSI: &str = "PA7";

    /// SX127x chip select (active low)
    pub const RADIO_NSS: &str = "PA4";

    /// SX127x reset (active low)
    pub const RADIO_RESET: &str = "PB0";

    /// SX127x DIO0 (RX done / TX done interrupt)
    pub const RADIO_DIO0: &str = "PB1";

    /// USB D+ (handled by USB peripheral)
    pub const USB_DP: &str = "PA12";

    /// USB D- (handled by USB peripheral)
    pub const USB_DM: &str = "PA11";
}
