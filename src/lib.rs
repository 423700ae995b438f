//! LoRa Link Firmware Library
//!
//! This library provides the core functionality for a half-duplex LoRa
//! link controller running on an STM32G474 with an SX127x transceiver.
//! A device runs either as a Gateway or as a Node and is driven by an
//! operator over a USB serial console.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Scheduler  │  Command Protocol  │  Settings                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       LINK LAYER                             │
//! │  Radio Link (RX/TX + I/Q role separation)  │  Packet Codec   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  SX127x (SPI)  │  Flash store  │  USB CDC console            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Owned state**: no globals; every component is a value passed by
//!   reference
//! - **Message passing**: interrupt-side radio notifications are queued and
//!   drained by the main loop
//! - **Fixed buffers**: no allocation, every buffer has a compile-time bound
//! - **Functional core, imperative shell**: everything except the drivers
//!   builds and tests on the host

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// Flash-backed settings storage.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// SX127x LoRa transceiver over SPI.
#[cfg(feature = "embedded")]
pub mod drivers;

/// USB Subsystem
///
/// CDC ACM serial console.
#[cfg(feature = "embedded")]
pub mod usb;

/// Radio Link Control
///
/// Transceiver interface, radio events, RX/TX mode control.
pub mod radio;

/// Packet Codec
///
/// Payload wire layout and console rendering of received bytes.
pub mod packet;

/// Console Command Protocol
///
/// Character-at-a-time command interpreter.
pub mod protocol;

/// Persistent settings
pub mod settings;

/// Main loop scheduler
pub mod scheduler;

/// Console output buffer
pub mod console;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Link stack
    pub use crate::console::ConsoleBuffer;
    pub use crate::radio::state::{EventQueue, EventReceiver, EventSender, RadioEvent};
    pub use crate::radio::transceiver::Transceiver;
    pub use crate::scheduler::{LoopStep, Scheduler};

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
