//! USB CDC ACM (Serial) Console
//!
//! Moves console bytes between the USB endpoints and two byte pipes; the
//! main loop only ever touches the pipes.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::driver::{Driver, EndpointError};

use crate::config::{CONSOLE_BUFFER_SIZE, CONSOLE_RX_DEPTH, USB_CDC_PACKET_SIZE};

/// Host to device console bytes
pub type ConsoleInput = Pipe<CriticalSectionRawMutex, CONSOLE_RX_DEPTH>;

/// Device to host console bytes
pub type ConsoleOutput = Pipe<CriticalSectionRawMutex, CONSOLE_BUFFER_SIZE>;

/// Largest chunk sent per IN packet; one below the endpoint size so a
/// transfer never needs a zero-length terminator
const TX_CHUNK: usize = USB_CDC_PACKET_SIZE as usize - 1;

/// USB device descriptor strings
pub struct UsbStrings {
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
}

impl Default for UsbStrings {
    fn default() -> Self {
        Self {
            manufacturer: "LoRa Link Project",
            product: "LoRa Link Console",
            serial: "0001",
        }
    }
}

/// Build the USB device configuration
#[must_use]
pub fn usb_config() -> embassy_usb::Config<'static> {
    let strings = UsbStrings::default();
    let mut config = embassy_usb::Config::new(crate::config::USB_VID, crate::config::USB_PID);
    config.manufacturer = Some(strings.manufacturer);
    config.product = Some(strings.product);
    config.serial_number = Some(strings.serial);
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}

/// Forward received packets into the input pipe, forever
pub async fn forward_input<'d, D: Driver<'d>>(receiver: &mut Receiver<'d, D>, input: &ConsoleInput) {
    let mut buf = [0u8; USB_CDC_PACKET_SIZE as usize];
    loop {
        receiver.wait_connection().await;
        info!("console connected");
        loop {
            match receiver.read_packet(&mut buf).await {
                Ok(n) => input.write_all(&buf[..n]).await,
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => warn!("console rx overflow"),
            }
        }
        info!("console disconnected");
    }
}

/// Drain the output pipe into IN packets, forever
///
/// Output produced while no host is attached stays in the pipe; once it
/// fills, the main loop waits for a host to drain it.
pub async fn forward_output<'d, D: Driver<'d>>(sender: &mut Sender<'d, D>, output: &ConsoleOutput) {
    let mut buf = [0u8; TX_CHUNK];
    loop {
        sender.wait_connection().await;
        loop {
            let n = output.read(&mut buf).await;
            if sender.write_packet(&buf[..n]).await.is_err() {
                break;
            }
        }
    }
}
