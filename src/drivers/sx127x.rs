//! `SX1276/77/78/79` LoRa Transceiver Driver
//!
//! Register-level driver over a blocking SPI device. Runs the modem in
//! explicit-header LoRa mode with DIO0 signalling RX done or TX done
//! depending on the last operation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::radio::state::RadioEvent;
use crate::radio::transceiver::{InitError, Transceiver};

/// `SX127x` register addresses
mod reg {
    pub const FIFO: u8 = 0x00;
    pub const OP_MODE: u8 = 0x01;
    pub const FRF_MSB: u8 = 0x06;
    pub const FRF_MID: u8 = 0x07;
    pub const FRF_LSB: u8 = 0x08;
    pub const PA_CONFIG: u8 = 0x09;
    pub const LNA: u8 = 0x0C;
    pub const FIFO_ADDR_PTR: u8 = 0x0D;
    pub const FIFO_TX_BASE_ADDR: u8 = 0x0E;
    pub const FIFO_RX_BASE_ADDR: u8 = 0x0F;
    pub const FIFO_RX_CURRENT_ADDR: u8 = 0x10;
    pub const IRQ_FLAGS: u8 = 0x12;
    pub const RX_NB_BYTES: u8 = 0x13;
    pub const PKT_RSSI_VALUE: u8 = 0x1A;
    pub const MODEM_CONFIG_1: u8 = 0x1D;
    pub const PAYLOAD_LENGTH: u8 = 0x22;
    pub const MODEM_CONFIG_3: u8 = 0x26;
    pub const INVERT_IQ: u8 = 0x33;
    pub const INVERT_IQ2: u8 = 0x3B;
    pub const DIO_MAPPING_1: u8 = 0x40;
    pub const VERSION: u8 = 0x42;
}

/// Operating modes (`RegOpMode` low bits)
mod mode {
    pub const LONG_RANGE: u8 = 0x80;
    pub const SLEEP: u8 = 0x00;
    pub const STDBY: u8 = 0x01;
    pub const TX: u8 = 0x03;
    pub const RX_CONTINUOUS: u8 = 0x05;
}

/// `RegIrqFlags` bits
mod irq {
    pub const TX_DONE: u8 = 0x08;
    pub const PAYLOAD_CRC_ERROR: u8 = 0x20;
    pub const RX_DONE: u8 = 0x40;
}

/// DIO0 mapping in `RegDioMapping1`
const DIO0_RX_DONE: u8 = 0x00;
const DIO0_TX_DONE: u8 = 0x40;

/// Expected `RegVersion` contents
const SILICON_VERSION: u8 = 0x12;

/// Crystal frequency
const FXOSC_HZ: u64 = 32_000_000;

/// Output power on `PA_BOOST` in dBm
const TX_POWER_DBM: u8 = 17;

/// `RegInvertIQ` / `RegInvertIQ2` values
const INVERT_IQ_ON: (u8, u8) = (0x66, 0x19);
const INVERT_IQ_OFF: (u8, u8) = (0x27, 0x1D);

/// LoRa transceiver on an SPI bus
pub struct Sx127x<SPI, RST, D> {
    spi: SPI,
    reset: RST,
    delay: D,
    frequency_hz: u32,
}

impl<SPI, RST, D> Sx127x<SPI, RST, D>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a driver; nothing is sent to the chip until `begin`
    #[must_use]
    pub fn new(spi: SPI, reset: RST, delay: D) -> Self {
        Self {
            spi,
            reset,
            delay,
            frequency_hz: 0,
        }
    }

    /// Configured channel frequency
    #[must_use]
    pub const fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8, SPI::Error> {
        let mut buf = [addr & 0x7F, 0];
        self.spi.transfer_in_place(&mut buf)?;
        Ok(buf[1])
    }

    fn write_reg(&mut self, addr: u8, value: u8) -> Result<(), SPI::Error> {
        self.spi.write(&[addr | 0x80, value])
    }

    fn reg(&mut self, addr: u8) -> u8 {
        self.read_reg(addr).unwrap_or_else(|_| {
            warn!("sx127x read of register {} failed", addr);
            0
        })
    }

    fn set_reg(&mut self, addr: u8, value: u8) {
        if self.write_reg(addr, value).is_err() {
            warn!("sx127x write to register {} failed", addr);
        }
    }

    fn hard_reset(&mut self) {
        let _ = self.reset.set_low();
        self.delay.delay_ms(10);
        let _ = self.reset.set_high();
        self.delay.delay_ms(10);
    }

    fn configure(&mut self, frequency_hz: u32) -> Result<(), SPI::Error> {
        self.write_reg(reg::OP_MODE, mode::LONG_RANGE | mode::SLEEP)?;

        let frf = (u64::from(frequency_hz) << 19) / FXOSC_HZ;
        self.write_reg(reg::FRF_MSB, (frf >> 16) as u8)?;
        self.write_reg(reg::FRF_MID, (frf >> 8) as u8)?;
        self.write_reg(reg::FRF_LSB, frf as u8)?;

        self.write_reg(reg::FIFO_TX_BASE_ADDR, 0)?;
        self.write_reg(reg::FIFO_RX_BASE_ADDR, 0)?;

        // LNA boost, automatic gain control
        let lna = self.read_reg(reg::LNA)?;
        self.write_reg(reg::LNA, lna | 0x03)?;
        self.write_reg(reg::MODEM_CONFIG_3, 0x04)?;

        // PA_BOOST pin, output power = 2 + OutputPower dBm
        self.write_reg(reg::PA_CONFIG, 0x80 | (TX_POWER_DBM - 2))?;

        self.write_reg(reg::OP_MODE, mode::LONG_RANGE | mode::STDBY)
    }
}

impl<SPI, RST, D> Transceiver for Sx127x<SPI, RST, D>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
{
    fn begin(&mut self, frequency_hz: u32) -> Result<(), InitError> {
        self.hard_reset();

        let version = self.read_reg(reg::VERSION).map_err(|_| InitError::Bus)?;
        if version != SILICON_VERSION {
            return Err(InitError::VersionMismatch { found: version });
        }

        self.configure(frequency_hz).map_err(|_| InitError::Bus)?;
        self.frequency_hz = frequency_hz;
        info!("sx127x ready at {} Hz", frequency_hz);
        Ok(())
    }

    fn idle(&mut self) {
        self.set_reg(reg::OP_MODE, mode::LONG_RANGE | mode::STDBY);
    }

    fn receive_continuous(&mut self) {
        self.set_reg(reg::DIO_MAPPING_1, DIO0_RX_DONE);
        self.set_reg(reg::OP_MODE, mode::LONG_RANGE | mode::RX_CONTINUOUS);
    }

    fn set_invert_iq(&mut self, inverted: bool) {
        let (iq, iq2) = if inverted { INVERT_IQ_ON } else { INVERT_IQ_OFF };
        self.set_reg(reg::INVERT_IQ, iq);
        self.set_reg(reg::INVERT_IQ2, iq2);
    }

    fn transmit(&mut self, frame: &[u8]) {
        self.idle();

        // Explicit header mode
        let config = self.reg(reg::MODEM_CONFIG_1);
        self.set_reg(reg::MODEM_CONFIG_1, config & 0xFE);

        self.set_reg(reg::FIFO_ADDR_PTR, 0);
        let header = [reg::FIFO | 0x80];
        if self
            .spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(frame)])
            .is_err()
        {
            warn!("sx127x fifo write failed");
            return;
        }
        self.set_reg(reg::PAYLOAD_LENGTH, frame.len() as u8);

        self.set_reg(reg::DIO_MAPPING_1, DIO0_TX_DONE);
        self.set_reg(reg::OP_MODE, mode::LONG_RANGE | mode::TX);
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> usize {
        let header = [reg::FIFO & 0x7F];
        match self
            .spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(buf)])
        {
            Ok(()) => buf.len(),
            Err(_) => {
                warn!("sx127x fifo read failed");
                0
            }
        }
    }

    fn take_irq(&mut self) -> Option<RadioEvent> {
        let flags = self.reg(reg::IRQ_FLAGS);
        self.set_reg(reg::IRQ_FLAGS, flags);

        if flags & irq::TX_DONE != 0 {
            return Some(RadioEvent::TransmitDone);
        }

        if flags & irq::RX_DONE != 0 {
            if flags & irq::PAYLOAD_CRC_ERROR != 0 {
                debug!("rx crc error dropped");
                return None;
            }
            let size = self.reg(reg::RX_NB_BYTES);
            let start = self.reg(reg::FIFO_RX_CURRENT_ADDR);
            self.set_reg(reg::FIFO_ADDR_PTR, start);
            return Some(RadioEvent::PacketReceived {
                size: usize::from(size),
            });
        }

        None
    }

    fn packet_rssi(&mut self) -> i16 {
        let offset = if self.frequency_hz < 868_000_000 { 164 } else { 157 };
        i16::from(self.reg(reg::PKT_RSSI_VALUE)) - offset
    }
}
