//! Shared test doubles
//!
//! A scripted transceiver that records every call the link makes.

#![allow(dead_code)]

use std::collections::VecDeque;

use lora_link::radio::state::RadioEvent;
use lora_link::radio::transceiver::{InitError, Transceiver};

/// One recorded transceiver call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Begin(u32),
    Idle,
    ReceiveContinuous,
    SetInvertIq(bool),
    Transmit(Vec<u8>),
    ReadPacket(usize),
}

/// Transceiver double
#[derive(Debug)]
pub struct MockRadio {
    pub calls: Vec<Call>,
    pub begin_result: Result<(), InitError>,
    pub rx_frame: Vec<u8>,
    pub irqs: VecDeque<RadioEvent>,
    pub rssi: i16,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            begin_result: Ok(()),
            rx_frame: Vec::new(),
            irqs: VecDeque::new(),
            rssi: -42,
        }
    }

    pub fn failing(err: InitError) -> Self {
        Self {
            begin_result: Err(err),
            ..Self::new()
        }
    }

    pub fn with_rx(frame: &[u8]) -> Self {
        Self {
            rx_frame: frame.to_vec(),
            ..Self::new()
        }
    }

    /// Most recent I/Q polarity written
    pub fn invert_iq(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetInvertIq(v) => Some(*v),
            _ => None,
        })
    }

    /// Every frame handed to `transmit`
    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Transmit(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `read_packet` calls
    pub fn reads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::ReadPacket(_)))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Transceiver for MockRadio {
    fn begin(&mut self, frequency_hz: u32) -> Result<(), InitError> {
        self.calls.push(Call::Begin(frequency_hz));
        self.begin_result
    }

    fn idle(&mut self) {
        self.calls.push(Call::Idle);
    }

    fn receive_continuous(&mut self) {
        self.calls.push(Call::ReceiveContinuous);
    }

    fn set_invert_iq(&mut self, inverted: bool) {
        self.calls.push(Call::SetInvertIq(inverted));
    }

    fn transmit(&mut self, frame: &[u8]) {
        self.calls.push(Call::Transmit(frame.to_vec()));
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> usize {
        self.calls.push(Call::ReadPacket(buf.len()));
        let n = buf.len().min(self.rx_frame.len());
        buf[..n].copy_from_slice(&self.rx_frame[..n]);
        n
    }

    fn take_irq(&mut self) -> Option<RadioEvent> {
        self.irqs.pop_front()
    }

    fn packet_rssi(&mut self) -> i16 {
        self.rssi
    }
}
