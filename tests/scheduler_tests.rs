//! Main Loop Tests
//!
//! End-to-end behavior of boot, console input, queued radio events and
//! pending sends through the scheduler.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test scheduler_tests

mod common;

use common::{Call, MockRadio};
use lora_link::config::{CONSOLE_BUFFER_SIZE, IDENT, LORA_FREQUENCY_HZ, TX_TIMEOUT_MS};
use lora_link::console::ConsoleBuffer;
use lora_link::radio::state::{post, EventQueue, RadioEvent};
use lora_link::radio::transceiver::InitError;
use lora_link::scheduler::{LoopStep, Scheduler};
use lora_link::settings::RamStore;
use lora_link::types::{DisplayFormat, RadioMode, Role};

type Store = RamStore<16>;

fn type_line<'q>(
    sched: &mut Scheduler<'q, MockRadio, Store>,
    input: &[u8],
    out: &mut String,
) {
    for &b in input {
        assert_eq!(sched.step(Some(b), 0, out), LoopStep::Input);
    }
}

// ============================================================================
// Boot Tests
// ============================================================================

#[test]
fn boot_prints_banner_and_listens() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();

    let sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");

    assert_eq!(out, format!("{IDENT} gateway node 1\r\n"));
    assert_eq!(sched.link().mode(), RadioMode::Receiving);
    assert_eq!(
        sched.link().radio().calls,
        vec![
            Call::Begin(LORA_FREQUENCY_HZ),
            Call::SetInvertIq(false),
            Call::ReceiveContinuous,
        ]
    );
    // Erased store repaired during boot
    assert_eq!(sched.settings().store().as_bytes()[0], 1);
}

#[test]
fn boot_as_node_uses_stored_id() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();

    let sched = Scheduler::boot(MockRadio::new(), Store::with_byte(0, 5), Role::Node, rx, &mut out)
        .expect("boot");

    assert_eq!(out, format!("{IDENT} node node 5\r\n"));
    assert_eq!(sched.link().radio().invert_iq(), Some(true));
}

#[test]
fn boot_failure_reported() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();

    let result = Scheduler::boot(
        MockRadio::failing(InitError::VersionMismatch { found: 0x22 }),
        Store::new(),
        Role::Gateway,
        rx,
        &mut out,
    );

    assert!(matches!(result, Err(InitError::VersionMismatch { found: 0x22 })));
    assert!(out.starts_with("Starting radio failed!"));
    assert!(out.contains("0x22"));
}

// ============================================================================
// Console Scenarios
// ============================================================================

#[test]
fn send_scenario_transmits_stack() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    type_line(&mut sched, b"5,10,3s", &mut out);
    assert_eq!(out, "[5 10] 3\r\n");
    let request = sched.pending().peek().expect("armed");
    assert_eq!(request.destination(), 3);
    assert_eq!(request.length(), 2);

    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Sent);
    assert!(!sched.pending().is_armed());
    assert!(sched.link().is_transmitting());
    assert_eq!(sched.link().radio().transmitted(), vec![vec![3, 5, 10]]);
    assert_eq!(sched.link().radio().invert_iq(), Some(true));
}

#[test]
fn node_id_scenario_persists_and_shows_in_help() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::with_byte(0, 2), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    type_line(&mut sched, b"9n", &mut out);
    assert_eq!(sched.settings().node_id().as_u8(), 9);
    assert_eq!(sched.settings().store().as_bytes()[0], 9);

    out.clear();
    type_line(&mut sched, b"h", &mut out);
    assert!(out.ends_with("node id: 9\r\n"));
}

#[test]
fn hex_scenario_formats_receive() {
    let mut queue = EventQueue::new();
    let (mut tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::with_rx(&[0xAB]), Store::new(), Role::Node, rx, &mut out)
        .expect("boot");

    type_line(&mut sched, b"1x", &mut out);
    assert_eq!(sched.settings().display_format(), DisplayFormat::Hex);

    out.clear();
    post(&mut tx, RadioEvent::PacketReceived { size: 1 });
    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Idle);
    assert_eq!(out, "AB\r\n");
}

#[test]
fn decimal_receive_has_leading_space() {
    let mut queue = EventQueue::new();
    let (mut tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::with_rx(&[0xAB]), Store::new(), Role::Node, rx, &mut out)
        .expect("boot");
    out.clear();

    post(&mut tx, RadioEvent::PacketReceived { size: 1 });
    sched.step(None, 0, &mut out);
    assert_eq!(out, " 171\r\n");
}

#[test]
fn oversized_receive_scenario() {
    let mut queue = EventQueue::new();
    let (mut tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::with_rx(&[1; 11]), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    post(&mut tx, RadioEvent::PacketReceived { size: 11 });
    sched.step(None, 0, &mut out);
    assert_eq!(out, "RX error: size 11\r\n");
    assert_eq!(sched.link().radio().reads(), 0);
}

#[test]
fn repeated_help_fits_console_buffer() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = ConsoleBuffer::<CONSOLE_BUFFER_SIZE>::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    // Output is flushed after every pass, like the target loop does
    let mut console = String::new();
    for &b in b"hhh" {
        assert_eq!(sched.step(Some(b), 0, &mut out), LoopStep::Input);
        assert_eq!(out.dropped(), 0);
        console.push_str(out.as_str());
        out.clear();
    }
    assert_eq!(console.matches("node id: 1\r\n").count(), 3);
}

#[test]
fn boot_banner_names_link_role() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Node, rx, &mut out)
        .expect("boot");
    assert_eq!(sched.link().role(), Role::Node);
    assert!(out.contains(" node node 1"));
}

#[test]
fn version_command_prints_ident() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    type_line(&mut sched, b"v", &mut out);
    assert_eq!(out, format!("[] 0\r\n{IDENT}\r\n"));
}

// ============================================================================
// Ordering Tests
// ============================================================================

#[test]
fn input_starves_pending_send() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");

    type_line(&mut sched, b"1,2s", &mut out);
    // Keystrokes keep arriving; the send waits
    type_line(&mut sched, b"123", &mut out);
    assert!(sched.pending().is_armed());
    assert!(sched.link().radio().transmitted().is_empty());

    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Sent);
}

#[test]
fn send_during_transmit_deferred() {
    let mut queue = EventQueue::new();
    let (mut tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");

    type_line(&mut sched, b"1,2s", &mut out);
    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Sent);

    type_line(&mut sched, b"9,4s", &mut out);
    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Idle);
    assert!(sched.pending().is_armed());

    out.clear();
    post(&mut tx, RadioEvent::TransmitDone);
    assert_eq!(sched.step(None, 0, &mut out), LoopStep::Sent);
    assert_eq!(out, "TX done\r\n");
    assert_eq!(
        sched.link().radio().transmitted(),
        vec![vec![2, 1], vec![4, 9]]
    );
}

#[test]
fn events_drained_before_input() {
    let mut queue = EventQueue::new();
    let (mut tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::with_rx(&[7]), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    post(&mut tx, RadioEvent::PacketReceived { size: 1 });
    post(&mut tx, RadioEvent::PacketReceived { size: 1 });
    sched.step(Some(b'q'), 0, &mut out);
    assert_eq!(out, " 7\r\n 7\r\n[] 0\r\n");
}

#[test]
fn watchdog_recovers_stuck_transmit() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Node, rx, &mut out)
        .expect("boot");

    type_line(&mut sched, b"3s", &mut out);
    sched.step(None, 0, &mut out);
    assert!(sched.link().is_transmitting());

    out.clear();
    sched.step(None, TX_TIMEOUT_MS, &mut out);
    assert_eq!(out, "TX timeout\r\n");
    assert_eq!(sched.link().mode(), RadioMode::Receiving);
}

#[test]
fn idle_when_nothing_to_do() {
    let mut queue = EventQueue::new();
    let (_tx, rx) = queue.split();
    let mut out = String::new();
    let mut sched = Scheduler::boot(MockRadio::new(), Store::new(), Role::Gateway, rx, &mut out)
        .expect("boot");
    out.clear();

    assert_eq!(sched.step(None, 10, &mut out), LoopStep::Idle);
    assert!(out.is_empty());
    assert_eq!(sched.interpreter().value(), 0);
}
