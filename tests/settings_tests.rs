//! Settings Tests
//!
//! Tests for node id persistence and boot-time repair.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test settings_tests

use lora_link::config::{DEFAULT_NODE_ID, NODE_ID_ADDR};
use lora_link::settings::{ByteStore, ConfigStore, Configuration, RamStore};
use lora_link::types::{DisplayFormat, NodeId};

// ============================================================================
// RAM Store Tests
// ============================================================================

#[test]
fn ram_store_starts_erased() {
    let mut store = RamStore::<8>::new();
    assert!(store.as_bytes().iter().all(|&b| b == 0xFF));
    assert_eq!(store.read_byte(3), 0xFF);
    assert_eq!(store.writes(), 0);
}

#[test]
fn ram_store_write_read() {
    let mut store = RamStore::<8>::default();
    store.write_byte(2, 0x42);
    assert_eq!(store.read_byte(2), 0x42);
    assert_eq!(store.writes(), 1);
}

#[test]
fn ram_store_out_of_range() {
    let mut store = RamStore::<4>::new();
    store.write_byte(10, 1);
    assert_eq!(store.read_byte(10), 0xFF);
    assert_eq!(store.writes(), 0);
}

// ============================================================================
// Load Tests
// ============================================================================

#[test]
fn load_valid_node_id() {
    let settings = ConfigStore::load(RamStore::<16>::with_byte(NODE_ID_ADDR, 5));
    assert_eq!(settings.node_id().as_u8(), 5);
    assert_eq!(settings.store().writes(), 0);
}

#[test]
fn load_erased_store_repairs() {
    let settings = ConfigStore::load(RamStore::<16>::new());
    assert_eq!(settings.node_id().as_u8(), DEFAULT_NODE_ID);
    assert_eq!(settings.store().as_bytes()[0], DEFAULT_NODE_ID);
    assert_eq!(settings.store().writes(), 1);
}

#[test]
fn load_zero_repairs() {
    let settings = ConfigStore::load(RamStore::<16>::with_byte(NODE_ID_ADDR, 0));
    assert_eq!(settings.node_id(), NodeId::DEFAULT);
    assert_eq!(settings.store().as_bytes()[0], DEFAULT_NODE_ID);
}

#[test]
fn load_above_seven_repairs() {
    // Valid from the console, rejected at boot
    let settings = ConfigStore::load(RamStore::<16>::with_byte(NODE_ID_ADDR, 8));
    assert_eq!(settings.node_id(), NodeId::DEFAULT);
}

#[test]
fn load_bounds_accepted() {
    for id in [1u8, 7] {
        let settings = ConfigStore::load(RamStore::<16>::with_byte(NODE_ID_ADDR, id));
        assert_eq!(settings.node_id().as_u8(), id);
    }
}

#[test]
fn load_display_format_decimal() {
    let settings = ConfigStore::load(RamStore::<16>::new());
    assert_eq!(settings.display_format(), DisplayFormat::Decimal);
    assert_eq!(
        *settings.config(),
        Configuration {
            node_id: NodeId::DEFAULT,
            display_format: DisplayFormat::Decimal,
        }
    );
}

// ============================================================================
// Update Tests
// ============================================================================

#[test]
fn set_node_id_persists() {
    let mut settings = ConfigStore::load(RamStore::<16>::new());
    let id = settings.set_node_id(4);
    assert_eq!(id.as_u8(), 4);
    assert_eq!(settings.store().as_bytes()[0], 4);
}

#[test]
fn set_node_id_masks_to_six_bits() {
    let mut settings = ConfigStore::load(RamStore::<16>::new());
    assert_eq!(settings.set_node_id(0x7F).as_u8(), 0x3F);
    assert_eq!(settings.set_node_id(64).as_u8(), 0);
}

#[test]
fn node_id_survives_reload() {
    let mut settings = ConfigStore::load(RamStore::<16>::new());
    settings.set_node_id(4);
    let store = settings.into_store();

    let reloaded = ConfigStore::load(store);
    assert_eq!(reloaded.node_id().as_u8(), 4);
}

#[test]
fn out_of_boot_range_id_reset_after_reload() {
    let mut settings = ConfigStore::load(RamStore::<16>::new());
    settings.set_node_id(20);
    let reloaded = ConfigStore::load(settings.into_store());
    assert_eq!(reloaded.node_id(), NodeId::DEFAULT);
}

#[test]
fn display_format_not_persisted() {
    let mut settings = ConfigStore::load(RamStore::<16>::new());
    let writes = settings.store().writes();
    assert_eq!(settings.set_display_format(2), DisplayFormat::HexAscii);
    assert_eq!(settings.store().writes(), writes);

    let reloaded = ConfigStore::load(settings.into_store());
    assert_eq!(reloaded.display_format(), DisplayFormat::Decimal);
}

#[test]
fn store_by_reference() {
    let mut store = RamStore::<16>::with_byte(NODE_ID_ADDR, 3);
    {
        let mut settings = ConfigStore::load(&mut store);
        settings.set_node_id(6);
    }
    assert_eq!(store.read_byte(NODE_ID_ADDR), 6);
}
