// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact values written by the fixtures

//! Dotted column paths resolved through class members.

mod common;

use colreader::{
    AddressMode, Binding, ColumnValue, Memory, ReadStatus, ReaderConfig, RowCursor,
    SetupStatus,
};
use common::{dataset, event_file, init_tracing, EventRow};

// ============================================================================
// Pointer chasing
// ============================================================================

#[test]
fn test_chain_follows_pointer_members() {
    init_tracing();
    let (file, layouts) = event_file("run1", &[EventRow::new(4, 17, 12.5, 2)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut e = Binding::new(&ds, "event.track.hit.e", "float");
    let address = e.address(&mut ds).expect("address");
    assert_eq!(e.setup_status(), SetupStatus::MatchExact);
    assert_eq!(e.chain().map(|c| c.offsets().to_vec()), Some(vec![16, 8, 4]));

    // *(*(event + 16) + 8) + 4
    let memory = ds.memory();
    let track = memory
        .read_pointer(layouts[0].event.offset(16).expect("offset"))
        .expect("track");
    let hit = memory
        .read_pointer(track.offset(8).expect("offset"))
        .expect("hit");
    assert_eq!(address, hit.offset(4).expect("offset"));
    assert_eq!(hit, layouts[0].hit);
}

#[test]
fn test_typed_value_through_chain() {
    init_tracing();
    let (file, _) = event_file(
        "run1",
        &[EventRow::new(1, 5, 1.25, 1), EventRow::new(2, 6, 2.5, 1)],
    );
    let mut ds = dataset(vec![file], ReaderConfig::default());
    let mut e = ColumnValue::<f32>::new(&ds, "event.track.hit.e");
    let mut id = ColumnValue::<i32>::new(&ds, "event.track.id");

    ds.next_entry();
    assert_eq!(e.get(&mut ds), Some(1.25));
    assert_eq!(id.get(&mut ds), Some(5));
    ds.next_entry();
    assert_eq!(e.get(&mut ds), Some(2.5));
    assert_eq!(id.get(&mut ds), Some(6));
}

#[test]
fn test_first_member_without_pointer_is_plain_offset() {
    let (file, layouts) = event_file("run1", &[EventRow::new(9, 0, 0.0, 0)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut n = Binding::new(&ds, "event.n", "i32");
    assert_eq!(n.address(&mut ds), Some(layouts[0].event));
    assert_eq!(n.chain().map(|c| c.offsets().to_vec()), Some(vec![0]));

    let mut weight = ColumnValue::<f64>::new(&ds, "event.weight");
    assert_eq!(weight.get(&mut ds), Some(4.5));
}

#[test]
fn test_repeated_address_is_stable() {
    let (file, _) = event_file("run1", &[EventRow::new(1, 2, 3.0, 4)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut e = Binding::new(&ds, "event.track.hit.e", "float");
    let first = e.address(&mut ds);
    assert!(first.is_some());
    for _ in 0..3 {
        assert_eq!(e.address(&mut ds), first);
    }
    assert_eq!(ds.loads().to_vec(), vec!["event".to_string()]);
}

#[test]
fn test_null_pointer_is_a_read_error() {
    init_tracing();
    let (mut file, layouts) = event_file("run1", &[EventRow::new(1, 2, 3.0, 4)]);
    file.arena_mut()
        .write_pointer(
            layouts[0].track.offset(8).expect("offset"),
            colreader::Address::NULL,
        )
        .expect("clear track.hit");
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut e = Binding::new(&ds, "event.track.hit.e", "float");
    assert_eq!(e.address(&mut ds), None);
    assert_eq!(e.setup_status(), SetupStatus::MatchExact);
    assert_eq!(e.read_status(), ReadStatus::Error);
    assert!(e.diagnostic().expect("diagnostic").contains("null"));

    // The pointer-free sibling still reads.
    let mut id = ColumnValue::<i32>::new(&ds, "event.track.id");
    assert_eq!(id.get(&mut ds), Some(2));
}

// ============================================================================
// Failed resolution
// ============================================================================

#[test]
fn test_unknown_member_names_full_path() {
    init_tracing();
    let (file, _) = event_file("run1", &[EventRow::new(1, 2, 3.0, 4)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut bad = Binding::new(&ds, "event.track.hit.energy", "float");
    assert_eq!(bad.address(&mut ds), None);
    assert_eq!(bad.setup_status(), SetupStatus::MissingColumn);
    assert!(bad
        .diagnostic()
        .expect("diagnostic")
        .contains("event.track.hit.energy"));
}

#[test]
fn test_class_member_read_as_number_mismatches() {
    let (file, _) = event_file("run1", &[EventRow::new(1, 2, 3.0, 4)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut hit = Binding::new(&ds, "event.track.hit", "float");
    assert_eq!(hit.address(&mut ds), None);
    assert_eq!(hit.setup_status(), SetupStatus::MismatchType);
    let message = hit.diagnostic().expect("diagnostic");
    assert!(message.contains("Hit") && message.contains("float"));
}

#[test]
fn test_opaque_binding_adopts_member_type() {
    let (file, layouts) = event_file("run1", &[EventRow::new(1, 2, 3.0, 4)]);
    let mut ds = dataset(vec![file], ReaderConfig::default());
    ds.next_entry();

    let mut hit = Binding::opaque(&ds, "event.track.hit");
    assert_eq!(hit.address(&mut ds), Some(layouts[0].hit));
    assert_eq!(hit.stored_type(), Some("Hit"));
    assert!(matches!(hit.mode(), Some(AddressMode::Chase(_))));
}
