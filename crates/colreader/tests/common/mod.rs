// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use colreader::{
    Address, ByteArena, DatasetFile, MemberLayout, MemoryDataset, NodeSpec, ReaderConfig,
    RowData, SchemaBuilder, TypeCatalog, TypeDescriptor, TypeRegistry,
};
use std::sync::Arc;

/// Route `tracing` output through the test harness. `RUST_LOG` selects
/// the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builtins plus the event classes used below.
///
/// ```text
/// Event  { n: UInt_t @0, track: *Track @16, weight: Double32_t @24 }
/// Track  { id: Int_t @0, hit: *Hit @8 }
/// Hit    { layer: Short_t @0, e: Float_t @4 }
/// ```
pub fn catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::with_builtins();
    catalog.register(TypeDescriptor::class(
        "Hit",
        vec![],
        vec![
            MemberLayout::new("layer", "Short_t", 0),
            MemberLayout::new("e", "Float_t", 4),
        ],
    ));
    catalog.register(TypeDescriptor::class(
        "Track",
        vec![],
        vec![
            MemberLayout::new("id", "Int_t", 0),
            MemberLayout::pointer("hit", "Hit", 8),
        ],
    ));
    catalog.register(TypeDescriptor::class(
        "Event",
        vec![],
        vec![
            MemberLayout::new("n", "UInt_t", 0),
            MemberLayout::pointer("track", "Track", 16),
            MemberLayout::new("weight", "Double32_t", 24),
        ],
    ));
    catalog
}

pub fn shared(catalog: TypeCatalog) -> Arc<dyn TypeRegistry + Send + Sync> {
    Arc::new(catalog)
}

/// Values stored for one event row.
#[derive(Debug, Clone, Copy)]
pub struct EventRow {
    pub n: u32,
    pub track_id: i32,
    pub hit_e: f32,
    pub nhits: i32,
}

impl EventRow {
    pub fn new(n: u32, track_id: i32, hit_e: f32, nhits: i32) -> Self {
        Self {
            n,
            track_id,
            hit_e,
            nhits,
        }
    }
}

/// Addresses of the objects written for one row.
#[derive(Debug, Clone, Copy)]
pub struct EventLayout {
    pub event: Address,
    pub track: Address,
    pub hit: Address,
    pub nhits: Address,
}

/// Write one event object graph into `arena`.
pub fn write_event(arena: &mut ByteArena, row: EventRow) -> EventLayout {
    let event = arena.alloc(32, 8);
    let track = arena.alloc(16, 8);
    let hit = arena.alloc(8, 4);
    let nhits = arena.alloc(4, 4);

    arena.write_u32(event, row.n).expect("event.n");
    arena
        .write_pointer(event.offset(16).expect("offset"), track)
        .expect("event.track");
    arena
        .write_f64(event.offset(24).expect("offset"), f64::from(row.n) * 0.5)
        .expect("event.weight");
    arena.write_i32(track, row.track_id).expect("track.id");
    arena
        .write_pointer(track.offset(8).expect("offset"), hit)
        .expect("track.hit");
    arena.write_bytes(hit, &3i16.to_le_bytes()).expect("hit.layer");
    arena
        .write_f32(hit.offset(4).expect("offset"), row.hit_e)
        .expect("hit.e");
    arena.write_i32(nhits, row.nhits).expect("nhits");

    EventLayout {
        event,
        track,
        hit,
        nhits,
    }
}

/// A dataset file with an `event` object node and an `nhits` scalar.
pub fn event_file(name: &str, rows: &[EventRow]) -> (DatasetFile, Vec<EventLayout>) {
    let catalog = catalog();
    let event = catalog.lookup("Event").expect("Event");
    let schema = SchemaBuilder::new()
        .node(NodeSpec::from_class("event", &event))
        .node(NodeSpec::scalar("nhits", "Int_t"))
        .build()
        .expect("schema");

    let mut arena = ByteArena::new();
    let layouts: Vec<EventLayout> = rows.iter().map(|row| write_event(&mut arena, *row)).collect();
    let file = layouts
        .iter()
        .fold(DatasetFile::new(name, schema, arena), |file, layout| {
            file.row(
                RowData::new()
                    .object("event", layout.event)
                    .object("nhits", layout.nhits),
            )
        });
    (file, layouts)
}

/// A dataset over `files`, in order.
pub fn dataset(files: Vec<DatasetFile>, config: ReaderConfig) -> MemoryDataset {
    let mut ds = MemoryDataset::new(shared(catalog()), config);
    for file in files {
        ds.push_file(file);
    }
    ds
}
