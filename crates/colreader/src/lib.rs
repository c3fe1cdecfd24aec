// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed column bindings over runtime-described columnar datasets.
//!
//! Binds a named, possibly nested column (`event.track.px`) to a per-row
//! accessor. How to reach the value is worked out once per dataset, not
//! once per row:
//!
//! - **Path resolution**: the [`navigator`] matches the path against the
//!   live [`Schema`], checks the stored type against the requested one and
//!   yields either an [`OffsetChain`], a leaf field or the node itself.
//! - **Shape dispatch**: the node's structure selects one of ten read
//!   routines ([`ShapeCategory`]), cached until the dataset changes.
//! - **Invalidation**: a [`RowCursor`] bumps its [`Generation`] when it
//!   switches to the next dataset; every live [`Binding`] re-resolves before
//!   its next read.
//!
//! # Architecture
//!
//! ```text
//!   ColumnValue<T>
//!        |
//!        v
//!     Binding ----> Navigator ----> Schema / TypeRegistry
//!        |
//!        v
//!  ReadDispatcher ----> RowCursor (MemoryDataset) ----> Memory (ByteArena)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use colreader::{
//!     ByteArena, ColumnValue, DatasetFile, MemoryDataset, NodeSpec, ReaderConfig, RowData,
//!     SchemaBuilder, TypeCatalog,
//! };
//!
//! let schema = SchemaBuilder::new()
//!     .node(NodeSpec::scalar("nhits", "Int_t"))
//!     .build()
//!     .expect("schema");
//! let mut arena = ByteArena::new();
//! let slot = arena.alloc(4, 4);
//! arena.write_i32(slot, 12).expect("write");
//!
//! let types = Arc::new(TypeCatalog::with_builtins());
//! let mut dataset = MemoryDataset::new(types, ReaderConfig::default());
//! let row = RowData::new().object("nhits", slot);
//! dataset.push_file(DatasetFile::new("run1", schema, arena).row(row));
//!
//! let mut nhits = ColumnValue::<i32>::new(&dataset, "nhits");
//! dataset.next_entry();
//! assert_eq!(nhits.get(&mut dataset), Some(12));
//! ```

pub mod binding;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod navigator;
pub mod offset_chain;
pub mod schema;
pub mod shape;
pub mod types;
pub mod value;

pub use binding::{Binding, BindingSnapshot};
pub use config::{ConfigError, ReaderConfig};
pub use cursor::{
    BindingId, BindingRegistry, DatasetFile, EntryStatus, Generation, MemoryDataset,
    Registration, RowCursor, RowData,
};
pub use dispatch::{ReadDispatcher, ReadTarget};
pub use error::{ReadError, ReadStatus, SetupError, SetupStatus};
pub use memory::{
    Address, ByteArena, Memory, MemoryError, DEFAULT_ARENA_BASE, MAX_ARENA_BASE, POINTER_SIZE,
};
pub use navigator::{AddressMode, FieldAccessor, Navigator, Resolution};
pub use offset_chain::OffsetChain;
pub use schema::{NodeId, NodeSpec, Schema, SchemaBuilder, SchemaError, SchemaNode, SourceId};
pub use shape::{classify, ShapeCategory, ShapeFacts};
pub use types::{
    check_compatibility, Compatibility, MemberLayout, NumericKind, TypeCatalog, TypeDescriptor,
    TypeKind, TypeRegistry,
};
pub use value::{ColumnType, ColumnValue};
