// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Row cursor coordination.
//!
//! A [`RowCursor`] advances over the rows of a chain of datasets and tells
//! bindings where each node's data lives for the active row. It also owns
//! the [`BindingRegistry`] of live bindings and the [`Generation`] counter
//! that is bumped whenever the underlying dataset, and with it the schema,
//! changes.

mod memory_dataset;
mod registry;

pub use memory_dataset::{DatasetFile, MemoryDataset, RowData};
pub use registry::{BindingId, BindingRegistry, Registration};

use serde::Serialize;
use std::fmt;

use crate::error::ReadError;
use crate::memory::{Address, Memory};
use crate::schema::{NodeId, Schema, SourceId};
use crate::types::TypeRegistry;

/// Dataset generation. Bumped on every switch of the underlying dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Generation {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Where the cursor stands relative to the rows of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntryStatus {
    /// A row is loaded and every source has data for it.
    Valid,
    /// No row has been loaded yet.
    NotLoaded,
    /// Past the last row.
    BeyondEnd,
    /// The row is loaded, but an indexed secondary source has no
    /// matching row.
    IndexedJoinNoMatch,
}

/// Coordinator that bindings read through.
pub trait RowCursor {
    /// Schema of the current dataset, if one is open.
    fn schema(&self) -> Option<&Schema>;

    /// Type registry used to resolve declared type names.
    fn types(&self) -> &dyn TypeRegistry;

    /// Memory image the node addresses point into.
    fn memory(&self) -> &dyn Memory;

    /// Registry of live bindings.
    fn registry(&self) -> &BindingRegistry;

    /// Current dataset generation.
    fn generation(&self) -> Generation {
        self.registry().generation()
    }

    fn entry_status(&self) -> EntryStatus;

    /// Active row of `source`; `None` when the source has no row for the
    /// current entry.
    fn active_row(&self, source: SourceId) -> Option<u64>;

    /// True if a row director is available for `source`.
    fn has_director(&self, source: SourceId) -> bool;

    /// True once the cursor has wired `node` to its storage. Nodes are
    /// wired lazily when the first row of a dataset is loaded.
    fn is_wired(&self, node: NodeId) -> bool;

    /// Make sure `node` holds the data of the active row.
    fn load_node(&mut self, node: NodeId) -> Result<(), ReadError>;

    /// Base address of `node`'s object for the active row.
    fn object_address(&self, node: NodeId) -> Option<Address>;

    /// True if a missing `path` should be recorded silently.
    fn is_missing_suppressed(&self, path: &str) -> bool;
}
