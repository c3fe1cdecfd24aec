// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory chain of datasets.
//!
//! Each [`DatasetFile`] carries its own schema, a [`ByteArena`] holding the
//! object images, and per-row object addresses keyed by node name. The
//! [`MemoryDataset`] walks the chain entry by entry and switches schema
//! generation whenever it crosses into the next file.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::ReaderConfig;
use crate::cursor::{BindingRegistry, EntryStatus, Generation, RowCursor};
use crate::error::ReadError;
use crate::memory::{Address, ByteArena, Memory};
use crate::schema::{NodeId, Schema, SourceId};
use crate::types::TypeRegistry;

// ---------------------------------------------------------------------------
// RowData / DatasetFile
// ---------------------------------------------------------------------------

/// Object addresses of one row, keyed by node name.
#[derive(Debug, Clone, Default)]
pub struct RowData {
    objects: HashMap<String, Address>,
}

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the object address of `node` for this row.
    pub fn object(mut self, node: impl Into<String>, at: Address) -> Self {
        self.objects.insert(node.into(), at);
        self
    }

    pub fn get(&self, node: &str) -> Option<Address> {
        self.objects.get(node).copied()
    }
}

/// One dataset of the chain.
///
/// Rows of secondary sources live in their own tables; a source without a
/// table shares the primary rows.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    name: String,
    schema: Arc<Schema>,
    arena: ByteArena,
    rows: Vec<RowData>,
    secondary: HashMap<SourceId, Vec<RowData>>,
}

impl DatasetFile {
    pub fn new(name: impl Into<String>, schema: Schema, arena: ByteArena) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            arena,
            rows: Vec::new(),
            secondary: HashMap::new(),
        }
    }

    /// Append a row.
    pub fn row(mut self, row: RowData) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a row to the table of secondary `source`.
    pub fn secondary_row(mut self, source: SourceId, row: RowData) -> Self {
        self.secondary.entry(source).or_default().push(row);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn arena(&self) -> &ByteArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut ByteArena {
        &mut self.arena
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Secondary sources
// ---------------------------------------------------------------------------

/// Row mapping of a joined secondary source.
#[derive(Debug, Clone)]
enum Join {
    /// Secondary row equals the primary entry number.
    Aligned,
    /// Secondary row looked up per primary entry; `None` is a miss.
    Indexed(Vec<Option<u64>>),
}

// ---------------------------------------------------------------------------
// MemoryDataset
// ---------------------------------------------------------------------------

/// [`RowCursor`] over a chain of in-memory [`DatasetFile`]s.
pub struct MemoryDataset {
    config: ReaderConfig,
    types: Arc<dyn TypeRegistry + Send + Sync>,
    registry: BindingRegistry,
    files: Vec<DatasetFile>,
    empty: ByteArena,

    file: usize,
    /// Global entry number of the active row.
    entry: Option<u64>,
    /// Row inside `files[file]`.
    row: Option<usize>,
    status: EntryStatus,

    joins: HashMap<SourceId, Join>,
    detached: HashSet<SourceId>,
    lazy_wiring: bool,
    wired: HashSet<NodeId>,
    loaded: HashMap<NodeId, Address>,
    corrupt: HashSet<String>,
    load_log: Vec<String>,
}

impl MemoryDataset {
    pub fn new(types: Arc<dyn TypeRegistry + Send + Sync>, config: ReaderConfig) -> Self {
        let empty = config.arena();
        Self {
            config,
            types,
            registry: BindingRegistry::new(),
            files: Vec::new(),
            empty,
            file: 0,
            entry: None,
            row: None,
            status: EntryStatus::NotLoaded,
            joins: HashMap::new(),
            detached: HashSet::new(),
            lazy_wiring: false,
            wired: HashSet::new(),
            loaded: HashMap::new(),
            corrupt: HashSet::new(),
            load_log: Vec::new(),
        }
    }

    /// Append a dataset to the chain.
    pub fn push_file(&mut self, file: DatasetFile) {
        tracing::debug!(
            "chained dataset {} ({} rows, {} nodes)",
            file.name,
            file.len(),
            file.schema.len()
        );
        self.files.push(file);
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Total number of entries across the chain.
    pub fn entries(&self) -> u64 {
        self.files.iter().map(|f| f.len() as u64).sum()
    }

    /// Global entry number of the active row.
    pub fn entry(&self) -> Option<u64> {
        self.entry
    }

    /// Name of the dataset the cursor is in.
    pub fn current_file(&self) -> Option<&str> {
        self.files.get(self.file).map(DatasetFile::name)
    }

    /// Join `source` row-by-row with the primary source.
    pub fn join_aligned(&mut self, source: SourceId) {
        self.joins.insert(source, Join::Aligned);
    }

    /// Join `source` through an index: `rows[entry]` is the row of the
    /// current dataset's `source` table matching primary `entry`, `None`
    /// when there is no match.
    pub fn join_indexed(&mut self, source: SourceId, rows: Vec<Option<u64>>) {
        self.joins.insert(source, Join::Indexed(rows));
    }

    /// Drop the row director of `source`. Its nodes are still loadable.
    pub fn detach(&mut self, source: SourceId) {
        self.detached.insert(source);
    }

    /// Wire nodes one by one as they are first loaded, instead of all at
    /// once when a dataset's first row is reached.
    pub fn set_lazy_wiring(&mut self, lazy: bool) {
        self.lazy_wiring = lazy;
    }

    /// Make every load of `node` fail.
    pub fn mark_corrupt(&mut self, node: impl Into<String>) {
        self.corrupt.insert(node.into());
    }

    /// Names of the nodes loaded for the active row, in load order.
    pub fn loads(&self) -> &[String] {
        &self.load_log
    }

    /// Advance to the next entry.
    pub fn next_entry(&mut self) -> EntryStatus {
        let next = self.entry.map_or(0, |e| e.saturating_add(1));
        self.seek(next)
    }

    /// Move to global entry `entry`, switching dataset if needed.
    pub fn seek(&mut self, entry: u64) -> EntryStatus {
        self.loaded.clear();
        self.load_log.clear();

        let Some((file, row)) = self.locate(entry) else {
            self.entry = Some(entry);
            self.row = None;
            self.status = EntryStatus::BeyondEnd;
            tracing::debug!("entry {} is beyond the last row ({})", entry, self.entries());
            return self.status;
        };

        if file != self.file {
            self.switch_to(file);
        }
        if !self.lazy_wiring && self.wired.is_empty() {
            if let Some(current) = self.files.get(self.file) {
                self.wired = current.schema.nodes().map(|node| node.id).collect();
            }
        }

        self.entry = Some(entry);
        self.row = Some(row);
        self.status = if self.join_miss(entry) {
            EntryStatus::IndexedJoinNoMatch
        } else {
            EntryStatus::Valid
        };
        self.status
    }

    fn locate(&self, entry: u64) -> Option<(usize, usize)> {
        let mut first = 0u64;
        for (index, file) in self.files.iter().enumerate() {
            let len = file.len() as u64;
            if entry < first + len {
                return Some((index, (entry - first) as usize));
            }
            first += len;
        }
        None
    }

    fn switch_to(&mut self, file: usize) {
        self.file = file;
        self.wired.clear();
        let generation = self.registry.generation().next();
        let notified = self.registry.notify_switch(generation);
        tracing::info!(
            "switched to dataset {} ({}), {} bindings to re-resolve",
            self.current_file().unwrap_or("?"),
            generation,
            notified
        );
    }

    fn join_miss(&self, entry: u64) -> bool {
        self.joins.values().any(|join| match join {
            Join::Indexed(rows) => rows.get(entry as usize).copied().flatten().is_none(),
            Join::Aligned => false,
        })
    }

    /// Row data of `source` for the active entry.
    fn source_data(&self, source: SourceId) -> Option<&RowData> {
        let file = self.files.get(self.file)?;
        let row = self.row?;
        if source.is_primary() {
            return file.rows.get(row);
        }
        let Some(table) = file.secondary.get(&source) else {
            return file.rows.get(row);
        };
        let index = match self.joins.get(&source) {
            Some(Join::Indexed(_)) => usize::try_from(self.active_row(source)?).ok()?,
            Some(Join::Aligned) | None => row,
        };
        table.get(index)
    }
}

impl RowCursor for MemoryDataset {
    fn schema(&self) -> Option<&Schema> {
        self.files.get(self.file).map(DatasetFile::schema)
    }

    fn types(&self) -> &dyn TypeRegistry {
        self.types.as_ref()
    }

    fn memory(&self) -> &dyn Memory {
        match self.files.get(self.file) {
            Some(file) => &file.arena,
            None => &self.empty,
        }
    }

    fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    fn generation(&self) -> Generation {
        self.registry.generation()
    }

    fn entry_status(&self) -> EntryStatus {
        self.status
    }

    fn active_row(&self, source: SourceId) -> Option<u64> {
        let entry = self.entry?;
        self.row?;
        if source.is_primary() {
            return Some(entry);
        }
        match self.joins.get(&source) {
            Some(Join::Indexed(rows)) => rows.get(entry as usize).copied().flatten(),
            Some(Join::Aligned) | None => Some(entry),
        }
    }

    fn has_director(&self, source: SourceId) -> bool {
        if self.detached.contains(&source) {
            return false;
        }
        source.is_primary() || self.joins.contains_key(&source)
    }

    fn is_wired(&self, node: NodeId) -> bool {
        self.wired.contains(&node)
    }

    fn load_node(&mut self, node: NodeId) -> Result<(), ReadError> {
        if self.loaded.contains_key(&node) {
            return Ok(());
        }
        let schema_node = self
            .schema()
            .and_then(|schema| schema.get(node))
            .ok_or(ReadError::StaleNode)?;
        let name = schema_node.name.clone();
        let source = schema_node.source;

        if self.corrupt.contains(&name) {
            return Err(ReadError::Load {
                node: name,
                reason: "node data is corrupt".into(),
            });
        }
        if self.active_row(source).is_none() {
            return Err(ReadError::NoData(name));
        }
        let address = self
            .source_data(source)
            .and_then(|row| row.get(&name))
            .ok_or_else(|| ReadError::NoData(name.clone()))?;

        self.wired.insert(node);
        self.loaded.insert(node, address);
        self.load_log.push(name);
        Ok(())
    }

    fn object_address(&self, node: NodeId) -> Option<Address> {
        self.loaded.get(&node).copied()
    }

    fn is_missing_suppressed(&self, path: &str) -> bool {
        self.config.is_suppressed(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeSpec, SchemaBuilder};
    use crate::types::TypeCatalog;

    fn file(name: &str, rows: usize) -> DatasetFile {
        let schema = SchemaBuilder::new()
            .node(NodeSpec::scalar("x", "int"))
            .build()
            .expect("schema");
        let mut arena = ByteArena::new();
        let mut addresses = Vec::new();
        for i in 0..rows {
            let at = arena.alloc(4, 4);
            arena.write_i32(at, i as i32).expect("write");
            addresses.push(at);
        }
        addresses
            .into_iter()
            .fold(DatasetFile::new(name, schema, arena), |file, at| {
                file.row(RowData::new().object("x", at))
            })
    }

    fn dataset() -> MemoryDataset {
        let mut ds = MemoryDataset::new(
            Arc::new(TypeCatalog::with_builtins()),
            ReaderConfig::default(),
        );
        ds.push_file(file("first", 2));
        ds.push_file(file("second", 1));
        ds
    }

    #[test]
    fn test_walks_chain_and_bumps_generation() {
        let mut ds = dataset();
        assert_eq!(ds.entry_status(), EntryStatus::NotLoaded);
        assert!(ds.schema().is_some());

        assert_eq!(ds.next_entry(), EntryStatus::Valid);
        assert_eq!(ds.generation(), Generation(0));
        assert_eq!(ds.next_entry(), EntryStatus::Valid);
        assert_eq!(ds.current_file(), Some("first"));

        assert_eq!(ds.next_entry(), EntryStatus::Valid);
        assert_eq!(ds.current_file(), Some("second"));
        assert_eq!(ds.generation(), Generation(1));

        assert_eq!(ds.next_entry(), EntryStatus::BeyondEnd);
        assert_eq!(ds.active_row(SourceId::PRIMARY), None);
    }

    #[test]
    fn test_nodes_wired_on_first_row() {
        let mut ds = dataset();
        let x = ds.schema().and_then(|s| s.lookup("x")).expect("x");
        assert!(!ds.is_wired(x));
        ds.next_entry();
        assert!(ds.is_wired(x));
    }

    #[test]
    fn test_load_node() {
        let mut ds = dataset();
        let x = ds.schema().and_then(|s| s.lookup("x")).expect("x");
        ds.seek(1);
        ds.load_node(x).expect("load");
        ds.load_node(x).expect("cached");
        assert_eq!(ds.loads().to_vec(), vec!["x".to_string()]);
        let at = ds.object_address(x).expect("address");
        assert_eq!(ds.memory().bytes(at, 4).expect("bytes"), &1i32.to_le_bytes());
    }

    #[test]
    fn test_corrupt_node_fails() {
        let mut ds = dataset();
        ds.mark_corrupt("x");
        let x = ds.schema().and_then(|s| s.lookup("x")).expect("x");
        ds.next_entry();
        assert!(matches!(ds.load_node(x), Err(ReadError::Load { .. })));
        assert!(ds.object_address(x).is_none());
    }

    #[test]
    fn test_indexed_join_miss() {
        let mut ds = dataset();
        let friend = SourceId(1);
        ds.join_indexed(friend, vec![Some(4), None, Some(0)]);
        assert_eq!(ds.next_entry(), EntryStatus::Valid);
        assert_eq!(ds.active_row(friend), Some(4));
        assert_eq!(ds.next_entry(), EntryStatus::IndexedJoinNoMatch);
        assert_eq!(ds.active_row(friend), None);
        assert_eq!(ds.active_row(SourceId::PRIMARY), Some(1));
    }

    #[test]
    fn test_lazy_wiring_on_first_load() {
        let mut ds = dataset();
        ds.set_lazy_wiring(true);
        let x = ds.schema().and_then(|s| s.lookup("x")).expect("x");
        ds.next_entry();
        assert!(!ds.is_wired(x));
        ds.load_node(x).expect("load");
        assert!(ds.is_wired(x));
    }

    #[test]
    fn test_secondary_rows_follow_index() {
        let friend = SourceId(1);
        let schema = SchemaBuilder::new()
            .node(NodeSpec::scalar("x", "int"))
            .node(NodeSpec::scalar("f", "int").source(friend))
            .build()
            .expect("schema");
        let mut arena = ByteArena::new();
        let x = arena.alloc(4, 4);
        let f0 = arena.alloc(4, 4);
        let f1 = arena.alloc(4, 4);
        let file = DatasetFile::new("joined", schema, arena)
            .row(RowData::new().object("x", x))
            .row(RowData::new().object("x", x))
            .secondary_row(friend, RowData::new().object("f", f0))
            .secondary_row(friend, RowData::new().object("f", f1));
        let mut ds = MemoryDataset::new(
            Arc::new(TypeCatalog::with_builtins()),
            ReaderConfig::default(),
        );
        ds.push_file(file);
        ds.join_indexed(friend, vec![Some(1), Some(0)]);
        let f = ds.schema().and_then(|s| s.lookup("f")).expect("f");

        ds.next_entry();
        ds.load_node(f).expect("load");
        assert_eq!(ds.object_address(f), Some(f1));
        ds.next_entry();
        ds.load_node(f).expect("load");
        assert_eq!(ds.object_address(f), Some(f0));
    }

    #[test]
    fn test_directors() {
        let mut ds = dataset();
        assert!(ds.has_director(SourceId::PRIMARY));
        assert!(!ds.has_director(SourceId(3)));
        ds.join_aligned(SourceId(3));
        assert!(ds.has_director(SourceId(3)));
        ds.detach(SourceId::PRIMARY);
        assert!(!ds.has_director(SourceId::PRIMARY));
    }
}
