// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-column binding.
//!
//! A [`Binding`] resolves its column path once per dataset generation and
//! afterwards turns every row into an address with a cached read routine
//! plus the resolved [`AddressMode`].

use serde::Serialize;

use crate::cursor::{EntryStatus, Generation, Registration, RowCursor};
use crate::dispatch::ReadDispatcher;
use crate::error::{ReadError, ReadStatus, SetupError, SetupStatus};
use crate::memory::Address;
use crate::navigator::{AddressMode, Navigator, Resolution};
use crate::offset_chain::OffsetChain;
use crate::schema::SourceId;
use crate::shape::ShapeCategory;

/// Serializable view of a binding's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSnapshot {
    pub path: String,
    pub requested_type: Option<String>,
    pub stored_type: Option<String>,
    pub setup_status: SetupStatus,
    pub read_status: ReadStatus,
    pub shape: ShapeCategory,
    pub chain: Option<Vec<u64>>,
    pub diagnostic: Option<String>,
}

/// State of one requested column.
#[derive(Debug)]
pub struct Binding {
    path: String,
    /// `None` for an opaque binding.
    requested: Option<String>,
    resolution: Option<Resolution>,
    source: SourceId,
    dispatcher: ReadDispatcher,
    read_status: ReadStatus,
    setup_status: SetupStatus,
    diagnostic: Option<String>,
    /// Generation the current resolution belongs to.
    generation: Option<Generation>,
    registration: Registration,
}

impl Binding {
    /// Bind `path`, to be read as `requested_type`.
    pub fn new(cursor: &dyn RowCursor, path: impl Into<String>, requested_type: &str) -> Self {
        Self::with_request(cursor, path.into(), Some(requested_type.trim().to_string()))
    }

    /// Bind `path` without a requested type; the column's own type is
    /// adopted.
    pub fn opaque(cursor: &dyn RowCursor, path: impl Into<String>) -> Self {
        Self::with_request(cursor, path.into(), None)
    }

    fn with_request(cursor: &dyn RowCursor, path: String, requested: Option<String>) -> Self {
        let registration = cursor.registry().register(&path);
        Self {
            path,
            requested,
            resolution: None,
            source: SourceId::PRIMARY,
            dispatcher: ReadDispatcher::new(),
            read_status: ReadStatus::NotYetRead,
            setup_status: SetupStatus::NotSetup,
            diagnostic: None,
            generation: None,
            registration,
        }
    }

    pub fn column_path(&self) -> &str {
        &self.path
    }

    pub fn requested_type(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    /// Typedef-resolved stored type, once resolved.
    pub fn stored_type(&self) -> Option<&str> {
        self.resolution.as_ref().map(|r| r.stored_type.as_str())
    }

    pub fn read_status(&self) -> ReadStatus {
        self.read_status
    }

    pub fn setup_status(&self) -> SetupStatus {
        self.setup_status
    }

    /// Message of the most recent failure.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn shape(&self) -> ShapeCategory {
        self.dispatcher.shape()
    }

    pub fn mode(&self) -> Option<&AddressMode> {
        self.resolution.as_ref().map(|r| &r.mode)
    }

    pub fn chain(&self) -> Option<&OffsetChain> {
        self.mode().and_then(AddressMode::chain)
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Leave the cursor's registry early. Idempotent.
    pub fn detach(&mut self) -> bool {
        self.registration.deregister()
    }

    pub fn snapshot(&self) -> BindingSnapshot {
        BindingSnapshot {
            path: self.path.clone(),
            requested_type: self.requested.clone(),
            stored_type: self.stored_type().map(str::to_string),
            setup_status: self.setup_status,
            read_status: self.read_status,
            shape: self.shape(),
            chain: self.chain().map(|c| c.offsets().to_vec()),
            diagnostic: self.diagnostic.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Resolve the column against the cursor's current schema.
    pub fn setup(&mut self, cursor: &dyn RowCursor) -> SetupStatus {
        self.generation = Some(cursor.generation());
        match self.resolve(cursor) {
            Ok(resolution) => {
                self.setup_status = if cursor.entry_status() == EntryStatus::BeyondEnd {
                    SetupStatus::MatchButBeyondLastRow
                } else {
                    SetupStatus::MatchExact
                };
                self.diagnostic = None;
                self.resolution = Some(resolution);
            }
            Err(err) => self.fail_setup(cursor, err),
        }
        self.setup_status
    }

    fn resolve(&mut self, cursor: &dyn RowCursor) -> Result<Resolution, SetupError> {
        let coordinator_gone = || SetupError::CoordinatorGone {
            path: self.path.clone(),
        };
        let registry = self.registration.registry().ok_or_else(coordinator_gone)?;
        let attached = registry.is_registered(self.registration.id());
        if !attached || !cursor.registry().owns(&self.registration) {
            return Err(coordinator_gone());
        }

        let schema = cursor
            .schema()
            .ok_or_else(|| SetupError::Internal("row cursor has no open dataset".into()))?;
        let types = cursor.types();
        let requested = match &self.requested {
            Some(name) => Some(types.resolve(name).ok_or_else(|| {
                SetupError::MissingTypeDescriptor {
                    path: self.path.clone(),
                    type_name: name.clone(),
                }
            })?),
            None => None,
        };

        let resolution = Navigator::new(schema, types).resolve(&self.path, requested.as_deref())?;
        let node = schema.get(resolution.node).ok_or_else(|| {
            SetupError::Internal(format!("node {} vanished from the schema", resolution.node))
        })?;
        self.source = node.source;
        self.dispatcher.prepare(node, cursor.generation());
        Ok(resolution)
    }

    fn fail_setup(&mut self, cursor: &dyn RowCursor, err: SetupError) {
        if err.is_suppressible() && cursor.is_missing_suppressed(&self.path) {
            tracing::debug!("suppressed: {}", err);
        } else {
            tracing::error!("{}", err);
        }
        self.setup_status = err.status();
        self.diagnostic = Some(err.to_string());
        self.resolution = None;
        self.dispatcher.invalidate();
    }

    /// Bring the resolution up to the cursor's generation.
    ///
    /// Every mode is resolved again from the path. A direct-field binding
    /// thereby finds its leaf by name in the new schema, and its stored
    /// type is checked again.
    fn refresh(&mut self, cursor: &dyn RowCursor) {
        if self.generation == Some(cursor.generation()) {
            return;
        }
        self.setup(cursor);
    }

    // -----------------------------------------------------------------------
    // Per-row access
    // -----------------------------------------------------------------------

    /// Load the active row's data for this column.
    pub fn read(&mut self, cursor: &mut dyn RowCursor) -> ReadStatus {
        self.read_base(cursor);
        self.read_status
    }

    fn read_base(&mut self, cursor: &mut dyn RowCursor) -> Option<Address> {
        self.refresh(&*cursor);
        if !self.setup_status.is_match() {
            self.read_status = ReadStatus::Error;
            return None;
        }
        match self.dispatcher.read(cursor) {
            Ok(base) => {
                self.read_status = ReadStatus::Success;
                Some(base)
            }
            Err(err) => {
                self.fail_read(err);
                None
            }
        }
    }

    /// Address of the column's value for the active row.
    ///
    /// `None` when the column is not resolved, when the read fails, or when
    /// the column's source has no row for this entry.
    pub fn address(&mut self, cursor: &mut dyn RowCursor) -> Option<Address> {
        self.refresh(&*cursor);
        if self.setup_status.is_match()
            && cursor.entry_status() == EntryStatus::IndexedJoinNoMatch
            && cursor.active_row(self.source).is_none()
        {
            return None;
        }

        let base = self.read_base(cursor)?;
        let resolved = match self.mode()? {
            AddressMode::Chase(chain) => chain.resolve(base, cursor.memory()),
            AddressMode::Field(field) => base.offset(field.offset),
            AddressMode::Node => Ok(base),
        };
        match resolved {
            Ok(address) => Some(address),
            Err(err) => {
                self.fail_read(err.into());
                None
            }
        }
    }

    pub(crate) fn fail_read(&mut self, err: ReadError) {
        tracing::warn!("column {}: {}", self.path, err);
        self.read_status = ReadStatus::Error;
        self.diagnostic = Some(err.to_string());
    }
}
