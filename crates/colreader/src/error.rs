// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding statuses and error types.

use serde::Serialize;
use thiserror::Error;

use crate::memory::MemoryError;

/// Outcome of the most recent per-row read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReadStatus {
    NotYetRead,
    Success,
    Error,
}

/// Outcome of resolving a column against the live schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SetupStatus {
    NotSetup,
    MatchExact,
    /// Resolved, but the cursor is already past the last row.
    MatchButBeyondLastRow,
    MismatchType,
    MissingColumn,
    MissingTypeDescriptor,
    InternalError,
}

impl SetupStatus {
    /// True for the two resolved states.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::MatchExact | Self::MatchButBeyondLastRow)
    }
}

/// Column resolution errors. Sticky until the next re-resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("the dataset does not have a column called {path}")]
    MissingColumn { path: String },

    #[error("the dataset has neither a column nor a sub-column called {path}")]
    MissingSubColumn { path: String },

    #[error("column {path} contains data of type {stored}, which cannot be read as {requested}")]
    MismatchType {
        path: String,
        stored: String,
        requested: String,
    },

    #[error("type {type_name} requested for column {path} is unknown to the type registry")]
    MissingTypeDescriptor { path: String, type_name: String },

    #[error("column {path} contains data of type {type_name}, which has no type descriptor")]
    UnknownStoredType { path: String, type_name: String },

    #[error("no row cursor is available for column {path}")]
    CoordinatorGone { path: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl SetupError {
    /// Status recorded on the binding for this error.
    pub fn status(&self) -> SetupStatus {
        match self {
            Self::MissingColumn { .. } | Self::MissingSubColumn { .. } => {
                SetupStatus::MissingColumn
            }
            Self::MismatchType { .. } => SetupStatus::MismatchType,
            Self::MissingTypeDescriptor { .. } => SetupStatus::MissingTypeDescriptor,
            Self::UnknownStoredType { .. } | Self::CoordinatorGone { .. } | Self::Internal(_) => {
                SetupStatus::InternalError
            }
        }
    }

    /// Missing-column errors are the only ones a caller may silence.
    pub fn is_suppressible(&self) -> bool {
        self.status() == SetupStatus::MissingColumn
    }
}

/// Per-row read errors. Independent per row and per column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("failed to load node {node} for the current row: {reason}")]
    Load { node: String, reason: String },

    #[error("node {0} has no data for the current row")]
    NoData(String),

    #[error("node handle is not part of the current schema")]
    StaleNode,

    #[error("memory access failed: {0}")]
    Memory(#[from] MemoryError),
}
