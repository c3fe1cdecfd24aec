// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pointer-chasing offset chains.
//!
//! A chain `[o0, o1, .., on]` applied to a base address `b` yields
//! `*(..*(*(b + o0) + o1)..) + on`: every entry but the last is followed
//! through a stored pointer, the last is a plain offset.

use serde::Serialize;

use crate::memory::{Address, Memory, MemoryError};

/// Non-empty ordered list of byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetChain {
    offsets: Vec<u64>,
}

impl OffsetChain {
    /// Build a chain; `None` for an empty offset list.
    pub fn new(offsets: Vec<u64>) -> Option<Self> {
        (!offsets.is_empty()).then_some(Self { offsets })
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Number of pointer dereferences performed by [`resolve`](Self::resolve).
    pub fn dereferences(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Final plain offset.
    pub fn last(&self) -> u64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Follow the chain from `base`.
    pub fn resolve(&self, base: Address, memory: &dyn Memory) -> Result<Address, MemoryError> {
        let (last, hops) = match self.offsets.split_last() {
            Some(split) => split,
            None => return Ok(base),
        };
        let mut address = base;
        for offset in hops {
            address = memory.read_pointer(address.offset(*offset)?)?;
            if address.is_null() {
                return Err(MemoryError::Null);
            }
        }
        address.offset(*last)
    }
}
