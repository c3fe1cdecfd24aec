// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Row memory model.
//!
//! Addresses handed out by a row cursor are plain integers into a
//! [`Memory`] image. Every dereference goes through the image, so a bad
//! offset chain surfaces as a [`MemoryError`] rather than undefined
//! behaviour.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Width of a stored pointer, in bytes.
pub const POINTER_SIZE: usize = 8;

/// Default base of a [`ByteArena`]. Non-zero so that a zeroed pointer slot
/// never aliases a live allocation.
pub const DEFAULT_ARENA_BASE: u64 = 0x1000;

/// Highest accepted arena base. Leaves the upper 16 bits free so that
/// allocation arithmetic cannot overflow.
pub const MAX_ARENA_BASE: u64 = 1 << 48;

/// An address inside a [`Memory`] image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u64);

impl Address {
    /// The null address.
    pub const NULL: Address = Address(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Advance by `by` bytes.
    pub fn offset(self, by: u64) -> Result<Address, MemoryError> {
        self.0
            .checked_add(by)
            .map(Address)
            .ok_or(MemoryError::Overflow { base: self, by })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Memory access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("null pointer dereference")]
    Null,

    #[error("{len} bytes at {at} are outside the memory image")]
    OutOfBounds { at: Address, len: usize },

    #[error("address overflow: {base} + {by}")]
    Overflow { base: Address, by: u64 },
}

/// Read-only view over the memory a row cursor exposes.
pub trait Memory {
    /// Borrow `len` bytes starting at `at`.
    fn bytes(&self, at: Address, len: usize) -> Result<&[u8], MemoryError>;

    /// Read the pointer stored at `at`.
    fn read_pointer(&self, at: Address) -> Result<Address, MemoryError> {
        let raw = self.bytes(at, POINTER_SIZE)?;
        Ok(Address(LittleEndian::read_u64(raw)))
    }
}

/// Growable, bounds-checked memory image.
///
/// Values are stored little-endian. Allocation is bump-only; the arena is
/// rebuilt per dataset rather than freed piecemeal.
#[derive(Debug, Clone)]
pub struct ByteArena {
    base: u64,
    data: Vec<u8>,
}

impl Default for ByteArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteArena {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_ARENA_BASE)
    }

    /// Create an arena whose first byte lives at `base`.
    ///
    /// A zero base, or one above [`MAX_ARENA_BASE`], is replaced by
    /// [`DEFAULT_ARENA_BASE`]; address 0 is reserved for null.
    pub fn with_base(base: u64) -> Self {
        let base = if base == 0 || base > MAX_ARENA_BASE {
            DEFAULT_ARENA_BASE
        } else {
            base
        };
        Self {
            base,
            data: Vec::new(),
        }
    }

    pub fn base(&self) -> Address {
        Address(self.base)
    }

    /// Bytes allocated so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocate `size` zeroed bytes aligned to `align` (a power of two).
    pub fn alloc(&mut self, size: usize, align: usize) -> Address {
        let align = align.max(1);
        let current = self.base + self.data.len() as u64;
        let aligned = (current + align as u64 - 1) & !(align as u64 - 1);
        let padding = (aligned - current) as usize;
        self.data.resize(self.data.len() + padding + size, 0);
        Address(aligned)
    }

    fn range(&self, at: Address, len: usize) -> Result<std::ops::Range<usize>, MemoryError> {
        if at.is_null() {
            return Err(MemoryError::Null);
        }
        let start = at
            .0
            .checked_sub(self.base)
            .ok_or(MemoryError::OutOfBounds { at, len })? as usize;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(MemoryError::OutOfBounds { at, len })?;
        Ok(start..end)
    }

    /// Copy `bytes` to `at`.
    pub fn write_bytes(&mut self, at: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let range = self.range(at, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Store a pointer to `target` at `at`.
    pub fn write_pointer(&mut self, at: Address, target: Address) -> Result<(), MemoryError> {
        let range = self.range(at, POINTER_SIZE)?;
        LittleEndian::write_u64(&mut self.data[range], target.0);
        Ok(())
    }

    pub fn write_u32(&mut self, at: Address, value: u32) -> Result<(), MemoryError> {
        let range = self.range(at, 4)?;
        LittleEndian::write_u32(&mut self.data[range], value);
        Ok(())
    }

    pub fn write_i32(&mut self, at: Address, value: i32) -> Result<(), MemoryError> {
        let range = self.range(at, 4)?;
        LittleEndian::write_i32(&mut self.data[range], value);
        Ok(())
    }

    pub fn write_u64(&mut self, at: Address, value: u64) -> Result<(), MemoryError> {
        let range = self.range(at, 8)?;
        LittleEndian::write_u64(&mut self.data[range], value);
        Ok(())
    }

    pub fn write_f32(&mut self, at: Address, value: f32) -> Result<(), MemoryError> {
        let range = self.range(at, 4)?;
        LittleEndian::write_f32(&mut self.data[range], value);
        Ok(())
    }

    pub fn write_f64(&mut self, at: Address, value: f64) -> Result<(), MemoryError> {
        let range = self.range(at, 8)?;
        LittleEndian::write_f64(&mut self.data[range], value);
        Ok(())
    }
}

impl Memory for ByteArena {
    fn bytes(&self, at: Address, len: usize) -> Result<&[u8], MemoryError> {
        let range = self.range(at, len)?;
        Ok(&self.data[range])
    }
}
