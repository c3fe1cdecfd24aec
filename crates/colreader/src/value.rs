// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed column accessor.

use byteorder::{ByteOrder, LittleEndian};
use std::marker::PhantomData;

use crate::binding::Binding;
use crate::cursor::{EntryStatus, RowCursor};
use crate::error::{ReadError, ReadStatus, SetupStatus};

/// A primitive that can be decoded from a column's memory.
pub trait ColumnType: Sized {
    /// Type name looked up in the type registry.
    const TYPE_NAME: &'static str;
    /// Stored width in bytes.
    const SIZE: usize;

    /// Decode from exactly [`SIZE`](Self::SIZE) little-endian bytes.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! column_type {
    ($ty:ty, $name:literal, $size:literal, |$bytes:ident| $decode:expr) => {
        impl ColumnType for $ty {
            const TYPE_NAME: &'static str = $name;
            const SIZE: usize = $size;

            fn decode($bytes: &[u8]) -> Self {
                $decode
            }
        }
    };
}

column_type!(bool, "bool", 1, |b| b[0] != 0);
column_type!(i8, "i8", 1, |b| b[0] as i8);
column_type!(u8, "u8", 1, |b| b[0]);
column_type!(i16, "i16", 2, |b| LittleEndian::read_i16(b));
column_type!(u16, "u16", 2, |b| LittleEndian::read_u16(b));
column_type!(i32, "i32", 4, |b| LittleEndian::read_i32(b));
column_type!(u32, "u32", 4, |b| LittleEndian::read_u32(b));
column_type!(i64, "i64", 8, |b| LittleEndian::read_i64(b));
column_type!(u64, "u64", 8, |b| LittleEndian::read_u64(b));
column_type!(f32, "f32", 4, |b| LittleEndian::read_f32(b));
column_type!(f64, "f64", 8, |b| LittleEndian::read_f64(b));

/// Per-row typed access to one column.
///
/// ```ignore
/// let mut px = ColumnValue::<f32>::new(&dataset, "event.track.px");
/// while dataset.next_entry() == EntryStatus::Valid {
///     if let Some(px) = px.get(&mut dataset) {
///         // ...
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ColumnValue<T: ColumnType> {
    binding: Binding,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ColumnType> ColumnValue<T> {
    pub fn new(cursor: &dyn RowCursor, path: impl Into<String>) -> Self {
        Self {
            binding: Binding::new(cursor, path, T::TYPE_NAME),
            _marker: PhantomData,
        }
    }

    /// Value of the column for the active row.
    pub fn get(&mut self, cursor: &mut dyn RowCursor) -> Option<T> {
        if cursor.entry_status() == EntryStatus::NotLoaded {
            if !cursor.is_missing_suppressed(self.binding.column_path()) {
                tracing::error!(
                    "value of column {} requested before any row was loaded; \
                     the reader is not properly initialized",
                    self.binding.column_path()
                );
            }
            return None;
        }

        let address = self.binding.address(cursor)?;
        match cursor.memory().bytes(address, T::SIZE) {
            Ok(bytes) => Some(T::decode(bytes)),
            Err(err) => {
                self.binding.fail_read(ReadError::from(err));
                None
            }
        }
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    pub fn column_path(&self) -> &str {
        self.binding.column_path()
    }

    pub fn setup_status(&self) -> SetupStatus {
        self.binding.setup_status()
    }

    pub fn read_status(&self) -> ReadStatus {
        self.binding.read_status()
    }
}
