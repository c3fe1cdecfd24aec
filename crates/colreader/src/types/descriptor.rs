// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use serde::{Deserialize, Serialize};

/// Numeric storage kinds.
///
/// `Float16` and `Double32` are reduced-precision storage kinds: in memory
/// they are held as `F32` / `F64`, on disk they are truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Float16,
    Double32,
}

impl NumericKind {
    /// In-memory width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Float16 => 4,
            Self::I64 | Self::U64 | Self::F64 | Self::Double32 => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::U8
                | Self::I16
                | Self::U16
                | Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64 | Self::Float16 | Self::Double32)
    }

    /// In-memory counterpart of a reduced-precision kind; identity otherwise.
    pub fn canonical(&self) -> NumericKind {
        match self {
            Self::Float16 => Self::F32,
            Self::Double32 => Self::F64,
            other => *other,
        }
    }
}

/// Layout of one data member of a class, or one leaf of a flat node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLayout {
    /// Member name.
    pub name: String,
    /// Declared type name.
    pub type_name: String,
    /// Byte offset inside the owning object.
    pub offset: u64,
    /// The member holds a pointer to its value rather than the value.
    pub pointer: bool,
}

impl MemberLayout {
    /// Create an inline member.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, offset: u64) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            offset,
            pointer: false,
        }
    }

    /// Create a pointer member.
    pub fn pointer(name: impl Into<String>, type_name: impl Into<String>, offset: u64) -> Self {
        Self {
            pointer: true,
            ..Self::new(name, type_name, offset)
        }
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Fundamental numeric type.
    Numeric(NumericKind),
    /// Enumeration stored as its underlying numeric kind.
    Enum { underlying: NumericKind },
    /// Class with direct bases and a member layout.
    Class {
        bases: Vec<String>,
        members: Vec<MemberLayout>,
    },
    /// Alias of another type name.
    Typedef { target: String },
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn numeric(name: impl Into<String>, kind: NumericKind) -> Self {
        Self::new(name, TypeKind::Numeric(kind))
    }

    pub fn enumeration(name: impl Into<String>, underlying: NumericKind) -> Self {
        Self::new(name, TypeKind::Enum { underlying })
    }

    pub fn class(name: impl Into<String>, bases: Vec<String>, members: Vec<MemberLayout>) -> Self {
        Self::new(name, TypeKind::Class { bases, members })
    }

    pub fn typedef(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeKind::Typedef {
                target: target.into(),
            },
        )
    }

    /// Numeric kind, if this is a numeric type.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self.kind {
            TypeKind::Numeric(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class { .. })
    }

    /// Member layout if this is a class.
    pub fn members(&self) -> Option<&[MemberLayout]> {
        match &self.kind {
            TypeKind::Class { members, .. } => Some(members),
            _ => None,
        }
    }

    /// Get member by name.
    pub fn member(&self, name: &str) -> Option<&MemberLayout> {
        self.members()?.iter().find(|m| m.name == name)
    }

    /// Direct base class names.
    pub fn bases(&self) -> &[String] {
        match &self.kind {
            TypeKind::Class { bases, .. } => bases,
            _ => &[],
        }
    }
}
