// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::types::{NumericKind, TypeDescriptor, TypeKind, TypeRegistry};

// ---------------------------------------------------------------------------
// Compatibility level
// ---------------------------------------------------------------------------

/// How a stored type relates to the type a reader asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Same type.
    Identical,
    /// Same numeric kind under another name, or a same-width integer of
    /// the opposite signedness.
    NumericAlias,
    /// Reduced-precision storage (`Float16_t`, `Double32_t`) read through
    /// its in-memory counterpart.
    ReducedPrecision,
    /// Enum read as `int` or as its underlying numeric type (or the reverse).
    EnumAlias,
    /// Stored class derives from the requested class.
    Inherited,
    /// The types cannot be read through one another.
    Incompatible,
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        !matches!(self, Compatibility::Incompatible)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check whether data stored as `stored` can be read as `requested`.
///
/// Both descriptors are expected to be typedef-resolved already; class
/// inheritance is looked up through `registry`.
pub fn check_compatibility(
    requested: &TypeDescriptor,
    stored: &TypeDescriptor,
    registry: &dyn TypeRegistry,
) -> Compatibility {
    if requested.name == stored.name {
        return Compatibility::Identical;
    }

    match (&requested.kind, &stored.kind) {
        (TypeKind::Numeric(want), TypeKind::Numeric(have)) => numeric_compatibility(*want, *have),
        (TypeKind::Numeric(want), TypeKind::Enum { underlying })
        | (TypeKind::Enum { underlying }, TypeKind::Numeric(want)) => {
            // `int` reads any enum stored in four bytes.
            let as_int = *want == NumericKind::I32 && underlying.width() == want.width();
            if as_int || want == underlying {
                Compatibility::EnumAlias
            } else {
                Compatibility::Incompatible
            }
        }
        (TypeKind::Class { .. }, TypeKind::Class { .. }) => {
            if registry.inherits_from(&stored.name, &requested.name) {
                Compatibility::Inherited
            } else {
                Compatibility::Incompatible
            }
        }
        _ => Compatibility::Incompatible,
    }
}

fn numeric_compatibility(want: NumericKind, have: NumericKind) -> Compatibility {
    if want == have {
        return Compatibility::NumericAlias;
    }
    // Reduced precision only widens into its own in-memory kind.
    if have != have.canonical() && have.canonical() == want {
        return Compatibility::ReducedPrecision;
    }
    if want.is_integer() && have.is_integer() && want.width() == have.width() {
        return Compatibility::NumericAlias;
    }
    Compatibility::Incompatible
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
