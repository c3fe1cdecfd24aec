// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::types::{NumericKind, TypeDescriptor, TypeKind};

/// Upper bound on typedef hops; a longer chain is treated as a cycle.
const MAX_TYPEDEF_DEPTH: usize = 16;

// ---------------------------------------------------------------------------
// TypeRegistry trait
// ---------------------------------------------------------------------------

/// Name-based type metadata queries.
///
/// Only [`lookup`](TypeRegistry::lookup) is required; typedef resolution
/// and inheritance walks are derived from it.
pub trait TypeRegistry {
    /// Look up a descriptor by exact name.
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Look up a descriptor, following typedefs to the aliased type.
    fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        let mut current = self.lookup(name)?;
        for _ in 0..MAX_TYPEDEF_DEPTH {
            match &current.kind {
                TypeKind::Typedef { target } => current = self.lookup(target)?,
                _ => return Some(current),
            }
        }
        None
    }

    /// True if class `derived` has `base` among its (transitive) bases.
    ///
    /// A class does not inherit from itself.
    fn inherits_from(&self, derived: &str, base: &str) -> bool {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<String> = match self.resolve(derived) {
            Some(desc) => desc.bases().iter().cloned().collect(),
            None => return false,
        };
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let Some(desc) = self.resolve(&name) else {
                continue;
            };
            if desc.name == base || name == base {
                return true;
            }
            queue.extend(desc.bases().iter().cloned());
        }
        false
    }
}

// ---------------------------------------------------------------------------
// TypeCatalog
// ---------------------------------------------------------------------------

/// Fundamental type names, grouped by numeric kind.
const BUILTIN_NAMES: &[(NumericKind, &[&str])] = &[
    (NumericKind::Bool, &["bool", "Bool_t"]),
    (NumericKind::I8, &["i8", "char", "Char_t", "int8_t"]),
    (NumericKind::U8, &["u8", "unsigned char", "UChar_t", "uint8_t"]),
    (NumericKind::I16, &["i16", "short", "Short_t", "int16_t"]),
    (NumericKind::U16, &["u16", "unsigned short", "UShort_t", "uint16_t"]),
    (NumericKind::I32, &["i32", "int", "Int_t", "int32_t"]),
    (NumericKind::U32, &["u32", "unsigned int", "UInt_t", "uint32_t"]),
    (NumericKind::I64, &["i64", "long long", "Long64_t", "int64_t"]),
    (
        NumericKind::U64,
        &["u64", "unsigned long long", "ULong64_t", "uint64_t"],
    ),
    (NumericKind::F32, &["f32", "float", "Float_t"]),
    (NumericKind::F64, &["f64", "double", "Double_t"]),
    (NumericKind::Float16, &["Float16_t"]),
    (NumericKind::Double32, &["Double32_t"]),
];

/// [`HashMap`]-backed [`TypeRegistry`].
///
/// Every alias of a fundamental type is its own descriptor sharing the
/// same [`NumericKind`], so `Long64_t` and `long long` are distinct but
/// numerically equivalent.
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the fundamental numeric types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for (kind, names) in BUILTIN_NAMES {
            for name in *names {
                catalog.register(TypeDescriptor::numeric(*name, *kind));
            }
        }
        catalog
    }

    /// Register a descriptor, replacing any previous one with that name.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.types
            .insert(descriptor.name.clone(), Arc::clone(&descriptor));
        descriptor
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// List registered type names (sorted for determinism).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }
}

impl TypeRegistry for TypeCatalog {
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name.trim()).cloned()
    }
}
