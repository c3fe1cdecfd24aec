// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type system.
//!
//! - **TypeDescriptor**: numeric, enum, class and typedef descriptions
//! - **TypeRegistry**: name-based lookup, typedef resolution, inheritance
//! - **Compatibility**: whether stored data can be read as a requested type

mod catalog;
mod compat;
mod descriptor;

pub use catalog::{TypeCatalog, TypeRegistry};
pub use compat::{check_compatibility, Compatibility};
pub use descriptor::{MemberLayout, NumericKind, TypeDescriptor, TypeKind};
