// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural read shapes.
//!
//! Every column is read through one of ten access patterns, chosen from
//! four structural facts of its node:
//!
//! | parent | collection | count sibling | by pointer | shape |
//! |--------|------------|---------------|------------|-------|
//! | any    | any        | any           | any        | `NoCoordinator` (no director) |
//! | yes    | no         |               |            | `ParentScalar` |
//! | yes    | yes        |               | yes        | `ParentCollectionPointer` |
//! | yes    | yes        |               | no         | `ParentCollectionValue` |
//! | no     | no         | no            |            | `Scalar` |
//! | no     | yes        | no            | yes        | `CollectionPointer` |
//! | no     | yes        | no            | no         | `CollectionValue` |
//! | no     | yes        | yes           | yes        | `CountedCollectionPointer` |
//! | no     | yes        | yes           | no         | `CountedCollectionValue` |
//! | no     | no         | yes           |            | `CountedScalar` |

use serde::Serialize;

use crate::schema::SchemaNode;

/// Read-dispatch shape of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeCategory {
    /// Not classified yet; re-derived on the next read.
    Deferred,
    NoCoordinator,
    ParentScalar,
    ParentCollectionPointer,
    ParentCollectionValue,
    Scalar,
    CollectionPointer,
    CollectionValue,
    CountedCollectionPointer,
    CountedCollectionValue,
    CountedScalar,
}

impl ShapeCategory {
    /// The ten concrete shapes, in table order.
    pub const CONCRETE: [ShapeCategory; 10] = [
        Self::NoCoordinator,
        Self::ParentScalar,
        Self::ParentCollectionPointer,
        Self::ParentCollectionValue,
        Self::Scalar,
        Self::CollectionPointer,
        Self::CollectionValue,
        Self::CountedCollectionPointer,
        Self::CountedCollectionValue,
        Self::CountedScalar,
    ];

    /// Position in [`CONCRETE`](Self::CONCRETE); `None` for `Deferred`.
    pub fn index(self) -> Option<usize> {
        let index = match self {
            Self::Deferred => return None,
            Self::NoCoordinator => 0,
            Self::ParentScalar => 1,
            Self::ParentCollectionPointer => 2,
            Self::ParentCollectionValue => 3,
            Self::Scalar => 4,
            Self::CollectionPointer => 5,
            Self::CollectionValue => 6,
            Self::CountedCollectionPointer => 7,
            Self::CountedCollectionValue => 8,
            Self::CountedScalar => 9,
        };
        Some(index)
    }

    pub fn is_deferred(self) -> bool {
        self == Self::Deferred
    }
}

/// Structural facts a shape is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeFacts {
    pub has_parent: bool,
    pub collection: bool,
    pub count_sibling: bool,
    pub element_pointer: bool,
}

impl ShapeFacts {
    pub fn of(node: &SchemaNode) -> Self {
        Self {
            has_parent: node.has_parent(),
            collection: node.collection,
            count_sibling: node.has_count_sibling(),
            element_pointer: node.element_pointer,
        }
    }
}

/// Classify a node.
///
/// `has_director` is false when the coordinator has no row director for
/// the node's source; that case wins over every structural fact.
pub fn classify(facts: ShapeFacts, has_director: bool) -> ShapeCategory {
    if !has_director {
        return ShapeCategory::NoCoordinator;
    }
    match (
        facts.has_parent,
        facts.collection,
        facts.count_sibling,
        facts.element_pointer,
    ) {
        (true, false, _, _) => ShapeCategory::ParentScalar,
        (true, true, _, true) => ShapeCategory::ParentCollectionPointer,
        (true, true, _, false) => ShapeCategory::ParentCollectionValue,
        (false, false, false, _) => ShapeCategory::Scalar,
        (false, true, false, true) => ShapeCategory::CollectionPointer,
        (false, true, false, false) => ShapeCategory::CollectionValue,
        (false, true, true, true) => ShapeCategory::CountedCollectionPointer,
        (false, true, true, false) => ShapeCategory::CountedCollectionValue,
        (false, false, true, _) => ShapeCategory::CountedScalar,
    }
}
