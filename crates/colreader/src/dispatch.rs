// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-shape read routines and the cached dispatcher.
//!
//! A routine makes the cursor load whatever the node's shape needs for the
//! active row and returns the node's base address. Routines live in a
//! static table indexed by [`ShapeCategory::index`]; the dispatcher picks
//! one lazily and keeps it until the dataset generation changes.

use crate::cursor::{Generation, RowCursor};
use crate::error::ReadError;
use crate::memory::{Address, MemoryError};
use crate::schema::{NodeId, SchemaNode, SourceId};
use crate::shape::{classify, ShapeCategory, ShapeFacts};

/// What a routine needs to know about the node it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTarget {
    pub node: NodeId,
    pub name: String,
    pub source: SourceId,
    pub parent: Option<NodeId>,
    pub offset_in_parent: u64,
    pub count: Option<NodeId>,
    pub facts: ShapeFacts,
}

impl ReadTarget {
    pub fn of(node: &SchemaNode) -> Self {
        Self {
            node: node.id,
            name: node.name.clone(),
            source: node.source,
            parent: node.parent,
            offset_in_parent: node.offset_in_parent,
            count: node.count,
            facts: ShapeFacts::of(node),
        }
    }

    fn parent(&self) -> Result<NodeId, ReadError> {
        self.parent.ok_or_else(|| ReadError::Load {
            node: self.name.clone(),
            reason: "node has no parent object".into(),
        })
    }

    fn count(&self) -> Result<NodeId, ReadError> {
        self.count.ok_or_else(|| ReadError::Load {
            node: self.name.clone(),
            reason: "node has no count sibling".into(),
        })
    }
}

/// Signature shared by every read routine.
pub type Routine = fn(&mut dyn RowCursor, &ReadTarget) -> Result<Address, ReadError>;

/// Routine table, in [`ShapeCategory::CONCRETE`] order.
static ROUTINES: [Routine; 10] = [
    read_without_director,
    read_parent_inline,
    read_parent_collection_pointer,
    read_parent_inline,
    read_node_object,
    read_node_pointer,
    read_node_object,
    read_counted_pointer,
    read_counted_object,
    read_counted_object,
];

/// Routine for a concrete shape; `None` for [`ShapeCategory::Deferred`].
pub fn routine_for(shape: ShapeCategory) -> Option<Routine> {
    shape.index().map(|index| ROUTINES[index])
}

fn object(cursor: &dyn RowCursor, node: NodeId, name: &str) -> Result<Address, ReadError> {
    cursor
        .object_address(node)
        .ok_or_else(|| ReadError::NoData(name.to_string()))
}

fn pointer_at(cursor: &dyn RowCursor, at: Address) -> Result<Address, ReadError> {
    let target = cursor.memory().read_pointer(at)?;
    if target.is_null() {
        return Err(MemoryError::Null.into());
    }
    Ok(target)
}

fn read_without_director(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    cursor.load_node(t.node)?;
    object(cursor, t.node, &t.name)
}

/// Scalars and value collections inside a parent object.
fn read_parent_inline(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    let parent = t.parent()?;
    cursor.load_node(parent)?;
    Ok(object(cursor, parent, &t.name)?.offset(t.offset_in_parent)?)
}

fn read_parent_collection_pointer(
    cursor: &mut dyn RowCursor,
    t: &ReadTarget,
) -> Result<Address, ReadError> {
    let parent = t.parent()?;
    cursor.load_node(parent)?;
    let slot = object(cursor, parent, &t.name)?.offset(t.offset_in_parent)?;
    pointer_at(cursor, slot)
}

fn read_node_object(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    cursor.load_node(t.node)?;
    object(cursor, t.node, &t.name)
}

fn read_node_pointer(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    cursor.load_node(t.node)?;
    let slot = object(cursor, t.node, &t.name)?;
    pointer_at(cursor, slot)
}

fn read_counted_pointer(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    cursor.load_node(t.count()?)?;
    read_node_pointer(cursor, t)
}

fn read_counted_object(cursor: &mut dyn RowCursor, t: &ReadTarget) -> Result<Address, ReadError> {
    cursor.load_node(t.count()?)?;
    read_node_object(cursor, t)
}

// ---------------------------------------------------------------------------
// ReadDispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Prepared {
    generation: Generation,
    target: ReadTarget,
    shape: ShapeCategory,
    routine: Routine,
}

/// Lazily classified, generation-scoped read routine of one binding.
#[derive(Debug, Clone, Default)]
pub struct ReadDispatcher {
    prepared: Option<Prepared>,
}

impl ReadDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the dispatcher for `node` of schema generation `generation`.
    /// The shape is classified on the first read; until then the generic
    /// load is the cached routine.
    pub fn prepare(&mut self, node: &SchemaNode, generation: Generation) {
        self.prepared = Some(Prepared {
            generation,
            target: ReadTarget::of(node),
            shape: ShapeCategory::Deferred,
            routine: read_without_director,
        });
    }

    /// Forget the cached routine.
    pub fn invalidate(&mut self) {
        self.prepared = None;
    }

    /// True if armed for `generation`.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.prepared
            .as_ref()
            .map_or(false, |p| p.generation == generation)
    }

    /// Cached shape; `Deferred` until classified.
    pub fn shape(&self) -> ShapeCategory {
        self.prepared
            .as_ref()
            .map_or(ShapeCategory::Deferred, |p| p.shape)
    }

    pub fn target(&self) -> Option<&ReadTarget> {
        self.prepared.as_ref().map(|p| &p.target)
    }

    /// Run the cached routine, classifying first if needed.
    ///
    /// While the cursor has not wired the node, the generic load runs. If
    /// that load wires the node, the shape is classified and the shape's
    /// routine produces the address.
    pub fn read(&mut self, cursor: &mut dyn RowCursor) -> Result<Address, ReadError> {
        let prepared = self.prepared.as_mut().ok_or(ReadError::StaleNode)?;
        if prepared.generation != cursor.generation() {
            return Err(ReadError::StaleNode);
        }

        if prepared.shape.is_deferred() {
            if !cursor.is_wired(prepared.target.node) {
                let base = (prepared.routine)(cursor, &prepared.target)?;
                if !cursor.is_wired(prepared.target.node) {
                    return Ok(base);
                }
            }
            let shape = Self::classify(cursor, &prepared.target);
            if let Some(routine) = routine_for(shape) {
                prepared.shape = shape;
                prepared.routine = routine;
            }
        }

        (prepared.routine)(cursor, &prepared.target)
    }

    fn classify(cursor: &dyn RowCursor, target: &ReadTarget) -> ShapeCategory {
        let shape = classify(target.facts, cursor.has_director(target.source));
        tracing::debug!("node {} reads as {:?}", target.name, shape);
        shape
    }
}
