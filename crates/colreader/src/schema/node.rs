// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema nodes and handles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::MemberLayout;

/// Handle of a node inside one [`Schema`](crate::schema::Schema).
///
/// Handles are only meaningful for the schema generation that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dataset a node belongs to: the primary dataset or a joined secondary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u16);

impl SourceId {
    pub const PRIMARY: SourceId = SourceId(0);

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }
}

/// Metadata for one structural element of the stored schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    /// Handle of this node.
    pub id: NodeId,
    /// Node name; may itself contain `.`.
    pub name: String,
    /// Declared type name of the stored data.
    pub type_name: String,
    /// Dataset the node is read from.
    pub source: SourceId,
    /// Owning object node, if the node is a member of one.
    pub parent: Option<NodeId>,
    /// Byte offset of this node's data inside the parent object.
    pub offset_in_parent: u64,
    /// Sibling node holding the element count.
    pub count: Option<NodeId>,
    /// Node holds a variable-length collection.
    pub collection: bool,
    /// Collection elements are stored by pointer.
    pub element_pointer: bool,
    /// Members describe a class layout that can be descended into;
    /// otherwise they are a flat list of primitive leaves.
    pub structured: bool,
    /// Ordered members (class layout or leaf list).
    pub members: Vec<MemberLayout>,
    /// Nodes whose parent is this node.
    pub children: Vec<NodeId>,
}

impl SchemaNode {
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn has_count_sibling(&self) -> bool {
        self.count.is_some()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Get member by name.
    pub fn member(&self, name: &str) -> Option<&MemberLayout> {
        self.members.iter().find(|m| m.name == name)
    }
}
