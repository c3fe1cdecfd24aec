// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable schema graph of one dataset generation.
//!
//! A [`Schema`] is built once per underlying file with [`SchemaBuilder`]
//! and then only queried by name or by [`NodeId`].

mod builder;
mod node;

pub use builder::{NodeSpec, SchemaBuilder, SchemaError};
pub use node::{NodeId, SchemaNode, SourceId};

use std::collections::HashMap;

/// Node graph of one dataset generation.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
    by_name: HashMap<String, NodeId>,
}

impl Schema {
    pub(crate) fn from_parts(nodes: Vec<SchemaNode>, by_name: HashMap<String, NodeId>) -> Self {
        Self { nodes, by_name }
    }

    /// Get a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.index())
    }

    /// Exact name lookup.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Lookup by name, also trying the `name.` spelling used for
    /// split objects.
    pub fn lookup_object(&self, name: &str) -> Option<NodeId> {
        self.lookup(name)
            .or_else(|| self.lookup(&format!("{}.", name)))
    }

    /// Slower, more thorough lookup: exact name, `name.`, then nodes
    /// addressed through their parent (`parent.child`, with or without the
    /// parent's trailing dot).
    pub fn find(&self, name: &str) -> Option<NodeId> {
        if let Some(id) = self.lookup_object(name) {
            return Some(id);
        }
        self.nodes.iter().find_map(|node| {
            let parent = self.get(node.parent?)?;
            let qualified = format!("{}.{}", parent.name.trim_end_matches('.'), node.name);
            (qualified == name).then_some(node.id)
        })
    }

    /// Iterate over all nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
