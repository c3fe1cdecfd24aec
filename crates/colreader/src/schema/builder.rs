// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for [`Schema`].

use std::collections::HashMap;
use thiserror::Error;

use crate::schema::{NodeId, Schema, SchemaNode, SourceId};
use crate::types::{MemberLayout, TypeDescriptor};

/// Schema construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("node {node} refers to unknown {role} node {target}")]
    UnknownReference {
        node: String,
        role: &'static str,
        target: String,
    },

    #[error("node {0} cannot be its own parent or count")]
    SelfReference(String),
}

/// Declarative description of one node, resolved by [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct NodeSpec {
    name: String,
    type_name: String,
    source: SourceId,
    parent: Option<(String, u64)>,
    count: Option<String>,
    collection: bool,
    element_pointer: bool,
    structured: bool,
    members: Vec<MemberLayout>,
}

impl NodeSpec {
    /// A plain value node without members.
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            source: SourceId::PRIMARY,
            parent: None,
            count: None,
            collection: false,
            element_pointer: false,
            structured: false,
            members: Vec::new(),
        }
    }

    /// An object node whose members follow a class layout.
    pub fn object(
        name: impl Into<String>,
        type_name: impl Into<String>,
        members: Vec<MemberLayout>,
    ) -> Self {
        Self {
            structured: true,
            members,
            ..Self::scalar(name, type_name)
        }
    }

    /// An object node laid out like the class `descriptor`.
    pub fn from_class(name: impl Into<String>, descriptor: &TypeDescriptor) -> Self {
        let members = descriptor.members().map(<[_]>::to_vec).unwrap_or_default();
        Self::object(name, descriptor.name.clone(), members)
    }

    /// A flat node made of primitive leaves.
    pub fn leaves(
        name: impl Into<String>,
        type_name: impl Into<String>,
        leaves: Vec<MemberLayout>,
    ) -> Self {
        Self {
            members: leaves,
            ..Self::scalar(name, type_name)
        }
    }

    /// Mark as a collection; `by_pointer` selects pointer element storage.
    pub fn collection(mut self, by_pointer: bool) -> Self {
        self.collection = true;
        self.element_pointer = by_pointer;
        self
    }

    /// Attach to a parent object node at `offset`.
    pub fn parent(mut self, parent: impl Into<String>, offset: u64) -> Self {
        self.parent = Some((parent.into(), offset));
        self
    }

    /// Attach a count sibling node.
    pub fn count(mut self, count: impl Into<String>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Read the node from a secondary dataset.
    pub fn source(mut self, source: SourceId) -> Self {
        self.source = source;
        self
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    specs: Vec<NodeSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    pub fn node(mut self, spec: NodeSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Resolve names into handles and freeze the graph.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut by_name = HashMap::with_capacity(self.specs.len());
        for (index, spec) in self.specs.iter().enumerate() {
            if by_name
                .insert(spec.name.clone(), NodeId(index as u32))
                .is_some()
            {
                return Err(SchemaError::DuplicateNode(spec.name.clone()));
            }
        }

        let resolve = |node: &str, role: &'static str, target: &str| {
            if node == target {
                return Err(SchemaError::SelfReference(node.to_string()));
            }
            by_name
                .get(target)
                .copied()
                .ok_or_else(|| SchemaError::UnknownReference {
                    node: node.to_string(),
                    role,
                    target: target.to_string(),
                })
        };

        let mut nodes = Vec::with_capacity(self.specs.len());
        for (index, spec) in self.specs.iter().enumerate() {
            let (parent, offset_in_parent) = match &spec.parent {
                Some((name, offset)) => (Some(resolve(&spec.name, "parent", name)?), *offset),
                None => (None, 0),
            };
            let count = spec
                .count
                .as_deref()
                .map(|name| resolve(&spec.name, "count", name))
                .transpose()?;

            nodes.push(SchemaNode {
                id: NodeId(index as u32),
                name: spec.name.clone(),
                type_name: spec.type_name.clone(),
                source: spec.source,
                parent,
                offset_in_parent,
                count,
                collection: spec.collection,
                element_pointer: spec.element_pointer,
                structured: spec.structured,
                members: spec.members.clone(),
                children: Vec::new(),
            });
        }

        for index in 0..nodes.len() {
            if let Some(parent) = nodes[index].parent {
                let child = nodes[index].id;
                nodes[parent.index()].children.push(child);
            }
        }

        Ok(Schema::from_parts(nodes, by_name))
    }
}
