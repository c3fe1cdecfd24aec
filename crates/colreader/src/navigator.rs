// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Column path resolution.
//!
//! A column path is either a node name (node names may contain `.`) or a
//! dotted member path rooted at a node, e.g. `event.track.px`. Resolution
//! yields the node the value lives in plus how to get from that node's
//! current-row address to the value:
//!
//! - [`AddressMode::Chase`]: walk an [`OffsetChain`] through class members,
//!   dereferencing pointer members on the way;
//! - [`AddressMode::Field`]: a primitive leaf of a flat node;
//! - [`AddressMode::Node`]: the node's own data.
//!
//! Precedence when a dotted path could mean several things:
//!
//! 1. A flat node named by a prefix of the path, holding a leaf named by
//!    the remaining segments, always wins.
//! 2. A member walk wins unless the full path also names a node literally;
//!    then the literal node is used and the chain is dropped.
//! 3. Otherwise the literal node, or a missing-column error.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::SetupError;
use crate::offset_chain::OffsetChain;
use crate::schema::{NodeId, Schema, SchemaNode};
use crate::types::{check_compatibility, MemberLayout, TypeDescriptor, TypeRegistry};

/// Accessor for one primitive leaf of a flat node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAccessor {
    pub node: String,
    pub field: String,
    pub offset: u64,
}

/// How the value's address is derived from its node's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AddressMode {
    Chase(OffsetChain),
    Field(FieldAccessor),
    Node,
}

impl AddressMode {
    pub fn is_chase(&self) -> bool {
        matches!(self, AddressMode::Chase(_))
    }

    pub fn chain(&self) -> Option<&OffsetChain> {
        match self {
            AddressMode::Chase(chain) => Some(chain),
            _ => None,
        }
    }
}

/// A successfully resolved column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Node the value is read from.
    pub node: NodeId,
    /// Typedef-resolved name of the stored value type.
    pub stored_type: String,
    pub mode: AddressMode,
}

/// Split `path` into `(prefix, last_segment)` at its trailing `.segment`.
pub(crate) fn split_tail(path: &str) -> Option<(&str, &str)> {
    static TAIL: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = TAIL
        .get_or_init(|| Regex::new(r"\.[A-Za-z0-9_]+$").ok())
        .as_ref()?;
    let found = pattern.find(path)?;
    Some((&path[..found.start()], &path[found.start() + 1..]))
}

/// Resolves column paths against one schema generation.
pub struct Navigator<'a> {
    schema: &'a Schema,
    types: &'a dyn TypeRegistry,
}

impl<'a> Navigator<'a> {
    pub fn new(schema: &'a Schema, types: &'a dyn TypeRegistry) -> Self {
        Self { schema, types }
    }

    /// Resolve `path`. With `requested == None` (opaque read) any stored
    /// type is accepted.
    pub fn resolve(
        &self,
        path: &str,
        requested: Option<&TypeDescriptor>,
    ) -> Result<Resolution, SetupError> {
        let literal = self.schema.find(path);

        if path.contains('.') {
            match (self.resolve_composite(path, requested), literal) {
                (Ok(resolution), Some(node)) if resolution.mode.is_chase() => {
                    tracing::debug!(
                        "column {} names node {} literally; ignoring member walk",
                        path,
                        node
                    );
                }
                (Ok(resolution), _) => return Ok(resolution),
                (Err(err), None) => return Err(err),
                (Err(err), Some(_)) => {
                    tracing::debug!(
                        "member walk for {} failed ({}); using literal node",
                        path,
                        err
                    );
                }
            }
        }

        match literal.and_then(|id| self.schema.get(id)) {
            Some(node) => self.resolve_node(path, node, requested),
            None => Err(SetupError::MissingColumn {
                path: path.to_string(),
            }),
        }
    }

    /// Dotted-path search: strip trailing segments until a prefix names a
    /// node, then walk the stripped segments.
    fn resolve_composite(
        &self,
        path: &str,
        requested: Option<&TypeDescriptor>,
    ) -> Result<Resolution, SetupError> {
        let missing = || SetupError::MissingSubColumn {
            path: path.to_string(),
        };

        let mut segments: Vec<&str> = Vec::new();
        let mut prefix = path;
        let mut found = None;
        while let Some((head, segment)) = split_tail(prefix) {
            segments.push(segment);
            prefix = head;
            // The first prefix must match exactly; deeper ones may be split
            // objects spelled with a trailing dot.
            let id = if segments.len() == 1 {
                self.schema.lookup(prefix)
            } else {
                self.schema.lookup_object(prefix)
            };
            if let Some(id) = id {
                found = Some(id);
                break;
            }
        }

        let node = found
            .and_then(|id| self.schema.get(id))
            .ok_or_else(missing)?;

        if node.structured {
            self.walk_members(path, node, segments, requested)
        } else {
            segments.reverse();
            self.match_leaf(path, node, &segments.join("."), requested)
        }
    }

    /// Walk class members, consuming `segments` from the back.
    fn walk_members(
        &self,
        path: &str,
        node: &SchemaNode,
        mut segments: Vec<&str>,
        requested: Option<&TypeDescriptor>,
    ) -> Result<Resolution, SetupError> {
        let missing = || SetupError::MissingSubColumn {
            path: path.to_string(),
        };

        let mut members: Vec<MemberLayout> = node.members.clone();
        let mut offsets = Vec::new();
        let mut offset = 0u64;
        let mut value_type = node.type_name.clone();

        while let Some(segment) = segments.pop() {
            let member = members
                .iter()
                .find(|m| m.name == segment)
                .cloned()
                .ok_or_else(missing)?;

            offset = offset
                .checked_add(member.offset)
                .ok_or_else(|| SetupError::Internal(format!("offset overflow in {}", path)))?;
            if member.pointer {
                offsets.push(offset);
                offset = 0;
            }
            value_type = member.type_name.clone();

            if !segments.is_empty() {
                members = self
                    .types
                    .resolve(&member.type_name)
                    .and_then(|desc| desc.members().map(<[_]>::to_vec))
                    .ok_or_else(missing)?;
            }
        }
        offsets.push(offset);

        let stored = self.stored_type(path, &value_type)?;
        self.check(path, requested, &stored)?;
        let chain = OffsetChain::new(offsets)
            .ok_or_else(|| SetupError::Internal(format!("empty offset chain for {}", path)))?;

        Ok(Resolution {
            node: node.id,
            stored_type: stored.name.clone(),
            mode: AddressMode::Chase(chain),
        })
    }

    /// Match `field` against the leaves of a flat node.
    fn match_leaf(
        &self,
        path: &str,
        node: &SchemaNode,
        field: &str,
        requested: Option<&TypeDescriptor>,
    ) -> Result<Resolution, SetupError> {
        let leaf = node
            .member(field)
            .ok_or_else(|| SetupError::MissingSubColumn {
                path: path.to_string(),
            })?;

        let stored = self.stored_type(path, &leaf.type_name)?;
        self.check(path, requested, &stored)?;

        Ok(Resolution {
            node: node.id,
            stored_type: stored.name.clone(),
            mode: AddressMode::Field(FieldAccessor {
                node: node.name.clone(),
                field: leaf.name.clone(),
                offset: leaf.offset,
            }),
        })
    }

    fn resolve_node(
        &self,
        path: &str,
        node: &SchemaNode,
        requested: Option<&TypeDescriptor>,
    ) -> Result<Resolution, SetupError> {
        let stored = self.stored_type(path, &node.type_name)?;
        self.check(path, requested, &stored)?;
        Ok(Resolution {
            node: node.id,
            stored_type: stored.name.clone(),
            mode: AddressMode::Node,
        })
    }

    fn stored_type(
        &self,
        path: &str,
        type_name: &str,
    ) -> Result<std::sync::Arc<TypeDescriptor>, SetupError> {
        self.types
            .resolve(type_name)
            .ok_or_else(|| SetupError::UnknownStoredType {
                path: path.to_string(),
                type_name: type_name.to_string(),
            })
    }

    fn check(
        &self,
        path: &str,
        requested: Option<&TypeDescriptor>,
        stored: &TypeDescriptor,
    ) -> Result<(), SetupError> {
        let Some(requested) = requested else {
            return Ok(());
        };
        if check_compatibility(requested, stored, self.types).is_compatible() {
            Ok(())
        } else {
            Err(SetupError::MismatchType {
                path: path.to_string(),
                stored: stored.name.clone(),
                requested: requested.name.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeSpec, SchemaBuilder};
    use crate::types::TypeCatalog;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::with_builtins();
        catalog.register(TypeDescriptor::class(
            "Inner",
            vec![],
            vec![
                MemberLayout::new("pad", "int", 0),
                MemberLayout::new("c", "float", 4),
            ],
        ));
        catalog.register(TypeDescriptor::class(
            "Middle",
            vec![],
            vec![
                MemberLayout::new("id", "int", 0),
                MemberLayout::pointer("b", "Inner", 8),
                MemberLayout::new("inline", "Inner", 16),
            ],
        ));
        catalog.register(TypeDescriptor::class(
            "Root",
            vec![],
            vec![
                MemberLayout::new("n", "UInt_t", 0),
                MemberLayout::pointer("a", "Middle", 16),
                MemberLayout::new("m", "Middle", 24),
            ],
        ));
        catalog.register(TypeDescriptor::typedef("Length_t", "Double_t"));
        catalog
    }

    fn schema() -> Schema {
        let catalog = catalog();
        let root = catalog.lookup("Root").expect("Root");
        SchemaBuilder::new()
            .node(NodeSpec::from_class("root", &root))
            .node(NodeSpec::leaves(
                "v",
                "v",
                vec![
                    MemberLayout::new("a", "int", 0),
                    MemberLayout::new("b", "double", 8),
                ],
            ))
            .node(NodeSpec::scalar("w.v.a", "float"))
            .node(NodeSpec::scalar("plain", "Length_t"))
            .build()
            .expect("schema")
    }

    fn requested(catalog: &TypeCatalog, name: &str) -> std::sync::Arc<TypeDescriptor> {
        catalog.resolve(name).expect("requested type")
    }

    #[test]
    fn split_tail_strips_last_segment() {
        assert_eq!(split_tail("a.b.c"), Some(("a.b", "c")));
        assert_eq!(split_tail("a"), None);
        assert_eq!(split_tail("a.b-c"), None);
        assert_eq!(split_tail("a."), None);
    }

    #[test]
    fn pointer_members_start_new_chain_entries() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);
        let float = requested(&catalog, "float");

        let res = nav.resolve("root.a.b.c", Some(&float)).expect("resolve");
        assert_eq!(res.mode.chain().map(|c| c.offsets().to_vec()), Some(vec![16, 8, 4]));
        assert_eq!(res.stored_type, "float");
        assert_eq!(Some(res.node), schema.lookup("root"));
    }

    #[test]
    fn inline_members_accumulate() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);
        let float = requested(&catalog, "float");

        let res = nav.resolve("root.m.inline.c", Some(&float)).expect("resolve");
        assert_eq!(res.mode.chain().map(|c| c.offsets().to_vec()), Some(vec![24 + 16 + 4]));
    }

    #[test]
    fn leaf_of_flat_node() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let res = nav
            .resolve("v.b", Some(&requested(&catalog, "double")))
            .expect("resolve");
        assert_eq!(
            res.mode,
            AddressMode::Field(FieldAccessor {
                node: "v".into(),
                field: "b".into(),
                offset: 8,
            })
        );

        let err = nav
            .resolve("v.c", Some(&requested(&catalog, "double")))
            .expect_err("no such leaf");
        assert_eq!(err, SetupError::MissingSubColumn { path: "v.c".into() });
    }

    #[test]
    fn literal_name_with_dots() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let res = nav
            .resolve("w.v.a", Some(&requested(&catalog, "float")))
            .expect("resolve");
        assert_eq!(res.mode, AddressMode::Node);
        assert_eq!(Some(res.node), schema.lookup("w.v.a"));
    }

    #[test]
    fn typedef_resolved_for_node_type() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let res = nav
            .resolve("plain", Some(&requested(&catalog, "double")))
            .expect("resolve");
        assert_eq!(res.stored_type, "Double_t");
    }

    #[test]
    fn unsigned_member_read_as_signed() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let res = nav
            .resolve("root.n", Some(&requested(&catalog, "i32")))
            .expect("resolve");
        assert_eq!(res.stored_type, "UInt_t");
    }

    #[test]
    fn mismatch_names_both_types() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let err = nav
            .resolve("root.a", Some(&requested(&catalog, "float")))
            .expect_err("class vs float");
        assert_eq!(
            err,
            SetupError::MismatchType {
                path: "root.a".into(),
                stored: "Middle".into(),
                requested: "float".into(),
            }
        );
    }

    #[test]
    fn missing_paths() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);
        let float = requested(&catalog, "float");

        assert_eq!(
            nav.resolve("nope", Some(&float)),
            Err(SetupError::MissingColumn { path: "nope".into() })
        );
        assert_eq!(
            nav.resolve("root.a.zz", Some(&float)),
            Err(SetupError::MissingSubColumn {
                path: "root.a.zz".into()
            })
        );
        assert_eq!(
            nav.resolve("nowhere.x.y", Some(&float)),
            Err(SetupError::MissingSubColumn {
                path: "nowhere.x.y".into()
            })
        );
    }

    #[test]
    fn cannot_descend_through_numeric_member() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let err = nav
            .resolve("root.n.x", Some(&requested(&catalog, "float")))
            .expect_err("n is numeric");
        assert_eq!(err.status(), crate::error::SetupStatus::MissingColumn);
    }

    #[test]
    fn opaque_read_accepts_any_type() {
        let catalog = catalog();
        let schema = schema();
        let nav = Navigator::new(&schema, &catalog);

        let res = nav.resolve("root.a", None).expect("resolve");
        assert_eq!(res.stored_type, "Middle");
        assert_eq!(res.mode.chain().map(|c| c.offsets().to_vec()), Some(vec![16, 0]));
    }
}
