//! Fixed-point pruning of unreferenced type nodes.

use std::collections::HashSet;

use crate::nodeset::consts::{matches_ref_type, HAS_MODELLING_RULE, HAS_SUBTYPE, HAS_TYPE_DEFINITION};
use crate::nodeset::{AddressSpace, AliasTable, NodeClass, NodeId, UaNode};
use crate::prune::remove_subtree;

/// Retention knobs of the unused-type pass.
#[derive(Debug, Clone, Default)]
pub struct UnusedOptions {
    /// Keep every namespace-0 type regardless of usage
    pub retain_ns0: bool,
    /// Types to keep regardless of usage, as NodeId text or alias
    pub retain_types: Vec<String>,
}

/// Outcome of the usage check for one type node.
enum Usage {
    Used,
    /// Unused; the ids are instance-declaration nodes to take down with it.
    Unused(Vec<NodeId>),
}

/// Removes type nodes nothing in the graph uses.
///
/// Runs full passes over the four type classes, ObjectType before
/// VariableType before DataType before ReferenceType, until a pass removes
/// nothing. The fixed point is needed because pruning a type can orphan the
/// types only it was using. Each pass skips retained types (namespace 0 when
/// `retain_ns0`, plus the explicit list, alias-resolved) and subtyped types;
/// what "used" means depends on the class:
///
/// - ObjectType/VariableType: an Object or Variable points at it through a
///   forward HasTypeDefinition reference. Instance-declaration nodes, those
///   carrying a HasModellingRule reference, are templates belonging to the
///   type itself and do not count; they are removed together with it.
/// - DataType: a Variable names it in its `DataType` attribute.
/// - ReferenceType: a Reference element anywhere is typed with it.
///
/// Type texts on the usage side may be aliases; they are resolved against
/// the graph's alias table before comparison.
///
/// Returns the removed NodeIds.
pub fn remove_unused(space: &mut AddressSpace, options: &UnusedOptions) -> Vec<NodeId> {
    let retained = retained_texts(&space.aliases, &options.retain_types);

    const PRIORITY: [NodeClass; 4] = [
        NodeClass::ObjectType,
        NodeClass::VariableType,
        NodeClass::DataType,
        NodeClass::ReferenceType,
    ];

    let mut removed = Vec::new();
    loop {
        let removed_before = removed.len();
        for class in PRIORITY {
            let candidates: Vec<NodeId> = space
                .iter()
                .filter(|n| n.class == class)
                .map(|n| n.node_id.clone())
                .collect();
            for id in candidates {
                if !space.contains(&id) {
                    continue;
                }
                if options.retain_ns0 && id.is_ns0() {
                    continue;
                }
                if retained.contains(&id.to_string()) {
                    continue;
                }
                if is_subtyped(space, &id) {
                    continue;
                }
                if let Usage::Unused(declarations) = check_usage(space, class, &id) {
                    removed.extend(remove_subtree(space, &id));
                    for declaration in declarations {
                        if space.contains(&declaration) {
                            removed.extend(remove_subtree(space, &declaration));
                        }
                    }
                }
            }
        }
        if removed.len() == removed_before {
            break;
        }
    }
    removed
}

/// Normalizes the retain list to canonical NodeId text: aliases are resolved
/// through the table, NodeId text is re-rendered canonically, anything else
/// is kept verbatim.
fn retained_texts(aliases: &AliasTable, retain_types: &[String]) -> HashSet<String> {
    retain_types
        .iter()
        .map(|entry| canonical_text(aliases, entry))
        .collect()
}

fn canonical_text(aliases: &AliasTable, text: &str) -> String {
    let resolved = aliases.resolve_or_self(text);
    match resolved.parse::<NodeId>() {
        Ok(id) => id.to_string(),
        Err(_) => resolved.to_string(),
    }
}

/// True when a reference-type text denotes the well-known pair, directly or
/// through an alias binding.
fn ref_type_is(aliases: &AliasTable, text: &str, pair: (&str, &str)) -> bool {
    matches_ref_type(text, pair) || aliases.resolve(text) == Some(pair.1)
}

/// A type with subtypes stores forward HasSubtype references to them.
fn is_subtyped(space: &AddressSpace, id: &NodeId) -> bool {
    let Some(node) = space.get(id) else {
        return false;
    };
    node.references()
        .iter()
        .any(|r| r.is_forward && ref_type_is(&space.aliases, &r.ref_type, HAS_SUBTYPE))
}

fn check_usage(space: &AddressSpace, class: NodeClass, id: &NodeId) -> Usage {
    match class {
        NodeClass::ObjectType | NodeClass::VariableType => instance_usage(space, id),
        NodeClass::DataType => {
            let id_text = id.to_string();
            let used = space.iter().any(|n| {
                n.class == NodeClass::Variable
                    && n.data_type
                        .as_deref()
                        .is_some_and(|t| canonical_text(&space.aliases, t) == id_text)
            });
            if used {
                Usage::Used
            } else {
                Usage::Unused(Vec::new())
            }
        }
        NodeClass::ReferenceType => {
            let id_text = id.to_string();
            let used = space.iter().any(|n| {
                n.references()
                    .iter()
                    .any(|r| canonical_text(&space.aliases, &r.ref_type) == id_text)
            });
            if used {
                Usage::Used
            } else {
                Usage::Unused(Vec::new())
            }
        }
        _ => Usage::Used,
    }
}

/// Usage check for ObjectType/VariableType: real instances count, instance
/// declarations of the type itself do not, but are collected for removal.
fn instance_usage(space: &AddressSpace, type_id: &NodeId) -> Usage {
    let mut declarations = Vec::new();
    for node in space.iter() {
        if !node.class.is_instance() {
            continue;
        }
        let typed_by = node.references().iter().any(|r| {
            r.is_forward
                && r.target == *type_id
                && ref_type_is(&space.aliases, &r.ref_type, HAS_TYPE_DEFINITION)
        });
        if !typed_by {
            continue;
        }
        if is_instance_declaration(space, node) {
            declarations.push(node.node_id.clone());
        } else {
            return Usage::Used;
        }
    }
    Usage::Unused(declarations)
}

fn is_instance_declaration(space: &AddressSpace, node: &UaNode) -> bool {
    node.references()
        .iter()
        .any(|r| r.is_forward && ref_type_is(&space.aliases, &r.ref_type, HAS_MODELLING_RULE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodeset::Reference;
    use crate::sanitize::sanitize;
    use crate::test::node;

    fn object_type(id: u32) -> UaNode {
        node(NodeClass::ObjectType, id)
    }

    fn typed_instance(id: u32, type_id: u32) -> UaNode {
        let mut n = node(NodeClass::Object, id);
        n.add_reference(Reference::forward(
            "HasTypeDefinition",
            NodeId::numeric(0, type_id),
        ));
        n
    }

    fn space_of(nodes: Vec<UaNode>) -> AddressSpace {
        let mut space = AddressSpace::new();
        for n in nodes {
            space.insert(n);
        }
        sanitize(&mut space);
        space
    }

    #[test]
    fn test_unused_object_type_is_removed() {
        let mut space = space_of(vec![object_type(100), typed_instance(1, 200), object_type(200)]);
        let removed = remove_unused(&mut space, &UnusedOptions::default());
        assert_eq!(removed, vec![NodeId::numeric(0, 100)]);
        assert!(space.contains(&NodeId::numeric(0, 200)));
    }

    #[test]
    fn test_retain_ns0_keeps_standard_types() {
        let mut space = space_of(vec![object_type(100)]);
        let options = UnusedOptions {
            retain_ns0: true,
            ..UnusedOptions::default()
        };
        assert!(remove_unused(&mut space, &options).is_empty());
    }

    #[test]
    fn test_retain_types_accepts_aliases() {
        let mut space = space_of(vec![object_type(100)]);
        space.aliases.insert("MyType", "i=100");
        let options = UnusedOptions {
            retain_ns0: false,
            retain_types: vec!["MyType".to_string()],
        };
        assert!(remove_unused(&mut space, &options).is_empty());
    }

    #[test]
    fn test_subtyped_type_is_kept() {
        let mut supertype = object_type(100);
        supertype.add_reference(Reference::forward("HasSubtype", NodeId::numeric(0, 101)));
        let mut space = space_of(vec![supertype, object_type(101), typed_instance(1, 101)]);
        assert!(remove_unused(&mut space, &UnusedOptions::default()).is_empty());
    }

    #[test]
    fn test_declaration_only_usage_removes_type_and_declarations() {
        // Instance 1 points at type 100 but carries a modelling rule, so it
        // is a template of the type, not a user.
        let mut declaration = typed_instance(1, 100);
        declaration.add_reference(Reference::forward(
            "HasModellingRule",
            NodeId::numeric(0, 78),
        ));
        let mut space = space_of(vec![object_type(100), declaration, node(NodeClass::Object, 78)]);
        let removed = remove_unused(&mut space, &UnusedOptions::default());
        assert!(removed.contains(&NodeId::numeric(0, 100)));
        assert!(removed.contains(&NodeId::numeric(0, 1)));
        assert!(space.contains(&NodeId::numeric(0, 78)));
    }

    #[test]
    fn test_data_type_usage_via_attribute() {
        let mut variable = node(NodeClass::Variable, 1);
        variable.data_type = Some("MyData".to_string());
        let mut space = space_of(vec![node(NodeClass::DataType, 500), variable]);
        space.aliases.insert("MyData", "i=500");
        assert!(remove_unused(&mut space, &UnusedOptions::default()).is_empty());

        // Unbind the usage and the type goes.
        space.get_mut(&NodeId::numeric(0, 1)).unwrap().data_type = None;
        let removed = remove_unused(&mut space, &UnusedOptions::default());
        assert_eq!(removed, vec![NodeId::numeric(0, 500)]);
    }

    #[test]
    fn test_reference_type_usage_via_reference_elements() {
        let mut a = node(NodeClass::Object, 1);
        a.add_reference(Reference::forward("ns=0;i=600", NodeId::numeric(0, 2)));
        let mut space = space_of(vec![node(NodeClass::ReferenceType, 600), a, node(NodeClass::Object, 2)]);
        assert!(remove_unused(&mut space, &UnusedOptions::default()).is_empty());
    }

    #[test]
    fn test_fixed_point_cascades() {
        // DataType 700 is used only by a Variable living inside the subtree
        // of the unused ReferenceType 600. DataTypes are checked before
        // ReferenceTypes within a pass, so 700 survives the first pass and
        // only falls in the second, after its last user was pruned.
        let mut member = node(NodeClass::Variable, 2);
        member.data_type = Some("i=700".to_string());
        member.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 600)));
        let mut space = space_of(vec![
            node(NodeClass::ReferenceType, 600),
            member,
            node(NodeClass::DataType, 700),
        ]);
        let removed = remove_unused(&mut space, &UnusedOptions::default());
        let mut ids: Vec<u32> = removed.iter().map(|n| n.as_numeric().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 600, 700]);
    }
}
