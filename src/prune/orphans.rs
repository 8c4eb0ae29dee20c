//! Collection of parentless instance nodes.

use crate::nodeset::consts::{is_hierarchical_ref_type, ORPHAN_EXCEPTIONS};
use crate::nodeset::{AddressSpace, NodeId};
use crate::prune::remove_subtree;

/// Removes every orphaned Object and Variable node, subtree included.
///
/// An instance node is an orphan when none of its stored references is a
/// backward hierarchical one, meaning no surviving node claims it as a
/// child. Root and the modelling-rule nodes are exempt: they are parentless
/// or quasi-parentless by construction and servers expect them.
///
/// Requires a sanitized graph; without reciprocal repair a node whose parent
/// only stores the forward element would be misread as an orphan.
///
/// Returns the removed NodeIds.
pub fn remove_orphans(space: &mut AddressSpace) -> Vec<NodeId> {
    let candidates: Vec<NodeId> = space
        .iter()
        .filter(|n| n.class.is_instance())
        .filter(|n| !ORPHAN_EXCEPTIONS.contains(&n.node_id.to_string().as_str()))
        .filter(|n| {
            !n.references()
                .iter()
                .any(|r| !r.is_forward && is_hierarchical_ref_type(&r.ref_type))
        })
        .map(|n| n.node_id.clone())
        .collect();

    let mut removed = Vec::new();
    for id in candidates {
        // An earlier orphan's subtree may already have taken this one out.
        if space.contains(&id) {
            removed.extend(remove_subtree(space, &id));
        }
    }
    removed
}
