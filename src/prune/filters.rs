//! Targeted removal filters for well-known namespace-0 content.
//!
//! These run before sanitization: they delete by id, not by graph shape, so
//! missing reciprocals do not matter. Each filter pairs the node removals
//! with a graph-wide sweep of the Reference elements pointing at them.

use std::collections::HashSet;
use std::str::FromStr;

use crate::nodeset::consts::{
    matches_ref_type, HAS_PROPERTY, MAX_MONITORED_ITEMS_PER_CALL, MAX_NODES_PER_METHOD_CALL,
    MAX_NODES_PER_NODE_MANAGEMENT,
};
use crate::nodeset::{AddressSpace, NodeClass, NodeId};
use crate::Result;

/// Removes the given nodes and strips every reference to them.
fn remove_nodes(space: &mut AddressSpace, ids: Vec<NodeId>) -> Vec<NodeId> {
    let mut removed = Vec::new();
    for id in ids {
        if space.remove(&id).is_some() {
            removed.push(id);
        }
    }
    let gone: HashSet<NodeId> = removed.iter().cloned().collect();
    if !gone.is_empty() {
        space.remove_references_to(&gone);
    }
    removed
}

/// Removes the MaxMonitoredItemsPerCall capability variable.
pub fn remove_max_monitored_items(space: &mut AddressSpace) -> Result<Vec<NodeId>> {
    let id = NodeId::from_str(MAX_MONITORED_ITEMS_PER_CALL)?;
    Ok(remove_nodes(space, vec![id]))
}

/// Removes the MaxNodesPerNodeManagement capability variable.
pub fn remove_max_node_management(space: &mut AddressSpace) -> Result<Vec<NodeId>> {
    let id = NodeId::from_str(MAX_NODES_PER_NODE_MANAGEMENT)?;
    Ok(remove_nodes(space, vec![id]))
}

/// Removes every instantiated Method node, its argument properties and the
/// MaxNodesPerMethodCall capability variable.
///
/// Instantiated Methods are those carrying a `MethodDeclarationId`
/// attribute; the declaration Methods inside the type definitions stay. The
/// argument Variables hang off the removed Methods through forward
/// HasProperty references.
pub fn remove_methods(space: &mut AddressSpace) -> Result<Vec<NodeId>> {
    let mut ids: Vec<NodeId> = Vec::new();
    for node in space.iter() {
        if node.class == NodeClass::Method && node.method_declaration.is_some() {
            ids.push(node.node_id.clone());
            for reference in node.references() {
                if reference.is_forward && matches_ref_type(&reference.ref_type, HAS_PROPERTY) {
                    ids.push(reference.target.clone());
                }
            }
        }
    }
    ids.push(NodeId::from_str(MAX_NODES_PER_METHOD_CALL)?);
    Ok(remove_nodes(space, ids))
}

/// Removes every namespace-0 node with a numeric id greater than `max`.
///
/// This is the crude tail-cut used to shrink the standard address space: the
/// base NS0 document lists nodes roughly by feature recency, so everything
/// above a cutoff belongs to facilities the target server does not serve.
pub fn remove_ids_greater_than(space: &mut AddressSpace, max: u32) -> Vec<NodeId> {
    let ids: Vec<NodeId> = space
        .iter()
        .filter(|n| n.node_id.is_ns0())
        .filter(|n| n.node_id.as_numeric().is_some_and(|v| v > max))
        .map(|n| n.node_id.clone())
        .collect();
    remove_nodes(space, ids)
}
