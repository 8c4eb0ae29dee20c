//! Cycle-safe removal of a hierarchical subtree.

use std::collections::HashSet;

use crate::nodeset::consts::is_hierarchical_ref_type;
use crate::nodeset::{AddressSpace, NodeId};

/// Removes `root` and its hierarchical descendants from the graph.
///
/// The graph is a general directed multigraph, so this runs in two phases.
/// Discovery first computes the complete descendant set of `root` along
/// forward hierarchical references, visited-set bounded so cycles terminate.
/// Removal then proceeds breadth-first from the root: a frontier node with a
/// hierarchical parent *outside* the descendant set is retained (it is still
/// reachable from the surviving graph), and retention cascades, because
/// dropping the node from the set turns it into an outside parent for its
/// own children on the next layer. The root itself is always removed. After
/// each layer the marked nodes are deleted and every Reference element
/// targeting them is stripped graph-wide.
///
/// Discovering the full set before any deletion matters: deleting as we walk
/// would make a later-visited outside parent look absent.
///
/// Returns the removed NodeIds in deletion order. A `root` not present in
/// the graph removes nothing.
pub fn remove_subtree(space: &mut AddressSpace, root: &NodeId) -> Vec<NodeId> {
    if !space.contains(root) {
        return Vec::new();
    }

    // Phase 1: full hierarchical descendant set.
    let mut discovered: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![root.clone()];
    while let Some(id) = stack.pop() {
        if !discovered.insert(id.clone()) {
            continue;
        }
        let Some(node) = space.get(&id) else { continue };
        for reference in node.references() {
            if reference.is_forward && is_hierarchical_ref_type(&reference.ref_type) {
                stack.push(reference.target.clone());
            }
        }
    }

    // Phase 2: retention-aware layered removal.
    let mut removed = Vec::new();
    let mut frontier = vec![root.clone()];
    while !frontier.is_empty() {
        let mut marked: Vec<NodeId> = Vec::new();
        let mut next = Vec::new();
        for id in frontier {
            if !discovered.contains(&id) || marked.contains(&id) {
                continue;
            }
            let Some(node) = space.get(&id) else { continue };

            let retained = id != *root
                && node.references().iter().any(|r| {
                    !r.is_forward
                        && is_hierarchical_ref_type(&r.ref_type)
                        && !discovered.contains(&r.target)
                });

            let children: Vec<NodeId> = node
                .references()
                .iter()
                .filter(|r| r.is_forward && is_hierarchical_ref_type(&r.ref_type))
                .map(|r| r.target.clone())
                .collect();

            if retained {
                // Cancels this node's removal; its children re-run the
                // parent check against the shrunken set on the next layer.
                discovered.remove(&id);
            } else {
                marked.push(id);
            }
            next.extend(children.into_iter().filter(|c| discovered.contains(c)));
        }

        let gone: HashSet<NodeId> = marked.iter().cloned().collect();
        for id in &marked {
            space.remove(id);
        }
        space.remove_references_to(&gone);
        removed.extend(marked);
        frontier = next;
    }
    removed
}
