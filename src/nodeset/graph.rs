use std::collections::{HashMap, HashSet};

use crate::nodeset::{AliasTable, Model, NodeId, UaNode};

/// The accumulating address-space graph.
///
/// Owns the merged namespace URIs, model declarations, alias table and every
/// node. Nodes live in a slot arena indexed by NodeId: insertion order is
/// preserved for serialization, removal frees a slot without disturbing any
/// other node, and nothing is ever owned through a reference. Deleting a node
/// therefore never implies deleting anything reachable from it; subtree
/// semantics are implemented explicitly by the pruning algorithms.
///
/// # Lifecycle
///
/// Built once through repeated [`crate::merge::merge`] calls (append-only),
/// then mutated in place by the sanitize/prune passes, then handed to
/// [`crate::xml::write_address_space`]. Single writer, no interior
/// mutability.
///
/// # Examples
///
/// ```rust
/// use addrspace::nodeset::{AddressSpace, NodeClass, NodeId, QualifiedName, UaNode};
///
/// let mut space = AddressSpace::new();
/// let root = UaNode::new(
///     NodeClass::Object,
///     NodeId::numeric(0, 84),
///     QualifiedName::new(0, "Root"),
/// );
/// assert!(space.insert(root));
/// assert!(space.contains(&NodeId::numeric(0, 84)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddressSpace {
    /// Merged namespace URIs; global index `i+1` denotes `namespace_uris[i]`
    pub namespace_uris: Vec<String>,
    /// Merged `<Models>` declarations
    pub models: Vec<Model>,
    /// Merged alias table
    pub aliases: AliasTable,
    slots: Vec<Option<UaNode>>,
    index: HashMap<NodeId, usize>,
}

impl AddressSpace {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        AddressSpace::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the graph holds no nodes. A merged base document always
    /// contains nodes, so this doubles as the "not yet initialized" check
    /// for the merger.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True when a node with this id is present.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&UaNode> {
        self.index
            .get(id)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    /// Looks up a node by id, mutably.
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut UaNode> {
        match self.index.get(id) {
            Some(&slot) => self.slots[slot].as_mut(),
            None => None,
        }
    }

    /// Inserts a node, keyed by its NodeId.
    ///
    /// Returns `false` (leaving the graph unchanged) when the id is already
    /// taken; the merger decides what a collision means.
    pub fn insert(&mut self, node: UaNode) -> bool {
        if self.index.contains_key(&node.node_id) {
            return false;
        }
        self.index.insert(node.node_id.clone(), self.slots.len());
        self.slots.push(Some(node));
        true
    }

    /// Removes a node, returning it if it was present.
    pub fn remove(&mut self, id: &NodeId) -> Option<UaNode> {
        let slot = self.index.remove(id)?;
        self.slots[slot].take()
    }

    /// Iterates over live nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &UaNode> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates mutably over live nodes in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut UaNode> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Snapshot of all live NodeIds in insertion order.
    ///
    /// Used by the passes that need to mutate the graph while walking it.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.iter().map(|n| n.node_id.clone()).collect()
    }

    /// Strips every stored Reference element targeting one of the given ids,
    /// anywhere in the graph. Returns the number of removed elements.
    ///
    /// References to unknown nodes can pre-exist in an address space, so
    /// node removal always pairs with this sweep.
    pub fn remove_references_to(&mut self, targets: &HashSet<NodeId>) -> usize {
        let mut removed = 0;
        for node in self.iter_mut() {
            let refs = node.references_mut();
            let before = refs.len();
            refs.retain(|r| !targets.contains(&r.target));
            removed += before - refs.len();
        }
        removed
    }

    /// The NS0 model version established by the base document, if any.
    #[must_use]
    pub fn ns0_version(&self) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.model_uri == crate::nodeset::consts::UA_URI)
            .and_then(|m| m.version.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodeset::{NodeClass, QualifiedName, Reference};

    fn node(id: u32) -> UaNode {
        UaNode::new(
            NodeClass::Object,
            NodeId::numeric(0, id),
            QualifiedName::new(0, format!("N{id}")),
        )
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut space = AddressSpace::new();
        assert!(space.insert(node(1)));
        assert!(space.insert(node(2)));
        assert!(!space.insert(node(1)), "duplicate ids are rejected");
        assert_eq!(space.len(), 2);

        let removed = space.remove(&NodeId::numeric(0, 1)).unwrap();
        assert_eq!(removed.node_id, NodeId::numeric(0, 1));
        assert!(!space.contains(&NodeId::numeric(0, 1)));
        assert_eq!(space.len(), 1);
        assert!(space.remove(&NodeId::numeric(0, 1)).is_none());
    }

    #[test]
    fn test_iteration_preserves_insertion_order_across_removal() {
        let mut space = AddressSpace::new();
        for id in [5, 3, 9, 7] {
            space.insert(node(id));
        }
        space.remove(&NodeId::numeric(0, 3));
        let order: Vec<u32> = space.iter().map(|n| n.node_id.as_numeric().unwrap()).collect();
        assert_eq!(order, vec![5, 9, 7]);
    }

    #[test]
    fn test_remove_references_to() {
        let mut space = AddressSpace::new();
        let mut a = node(1);
        a.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 2)));
        a.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 3)));
        space.insert(a);
        space.insert(node(2));

        let gone: HashSet<NodeId> = [NodeId::numeric(0, 3)].into_iter().collect();
        assert_eq!(space.remove_references_to(&gone), 1);
        let kept = space.get(&NodeId::numeric(0, 1)).unwrap().references();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].target, NodeId::numeric(0, 2));
    }
}
