//! Reciprocal reference repair.
//!
//! OPC UA references are semantic triples `(source, type, target)`, stored
//! redundantly: a forward element in the source node and/or a backward
//! element in the target node. Browsing both directions at server runtime is
//! cheap only when both sides are present, so [`sanitize`] computes the
//! complete forward and inverse relations, inserts every missing reciprocal
//! element, and repairs stale `ParentNodeId` attributes.
//!
//! Findings are never fatal: duplicates, references to unknown nodes and
//! dropped parent attributes are accumulated in the [`SanitizeReport`] and
//! repairs proceed best-effort for everything well-formed. The pruning
//! passes ([`crate::prune`]) rely on the postcondition that every stored
//! reference is bidirectionally represented except those whose other end is
//! not in the graph.

use std::collections::HashSet;
use std::fmt;

use crate::nodeset::{AddressSpace, NodeId, Reference};

/// One non-fatal finding of a sanitize run.
///
/// The wording mirrors what the findings mean for the document author:
/// duplicates are redundant lines in the source XML, dangling entries point
/// at nodes outside the merged set, stale parents are advisory attributes
/// with no backing reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeIssue {
    /// The same forward reference element is stored twice in one node.
    DuplicateForward {
        /// Source node
        source: NodeId,
        /// Reference type text
        ref_type: String,
        /// Target node
        target: NodeId,
    },
    /// The same inverse reference element is stored twice in one node.
    DuplicateInverse {
        /// Source node of the logical reference
        source: NodeId,
        /// Reference type text
        ref_type: String,
        /// Target node (the storing node)
        target: NodeId,
    },
    /// An inverse element names a source node that is not in the graph, so
    /// no forward reciprocal can be created.
    DanglingInverse {
        /// The unknown source node
        source: NodeId,
        /// Reference type text
        ref_type: String,
        /// The storing node
        target: NodeId,
    },
    /// A forward element names a target node that is not in the graph, so no
    /// inverse reciprocal can be created.
    DanglingForward {
        /// The storing node
        source: NodeId,
        /// Reference type text
        ref_type: String,
        /// The unknown target node
        target: NodeId,
    },
    /// A node carries `ParentNodeId` but has no References element at all;
    /// the attribute was dropped.
    ParentWithoutReferences {
        /// The child node
        node: NodeId,
    },
    /// A node's `ParentNodeId` is not backed by any inverse reference; the
    /// attribute was dropped.
    StaleParentAttribute {
        /// The child node
        node: NodeId,
        /// The advertised parent
        parent: NodeId,
    },
}

impl fmt::Display for SanitizeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeIssue::DuplicateForward {
                source,
                ref_type,
                target,
            } => write!(
                f,
                "duplicate forward Reference {source} -> {target} (type {ref_type})"
            ),
            SanitizeIssue::DuplicateInverse {
                source,
                ref_type,
                target,
            } => write!(
                f,
                "duplicate inverse Reference {source} <- {target} (type {ref_type})"
            ),
            SanitizeIssue::DanglingInverse {
                source,
                ref_type,
                target,
            } => write!(
                f,
                "inverse Reference from unknown node, cannot add forward reciprocal ({source} -> {target}, type {ref_type})"
            ),
            SanitizeIssue::DanglingForward {
                source,
                ref_type,
                target,
            } => write!(
                f,
                "Reference to unknown node, cannot add inverse reciprocal ({source} -> {target}, type {ref_type})"
            ),
            SanitizeIssue::ParentWithoutReferences { node } => write!(
                f,
                "child Node without references (Node {node} has an attribute ParentNodeId but no reference)"
            ),
            SanitizeIssue::StaleParentAttribute { node, parent } => write!(
                f,
                "child Node without reference to its parent (Node {node}, which parent is {parent})"
            ),
        }
    }
}

/// Outcome of one [`sanitize`] run.
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    /// Non-fatal findings, in discovery order
    pub issues: Vec<SanitizeIssue>,
    /// Forward reciprocal elements inserted
    pub forward_added: usize,
    /// Inverse reciprocal elements inserted
    pub backward_added: usize,
    /// Stale `ParentNodeId` attributes removed
    pub parent_attrs_dropped: usize,
}

impl SanitizeReport {
    /// True when the run found nothing and changed nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
            && self.forward_added == 0
            && self.backward_added == 0
            && self.parent_attrs_dropped == 0
    }
}

/// Repairs reference reciprocity over the whole graph.
///
/// 1. Every stored forward element `(a, type, b)` is recorded into the
///    forward relation; every stored inverse element is recorded into the
///    inverse relation *in forward orientation*. Duplicates are reported.
/// 2. Inverse-only entries get a forward element appended to the source.
/// 3. Forward-only entries get an inverse element appended to the target.
/// 4. `ParentNodeId` attributes not backed by an inverse element are
///    dropped (advisory metadata, not load-bearing).
///
/// Running sanitize twice never inserts on the second run.
pub fn sanitize(space: &mut AddressSpace) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    type Triple = (NodeId, String, NodeId);
    let mut fwd_set: HashSet<Triple> = HashSet::new();
    let mut fwd_list: Vec<Triple> = Vec::new();
    let mut inv_set: HashSet<Triple> = HashSet::new();
    let mut inv_list: Vec<Triple> = Vec::new();

    // The inverse relation is stored in the target node, so recording it in
    // forward orientation swaps the roles of the storing node and the
    // reference text.
    let node_ids: HashSet<NodeId> = space.iter().map(|n| n.node_id.clone()).collect();
    for node in space.iter() {
        let storing = node.node_id.clone();
        for reference in node.references() {
            if reference.is_forward {
                let key = (
                    storing.clone(),
                    reference.ref_type.clone(),
                    reference.target.clone(),
                );
                if fwd_set.contains(&key) {
                    report.issues.push(SanitizeIssue::DuplicateForward {
                        source: key.0,
                        ref_type: key.1,
                        target: key.2,
                    });
                } else {
                    fwd_set.insert(key.clone());
                    fwd_list.push(key);
                }
            } else {
                let source = reference.target.clone();
                if !node_ids.contains(&source) {
                    report.issues.push(SanitizeIssue::DanglingInverse {
                        source,
                        ref_type: reference.ref_type.clone(),
                        target: storing.clone(),
                    });
                    continue;
                }
                let key = (source, reference.ref_type.clone(), storing.clone());
                if inv_set.contains(&key) {
                    report.issues.push(SanitizeIssue::DuplicateInverse {
                        source: key.0,
                        ref_type: key.1,
                        target: key.2,
                    });
                } else {
                    inv_set.insert(key.clone());
                    inv_list.push(key);
                }
            }
        }
    }

    // Forward reciprocals for inverse-only entries.
    for (a, t, b) in &inv_list {
        if fwd_set.contains(&(a.clone(), t.clone(), b.clone())) {
            continue;
        }
        if let Some(source) = space.get_mut(a) {
            if source.add_reference(Reference::forward(t.clone(), b.clone())) {
                report.forward_added += 1;
            }
        }
    }

    // Inverse reciprocals for forward-only entries.
    for (a, t, b) in &fwd_list {
        if inv_set.contains(&(a.clone(), t.clone(), b.clone())) {
            continue;
        }
        match space.get_mut(b) {
            Some(target) => {
                if target.add_reference(Reference::backward(t.clone(), a.clone())) {
                    report.backward_added += 1;
                }
            }
            None => report.issues.push(SanitizeIssue::DanglingForward {
                source: a.clone(),
                ref_type: t.clone(),
                target: b.clone(),
            }),
        }
    }

    // ParentNodeId is advisory: keep it only when an inverse element backs it.
    for id in space.node_ids() {
        let Some(node) = space.get_mut(&id) else {
            continue;
        };
        let Some(parent) = node.parent.clone() else {
            continue;
        };
        let has_references_element = node
            .children
            .iter()
            .any(|c| matches!(c, crate::nodeset::NodeChild::References(_)));
        if !has_references_element {
            report
                .issues
                .push(SanitizeIssue::ParentWithoutReferences { node: id });
            node.parent = None;
            report.parent_attrs_dropped += 1;
            continue;
        }
        let backed = node
            .references()
            .iter()
            .any(|r| !r.is_forward && r.target == parent);
        if !backed {
            report.issues.push(SanitizeIssue::StaleParentAttribute {
                node: id,
                parent,
            });
            node.parent = None;
            report.parent_attrs_dropped += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodeset::{NodeClass, NodeId};
    use crate::test::node;

    fn space_with(nodes: Vec<crate::nodeset::UaNode>) -> AddressSpace {
        let mut space = AddressSpace::new();
        for n in nodes {
            space.insert(n);
        }
        space
    }

    #[test]
    fn test_missing_backward_reciprocal_is_added() {
        let mut root = node(NodeClass::Object, 84);
        root.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 85)));
        let objects = node(NodeClass::Object, 85);
        let mut space = space_with(vec![root, objects]);

        let report = sanitize(&mut space);
        assert_eq!(report.backward_added, 1);
        assert_eq!(report.forward_added, 0);
        let objects = space.get(&NodeId::numeric(0, 85)).unwrap();
        assert!(objects.has_reference(&Reference::backward(
            "Organizes",
            NodeId::numeric(0, 84)
        )));
    }

    #[test]
    fn test_missing_forward_reciprocal_is_added() {
        let parent = node(NodeClass::Object, 1);
        let mut child = node(NodeClass::Object, 2);
        child.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 1)));
        let mut space = space_with(vec![parent, child]);

        let report = sanitize(&mut space);
        assert_eq!(report.forward_added, 1);
        let parent = space.get(&NodeId::numeric(0, 1)).unwrap();
        assert!(parent.has_reference(&Reference::forward(
            "HasComponent",
            NodeId::numeric(0, 2)
        )));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut a = node(NodeClass::Object, 1);
        a.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 2)));
        let mut b = node(NodeClass::Object, 2);
        b.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 1)));
        let mut space = space_with(vec![a, b]);

        let first = sanitize(&mut space);
        assert!(first.forward_added + first.backward_added > 0);
        let snapshot = space.clone();
        let second = sanitize(&mut space);
        assert!(second.is_clean(), "second run must be a no-op: {second:?}");
        // No structural drift either.
        for (before, after) in snapshot.iter().zip(space.iter()) {
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_duplicate_references_reported_not_fatal() {
        let mut a = node(NodeClass::Object, 1);
        // Bypass add_reference dedup to simulate a duplicated source line.
        a.references_mut()
            .push(Reference::forward("Organizes", NodeId::numeric(0, 2)));
        a.references_mut()
            .push(Reference::forward("Organizes", NodeId::numeric(0, 2)));
        let b = node(NodeClass::Object, 2);
        let mut space = space_with(vec![a, b]);

        let report = sanitize(&mut space);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, SanitizeIssue::DuplicateForward { .. })));
        // The reciprocal is still added once.
        assert_eq!(report.backward_added, 1);
    }

    #[test]
    fn test_dangling_references_are_reported_and_skipped() {
        let mut a = node(NodeClass::Object, 1);
        a.add_reference(Reference::forward("Organizes", NodeId::numeric(0, 999)));
        a.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 998)));
        let mut space = space_with(vec![a]);

        let report = sanitize(&mut space);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, SanitizeIssue::DanglingForward { .. })));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, SanitizeIssue::DanglingInverse { .. })));
        assert_eq!(report.forward_added, 0);
        assert_eq!(report.backward_added, 0);
    }

    #[test]
    fn test_stale_parent_attribute_dropped() {
        let mut child = node(NodeClass::Variable, 2);
        child.parent = Some(NodeId::numeric(0, 1));
        child.add_reference(Reference::forward("HasProperty", NodeId::numeric(0, 3)));
        let parent = node(NodeClass::Object, 1);
        let third = node(NodeClass::Variable, 3);
        let mut space = space_with(vec![parent, child, third]);

        let report = sanitize(&mut space);
        // The forward HasProperty to i=3 does not back the parent attribute;
        // only an inverse element to i=1 would.
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, SanitizeIssue::StaleParentAttribute { .. })));
        assert!(space.get(&NodeId::numeric(0, 2)).unwrap().parent.is_none());
    }

    #[test]
    fn test_backed_parent_attribute_survives() {
        let mut child = node(NodeClass::Variable, 2);
        child.parent = Some(NodeId::numeric(0, 1));
        child.add_reference(Reference::backward("HasComponent", NodeId::numeric(0, 1)));
        let parent = node(NodeClass::Object, 1);
        let mut space = space_with(vec![parent, child]);

        sanitize(&mut space);
        assert_eq!(
            space.get(&NodeId::numeric(0, 2)).unwrap().parent,
            Some(NodeId::numeric(0, 1))
        );
    }

    #[test]
    fn test_parent_without_references_element() {
        let mut child = node(NodeClass::Variable, 2);
        child.parent = Some(NodeId::numeric(0, 1));
        let parent = node(NodeClass::Object, 1);
        let mut space = space_with(vec![parent, child]);

        let report = sanitize(&mut space);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, SanitizeIssue::ParentWithoutReferences { .. })));
        assert!(space.get(&NodeId::numeric(0, 2)).unwrap().parent.is_none());
    }
}
