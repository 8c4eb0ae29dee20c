//! Document merging into the accumulating address space.
//!
//! The first document initializes the graph verbatim and must be the NS0
//! base. Every following document is namespace-reassigned, checked for model
//! and alias conflicts, and appended. Merging is monotone: nothing already in
//! the graph is ever removed or overwritten, the only in-place mutation is
//! the reference union on the fixed NS0 singleton nodes and the maintenance
//! of the NamespaceArray/ServerArray values. Every fatal conflict is
//! detected before the first mutation, so a failed merge leaves the graph
//! exactly as it was.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::merge::NamespaceRemapper;
use crate::nodeset::consts::{NAMESPACE_ARRAY, SERVER_ARRAY, SINGLETON_ALLOW_LIST, UA_URI};
use crate::nodeset::{AddressSpace, Model, NodeId, NodeSet, ValueContent};
use crate::{Error, Result};

/// Counters describing what one merge call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Nodes newly inserted into the graph
    pub nodes_added: usize,
    /// References unioned into already-present singleton nodes
    pub references_merged: usize,
    /// Aliases newly added
    pub aliases_added: usize,
    /// Namespace URIs newly appended
    pub namespaces_added: usize,
}

/// Merges one parsed document into the graph.
///
/// An empty graph is initialized from the document (which must therefore be
/// the NS0 base); otherwise the document is reassigned and merged per the
/// conflict rules. Fatal conflicts abort with the offending ids enumerated
/// and the graph untouched; on success the graph has strictly grown.
///
/// # Errors
///
/// [`Error::UndeclaredNamespace`], [`Error::DuplicateNodeId`],
/// [`Error::MissingNs0Model`], [`Error::ModelVersionConflict`],
/// [`Error::Ns0VersionConflict`], [`Error::AliasConflict`],
/// [`Error::MissingSingletonNode`], [`Error::InvalidServerUri`].
pub fn merge(space: &mut AddressSpace, document: NodeSet) -> Result<MergeStats> {
    validate_declarations(&document)?;
    if space.is_empty() {
        merge_first(space, document)
    } else {
        merge_subsequent(space, document)
    }
}

/// First document: adopted verbatim, no reassignment needed.
fn merge_first(space: &mut AddressSpace, document: NodeSet) -> Result<MergeStats> {
    check_in_document_duplicates(&document)?;

    let mut stats = MergeStats {
        namespaces_added: document.namespace_uris.len(),
        aliases_added: document.aliases.len(),
        ..MergeStats::default()
    };
    space.namespace_uris = document.namespace_uris;
    space.models = document.models;
    for (alias, target) in document.aliases {
        space.aliases.insert(alias, target);
    }
    for node in document.nodes {
        space.insert(node);
        stats.nodes_added += 1;
    }
    // A reduced base document (e.g. a stripped NS0) may omit the array
    // variables; their maintenance only becomes mandatory once a second
    // document is merged in.
    if space.contains(&NodeId::from_str(NAMESPACE_ARRAY.0)?) {
        fill_namespace_array(space)?;
    }
    Ok(stats)
}

fn merge_subsequent(space: &mut AddressSpace, mut document: NodeSet) -> Result<MergeStats> {
    let remapper = NamespaceRemapper::new(&space.namespace_uris, &document.namespace_uris);

    // Conflict stage. Nothing below this comment block mutates the graph
    // until every fatal condition has been ruled out.
    let incoming_models = checked_models(space, &document)?;
    let new_aliases = checked_aliases(space, &document, &remapper)?;

    for node in &mut document.nodes {
        remapper.remap_node(node);
    }
    check_in_document_duplicates(&document)?;

    let offenders: Vec<NodeId> = document
        .nodes
        .iter()
        .filter(|n| space.contains(&n.node_id) && !is_singleton(&n.node_id))
        .map(|n| n.node_id.clone())
        .collect();
    if !offenders.is_empty() {
        return Err(Error::DuplicateNodeId(offenders));
    }

    let namespace_array = NodeId::from_str(NAMESPACE_ARRAY.0)?;
    if !space.contains(&namespace_array) {
        return Err(Error::MissingSingletonNode {
            node_id: NAMESPACE_ARRAY.0,
            browse_name: NAMESPACE_ARRAY.1,
        });
    }
    let server_array = NodeId::from_str(SERVER_ARRAY.0)?;
    if !space.contains(&server_array) {
        return Err(Error::MissingSingletonNode {
            node_id: SERVER_ARRAY.0,
            browse_name: SERVER_ARRAY.1,
        });
    }
    // The local server URI is whatever ends up first in the merged
    // declaration list once the new URIs are appended.
    let local_uri = space
        .namespace_uris
        .first()
        .or_else(|| remapper.appended().first())
        .cloned();
    check_server_uri(space, &server_array, local_uri.as_deref())?;

    // Mutation stage.
    let mut stats = MergeStats {
        namespaces_added: remapper.appended().len(),
        aliases_added: new_aliases.len(),
        ..MergeStats::default()
    };
    space
        .namespace_uris
        .extend(remapper.appended().iter().cloned());
    space.models.extend(incoming_models);
    for (alias, target) in new_aliases {
        space.aliases.insert(alias, target);
    }

    fill_namespace_array(space)?;
    merge_server_array(space, &document, local_uri)?;

    for node in document.nodes {
        if space.contains(&node.node_id) {
            // Allow-listed singleton: union the references.
            let existing = space
                .get_mut(&node.node_id)
                .ok_or_else(|| malformed_error!("Graph index lost node {}", node.node_id))?;
            for reference in node.references() {
                if existing.add_reference(reference.clone()) {
                    stats.references_merged += 1;
                }
            }
        } else {
            space.insert(node);
            stats.nodes_added += 1;
        }
    }
    Ok(stats)
}

fn is_singleton(id: &NodeId) -> bool {
    let text = id.to_string();
    SINGLETON_ALLOW_LIST.contains(&text.as_str())
}

/// Model merge rules: the graph must already carry a versioned NS0 model, a
/// model URI may not reappear with a different version, and an incoming
/// RequiredModel entry naming NS0 must agree on the established version; a
/// requirement without a version counts as disagreement. Returns the
/// genuinely new declarations, mutating nothing.
fn checked_models(space: &AddressSpace, document: &NodeSet) -> Result<Vec<Model>> {
    let ns0_version = space
        .ns0_version()
        .ok_or(Error::MissingNs0Model)?
        .to_string();

    let mut incoming = Vec::new();
    for model in &document.models {
        for required in &model.required {
            if required.model_uri == UA_URI
                && required.version.as_deref() != Some(ns0_version.as_str())
            {
                return Err(Error::Ns0VersionConflict {
                    provided: ns0_version,
                    required: required
                        .version
                        .clone()
                        .unwrap_or_else(|| "unspecified".to_string()),
                });
            }
        }
        match space.models.iter().find(|m| m.model_uri == model.model_uri) {
            Some(existing) => {
                if existing.version != model.version {
                    return Err(Error::ModelVersionConflict {
                        model_uri: model.model_uri.clone(),
                        existing: existing.version.clone().unwrap_or_default(),
                        incoming: model.version.clone().unwrap_or_default(),
                    });
                }
                // Exact redeclaration, nothing to add.
            }
            None => incoming.push(model.clone()),
        }
    }
    Ok(incoming)
}

/// Alias merge rules: new bindings are collected, a rebinding is a conflict.
/// Every conflicting alias of the document is enumerated.
fn checked_aliases(
    space: &AddressSpace,
    document: &NodeSet,
    remapper: &NamespaceRemapper,
) -> Result<Vec<(String, String)>> {
    let mut conflicts = Vec::new();
    let mut fresh = Vec::new();
    for (alias, target) in &document.aliases {
        let target = remapper.remap_nodeid_text(target);
        match space.aliases.resolve(alias) {
            Some(existing) if existing != target => {
                conflicts.push((alias.clone(), existing.to_string(), target));
            }
            Some(_) => {}
            None => fresh.push((alias.clone(), target)),
        }
    }
    if conflicts.is_empty() {
        Ok(fresh)
    } else {
        Err(Error::AliasConflict(conflicts))
    }
}

/// The first ServerArray entry, when one is stored, must name the local
/// server.
fn check_server_uri(space: &AddressSpace, id: &NodeId, local_uri: Option<&str>) -> Result<()> {
    let (Some(local), Some(node)) = (local_uri, space.get(id)) else {
        return Ok(());
    };
    if let Some(ValueContent::Strings(values)) = node.value() {
        if let Some(first) = values.first() {
            if first != local {
                return Err(Error::InvalidServerUri {
                    found: first.clone(),
                    expected: local.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Rebuilds the NamespaceArray (`i=2255`) value as the UA URI followed by
/// every declared namespace URI.
fn fill_namespace_array(space: &mut AddressSpace) -> Result<()> {
    let mut values = vec![UA_URI.to_string()];
    values.extend(space.namespace_uris.iter().cloned());

    let id = NodeId::from_str(NAMESPACE_ARRAY.0)?;
    let node = space
        .get_mut(&id)
        .ok_or(Error::MissingSingletonNode {
            node_id: NAMESPACE_ARRAY.0,
            browse_name: NAMESPACE_ARRAY.1,
        })?;
    node.set_value(ValueContent::Strings(values));
    Ok(())
}

/// Unions the incoming document's ServerArray (`i=2254`) values into the
/// graph's, with the local server URI first.
fn merge_server_array(
    space: &mut AddressSpace,
    document: &NodeSet,
    local_uri: Option<String>,
) -> Result<()> {
    let id = NodeId::from_str(SERVER_ARRAY.0)?;

    let mut incoming: Vec<String> = Vec::new();
    if let Some(local) = &local_uri {
        incoming.push(local.clone());
    }
    if let Some(doc_node) = document.nodes.iter().find(|n| n.node_id == id) {
        if let Some(ValueContent::Strings(values)) = doc_node.value() {
            incoming.extend(values.iter().cloned());
        }
    }

    let node = space.get_mut(&id).ok_or(Error::MissingSingletonNode {
        node_id: SERVER_ARRAY.0,
        browse_name: SERVER_ARRAY.1,
    })?;
    let mut values = match node.value() {
        Some(ValueContent::Strings(values)) => values.clone(),
        _ => Vec::new(),
    };
    let known: HashSet<String> = values.iter().cloned().collect();
    let mut added = HashSet::new();
    for uri in incoming {
        if !known.contains(&uri) && added.insert(uri.clone()) {
            values.push(uri);
        }
    }
    node.set_value(ValueContent::Strings(values));
    Ok(())
}

fn check_in_document_duplicates(document: &NodeSet) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for node in &document.nodes {
        if !seen.insert(&node.node_id) && !duplicates.contains(&node.node_id) {
            duplicates.push(node.node_id.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(Error::DuplicateNodeId(duplicates))
    }
}

/// Verifies that every namespace index used anywhere in the document has a
/// URI declaration. Index `N` requires at least `N` declared URIs; index 0
/// is always valid.
fn validate_declarations(document: &NodeSet) -> Result<()> {
    let declared = document.declared_namespaces();
    let mut seen: HashMap<u16, String> = HashMap::new();

    let mut check = |index: u16, context: &dyn Fn() -> String| {
        if index > declared {
            seen.entry(index).or_insert_with(context);
        }
    };

    for node in &document.nodes {
        let here = || node.node_id.to_string();
        check(node.node_id.namespace, &here);
        check(node.browse_name.namespace, &here);
        if let Some(parent) = &node.parent {
            check(parent.namespace, &here);
        }
        if let Some(declaration) = &node.method_declaration {
            check(declaration.namespace, &here);
        }
        if let Some(data_type) = &node.data_type {
            if let Ok(nid) = NodeId::from_str(data_type) {
                check(nid.namespace, &here);
            }
        }
        for reference in node.references() {
            check(reference.target.namespace, &here);
            if let Ok(nid) = NodeId::from_str(&reference.ref_type) {
                check(nid.namespace, &here);
            }
        }
    }
    for (alias, target) in &document.aliases {
        if let Ok(nid) = NodeId::from_str(target) {
            check(nid.namespace, &|| format!("alias {alias}"));
        }
    }

    if seen.is_empty() {
        Ok(())
    } else {
        let mut entries: Vec<(u16, String)> = seen.into_iter().collect();
        entries.sort();
        Err(Error::UndeclaredNamespace(entries))
    }
}
