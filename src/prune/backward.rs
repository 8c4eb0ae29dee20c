//! Stripping of backward reference elements.

use std::collections::HashSet;

use crate::nodeset::consts::HAS_SUBTYPE;
use crate::nodeset::{AddressSpace, NodeId};

/// Deletes every stored backward reference whose type is not retained.
///
/// `retain` entries are NodeId text or aliases; HasSubtype is always
/// retained on top of them, because subtype resolution walks backward links
/// and must survive. Both the retain entries and the stored reference types
/// are alias-resolved before comparison, so retaining `i=47` also retains
/// references written as `HasComponent`.
///
/// Only meaningful on a sanitized graph: each backward element then has a
/// forward counterpart carrying the same information, so dropping it loses
/// nothing.
///
/// Returns the number of deleted reference elements.
pub fn remove_backward_refs(space: &mut AddressSpace, retain: &[String]) -> usize {
    let mut retained: HashSet<String> = retain
        .iter()
        .map(|entry| canonical(space, entry))
        .collect();
    // Both spellings: a document may write HasSubtype without binding the
    // alias, in which case the text stays unresolved.
    retained.insert(HAS_SUBTYPE.0.to_string());
    retained.insert(HAS_SUBTYPE.1.to_string());

    let aliases = space.aliases.clone();
    let mut removed = 0;
    for node in space.iter_mut() {
        let refs = node.references_mut();
        let before = refs.len();
        refs.retain(|r| {
            if r.is_forward {
                return true;
            }
            let resolved = aliases.resolve_or_self(&r.ref_type);
            let text = match resolved.parse::<NodeId>() {
                Ok(id) => id.to_string(),
                Err(_) => resolved.to_string(),
            };
            retained.contains(&text)
        });
        removed += before - refs.len();
    }
    removed
}

fn canonical(space: &AddressSpace, text: &str) -> String {
    let resolved = space.aliases.resolve_or_self(text);
    match resolved.parse::<NodeId>() {
        Ok(id) => id.to_string(),
        Err(_) => resolved.to_string(),
    }
}
