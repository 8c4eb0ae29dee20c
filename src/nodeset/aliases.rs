use std::collections::HashMap;

/// The alias side-table of a merged address space.
///
/// Maps short alias names (`HasComponent`, `Int32`, ...) to NodeId text.
/// Declaration order is preserved for serialization; lookups go through a
/// hash index. Aliases are immutable once merged: a later document may only
/// add new names or confirm identical bindings, anything else is a merge
/// conflict handled by the caller.
///
/// The table is passed explicitly into every routine that compares a raw
/// reference-type or data-type value against a NodeId, so alias resolution
/// never happens through hidden shared state.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        AliasTable::default()
    }

    /// Resolves an alias to its NodeId text.
    #[must_use]
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.index
            .get(alias)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Resolves a raw type text: alias bindings are followed, anything else
    /// is returned as-is.
    #[must_use]
    pub fn resolve_or_self<'a>(&'a self, text: &'a str) -> &'a str {
        self.resolve(text).unwrap_or(text)
    }

    /// Inserts a binding, overwriting an identical re-declaration.
    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        let alias = alias.into();
        let target = target.into();
        match self.index.get(&alias) {
            Some(&i) => self.entries[i].1 = target,
            None => {
                self.index.insert(alias.clone(), self.entries.len());
                self.entries.push((alias, target));
            }
        }
    }

    /// The bindings in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Alias names that resolve to the given NodeId text.
    pub fn aliases_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(_, t)| t == target)
            .map(|(a, _)| a.as_str())
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no binding is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_and_order() {
        let mut table = AliasTable::new();
        table.insert("HasComponent", "i=47");
        table.insert("Int32", "i=6");
        assert_eq!(table.resolve("HasComponent"), Some("i=47"));
        assert_eq!(table.resolve("Unknown"), None);
        assert_eq!(table.resolve_or_self("Int32"), "i=6");
        assert_eq!(table.resolve_or_self("i=85"), "i=85");
        assert_eq!(table.entries()[0].0, "HasComponent");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_aliases_of() {
        let mut table = AliasTable::new();
        table.insert("HasComponent", "i=47");
        table.insert("Component", "i=47");
        let names: Vec<_> = table.aliases_of("i=47").collect();
        assert_eq!(names, vec!["HasComponent", "Component"]);
    }
}
