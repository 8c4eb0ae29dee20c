//! Merging of UANodeSet documents into one address space.
//!
//! Two cooperating pieces: the [`NamespaceRemapper`] translates an incoming
//! document's local namespace indices into the graph's global ones, and
//! [`merge`] folds the document in under the conflict rules (model versions,
//! aliases, duplicate NodeIds, singleton reference union).
//!
//! Merging is append-only. Anything that would require overwriting existing
//! content is a fatal [`crate::Error`] enumerating the offenders.

mod merger;
mod reassign;

pub use merger::{merge, MergeStats};
pub use reassign::NamespaceRemapper;
