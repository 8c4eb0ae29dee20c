//! Graph reduction passes.
//!
//! Everything here shrinks an already-merged, already-sanitized graph (the
//! targeted id filters are the one pre-sanitize exception).
//! Removal is always paired with a graph-wide sweep of the Reference
//! elements pointing at the removed nodes, so the passes compose without
//! leaving dangling edges:
//!
//! - [`remove_subtree`] takes out one node and its hierarchical descendants,
//!   cycle-safe and retention-aware.
//! - [`remove_orphans`] collects parentless instance nodes.
//! - [`remove_unused`] prunes type nodes nothing uses, to a fixed point.
//! - [`remove_backward_refs`] strips non-retained backward elements.
//!
//! The passes report what they removed; logging is left to the caller.

mod backward;
mod filters;
mod orphans;
mod subtree;
mod unused;

pub use backward::remove_backward_refs;
pub use filters::{
    remove_ids_greater_than, remove_max_monitored_items, remove_max_node_management,
    remove_methods,
};
pub use orphans::remove_orphans;
pub use subtree::remove_subtree;
pub use unused::{remove_unused, UnusedOptions};
