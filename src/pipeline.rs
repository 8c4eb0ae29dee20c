//! The batch transformation pipeline.
//!
//! One call to [`run`] owns the whole life of an address space: merge the
//! parsed documents in order, apply the targeted filters, sanitize, then run
//! the requested pruning passes. Single-threaded and deterministic; the
//! graph never leaves this function half-transformed, an error drops it.

use std::str::FromStr;

use crate::merge::{merge, MergeStats};
use crate::nodeset::{AddressSpace, NodeId, NodeSet};
use crate::prune::{
    remove_backward_refs, remove_ids_greater_than, remove_max_monitored_items,
    remove_max_node_management, remove_methods, remove_orphans, remove_subtree, remove_unused,
    UnusedOptions,
};
use crate::sanitize::{sanitize, SanitizeReport};
use crate::{Error, Result};

/// Everything one pipeline invocation is asked to do beyond merging.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Drop the MaxMonitoredItemsPerCall capability variable
    pub remove_max_monitored_items: bool,
    /// Drop the MaxNodesPerNodeManagement capability variable
    pub remove_max_node_management: bool,
    /// Drop instantiated Methods, their arguments and MaxNodesPerMethodCall
    pub remove_methods: bool,
    /// Drop namespace-0 nodes with numeric ids above the cutoff
    pub remove_ids_greater_than: Option<u32>,
    /// Subtree roots to remove, as NodeId text
    pub remove_subtrees: Vec<String>,
    /// Run reciprocal reference repair (on by default)
    pub sanitize: bool,
    /// Collect parentless instance nodes
    pub remove_orphans: bool,
    /// Prune unused type nodes with these retention knobs
    pub remove_unused: Option<UnusedOptions>,
    /// Strip backward references, retaining these types (plus HasSubtype)
    pub remove_backward_refs: Option<Vec<String>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            remove_max_monitored_items: false,
            remove_max_node_management: false,
            remove_methods: false,
            remove_ids_greater_than: None,
            remove_subtrees: Vec::new(),
            sanitize: true,
            remove_orphans: false,
            remove_unused: None,
            remove_backward_refs: None,
        }
    }
}

impl PipelineOptions {
    /// True when a requested pass depends on reciprocal repair.
    #[must_use]
    pub fn needs_sanitize(&self) -> bool {
        !self.remove_subtrees.is_empty()
            || self.remove_orphans
            || self.remove_unused.is_some()
            || self.remove_backward_refs.is_some()
    }

    /// Rejects contradictory option sets before any work happens.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when sanitization is disabled but a pass requiring
    /// it was requested, or when a subtree root does not parse as a NodeId.
    pub fn validate(&self) -> Result<()> {
        if !self.sanitize && self.needs_sanitize() {
            return Err(Error::Config(
                "sanitization cannot be disabled together with \
                 subtree/orphan/unused/backward-reference removal"
                    .to_string(),
            ));
        }
        for root in &self.remove_subtrees {
            NodeId::from_str(root)
                .map_err(|_| Error::Config(format!("invalid subtree root NodeId '{root}'")))?;
        }
        Ok(())
    }
}

/// What the pipeline did, for logging and exit diagnostics.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Per-document merge counters, in input order
    pub merges: Vec<MergeStats>,
    /// Nodes removed by the targeted filters
    pub filtered: Vec<NodeId>,
    /// Findings of the sanitize pass, when it ran
    pub sanitize: Option<SanitizeReport>,
    /// Nodes removed by explicit subtree removal
    pub removed_subtrees: Vec<NodeId>,
    /// Nodes removed by the orphan collector
    pub removed_orphans: Vec<NodeId>,
    /// Nodes removed by the unused-type pruner
    pub removed_unused: Vec<NodeId>,
    /// Backward reference elements stripped
    pub backward_refs_removed: usize,
}

/// The finished graph plus its transformation report.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The merged and reduced address space
    pub space: AddressSpace,
    /// Counters and findings of every pass that ran
    pub report: PipelineReport,
}

/// Runs the full pipeline over parsed documents, first document first.
///
/// Pass order is fixed: merge, targeted filters, sanitize, explicit
/// subtrees, orphans, unused types, backward references. The filters run
/// before sanitization on purpose (they remove by id, and sanitizing after
/// them repairs whatever they unbalanced); everything from subtree removal
/// on requires the sanitized graph.
///
/// # Errors
///
/// Configuration errors from [`PipelineOptions::validate`], merge conflicts
/// from [`crate::merge::merge`].
pub fn run(documents: Vec<NodeSet>, options: &PipelineOptions) -> Result<PipelineOutcome> {
    options.validate()?;
    if documents.is_empty() {
        return Err(Error::Config("no input documents given".to_string()));
    }

    let mut space = AddressSpace::new();
    let mut report = PipelineReport::default();
    for document in documents {
        report.merges.push(merge(&mut space, document)?);
    }

    if options.remove_max_monitored_items {
        report
            .filtered
            .extend(remove_max_monitored_items(&mut space)?);
    }
    if options.remove_max_node_management {
        report
            .filtered
            .extend(remove_max_node_management(&mut space)?);
    }
    if options.remove_methods {
        report.filtered.extend(remove_methods(&mut space)?);
    }
    if let Some(max) = options.remove_ids_greater_than {
        report.filtered.extend(remove_ids_greater_than(&mut space, max));
    }

    if options.sanitize {
        report.sanitize = Some(sanitize(&mut space));
    }

    for root in &options.remove_subtrees {
        let root = NodeId::from_str(root)?;
        report.removed_subtrees.extend(remove_subtree(&mut space, &root));
    }
    if options.remove_orphans {
        report.removed_orphans = remove_orphans(&mut space);
    }
    if let Some(unused) = &options.remove_unused {
        report.removed_unused = remove_unused(&mut space, unused);
    }
    if let Some(retain) = &options.remove_backward_refs {
        report.backward_refs_removed = remove_backward_refs(&mut space, retain);
    }

    Ok(PipelineOutcome { space, report })
}
