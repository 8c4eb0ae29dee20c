use std::path::PathBuf;

use clap::Parser;

use addrspace::pipeline::PipelineOptions;
use addrspace::prune::UnusedOptions;

/// nodeset-merge - merge, repair and reduce OPC UA UANodeSet documents
#[derive(Debug, Parser)]
#[command(name = "nodeset-merge", version, about, long_about = None)]
pub struct Cli {
    /// Input UANodeSet files; the first must contain the NS0 base. '-' reads
    /// from stdin and may be given once.
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write the merged document to this path instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Remove the MaxMonitoredItemsPerCall capability variable.
    #[arg(long)]
    pub remove_max_monitored_items: bool,

    /// Remove instantiated Method nodes, their argument properties and the
    /// MaxNodesPerMethodCall capability variable.
    #[arg(long)]
    pub remove_methods: bool,

    /// Remove the MaxNodesPerNodeManagement capability variable.
    #[arg(long)]
    pub remove_max_node_management: bool,

    /// Remove namespace-0 nodes with a numeric id greater than N.
    #[arg(long, value_name = "N")]
    pub remove_node_ids_greater_than: Option<u32>,

    /// Remove these nodes and their hierarchical subtrees.
    #[arg(long, value_name = "ID", num_args = 1..)]
    pub remove_subtrees: Vec<String>,

    /// Skip reciprocal reference repair. Incompatible with the removal
    /// passes that rely on a sanitized graph.
    #[arg(long)]
    pub no_sanitize: bool,

    /// Remove Object/Variable nodes without a hierarchical parent.
    #[arg(long)]
    pub remove_orphans: bool,

    /// Remove type nodes nothing in the graph uses.
    #[arg(long)]
    pub remove_unused: bool,

    /// With --remove-unused: never remove namespace-0 types.
    #[arg(long, requires = "remove_unused")]
    pub retain_ns0: bool,

    /// With --remove-unused: never remove these types (NodeId or alias).
    #[arg(long, value_name = "ID", num_args = 1.., requires = "remove_unused")]
    pub retain_types: Vec<String>,

    /// Remove backward reference elements (HasSubtype is always kept).
    #[arg(long)]
    pub remove_backward_refs: bool,

    /// With --remove-backward-refs: keep backward references of these types
    /// (NodeId or alias).
    #[arg(long, value_name = "ID|ALIAS", num_args = 1.., requires = "remove_backward_refs")]
    pub retain_nodes: Vec<String>,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Maps the flag surface onto the library's pipeline options.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            remove_max_monitored_items: self.remove_max_monitored_items,
            remove_max_node_management: self.remove_max_node_management,
            remove_methods: self.remove_methods,
            remove_ids_greater_than: self.remove_node_ids_greater_than,
            remove_subtrees: self.remove_subtrees.clone(),
            sanitize: !self.no_sanitize,
            remove_orphans: self.remove_orphans,
            remove_unused: self.remove_unused.then(|| UnusedOptions {
                retain_ns0: self.retain_ns0,
                retain_types: self.retain_types.clone(),
            }),
            remove_backward_refs: self
                .remove_backward_refs
                .then(|| self.retain_nodes.clone()),
        }
    }
}
