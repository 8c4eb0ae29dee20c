mod app;

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;

use addrspace::nodeset::NodeSet;
use addrspace::pipeline::{self, PipelineReport};
use addrspace::xml::{read_nodeset, write_address_space};

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics on stderr, the merged document on stdout; --verbose
    // enables debug; RUST_LOG overrides.
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let stdin_inputs = cli
        .inputs
        .iter()
        .filter(|p| p.as_os_str() == "-")
        .count();
    if stdin_inputs > 1 {
        bail!("'-' (stdin) may be given at most once");
    }

    let mut documents = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        documents.push(load_document(path)?);
    }

    let options = cli.pipeline_options();
    let outcome = pipeline::run(documents, &options)?;
    log_report(&outcome.report);

    let xml = write_address_space(&outcome.space)?;
    match &cli.output {
        Some(path) => fs::write(path, xml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout().write_all(xml.as_bytes())?,
    }
    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<NodeSet> {
    let (text, origin) = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        (buffer, "<stdin>".to_string())
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        (text, path.display().to_string())
    };
    let document =
        read_nodeset(&text).with_context(|| format!("failed to parse {origin}"))?;
    log::debug!(
        "parsed {}: {} nodes, {} namespaces, {} aliases",
        origin,
        document.nodes.len(),
        document.namespace_uris.len(),
        document.aliases.len()
    );
    Ok(document)
}

fn log_report(report: &PipelineReport) {
    for (index, stats) in report.merges.iter().enumerate() {
        log::debug!(
            "document {}: +{} nodes, +{} aliases, +{} namespaces, {} singleton references merged",
            index,
            stats.nodes_added,
            stats.aliases_added,
            stats.namespaces_added,
            stats.references_merged
        );
    }
    if !report.filtered.is_empty() {
        log::info!("filters removed {} nodes", report.filtered.len());
    }
    if let Some(sanitize) = &report.sanitize {
        for issue in &sanitize.issues {
            log::warn!("{issue}");
        }
        if sanitize.forward_added + sanitize.backward_added > 0 {
            log::info!(
                "sanitize added {} forward and {} backward reciprocal references",
                sanitize.forward_added,
                sanitize.backward_added
            );
        }
        if sanitize.parent_attrs_dropped > 0 {
            log::info!(
                "sanitize dropped {} stale ParentNodeId attributes",
                sanitize.parent_attrs_dropped
            );
        }
    }
    if !report.removed_subtrees.is_empty() {
        log::info!("subtree removal took out {} nodes", report.removed_subtrees.len());
    }
    if !report.removed_orphans.is_empty() {
        log::info!("orphan collection took out {} nodes", report.removed_orphans.len());
    }
    if !report.removed_unused.is_empty() {
        log::info!("unused-type pruning took out {} nodes", report.removed_unused.len());
    }
    if report.backward_refs_removed > 0 {
        log::info!(
            "stripped {} backward reference elements",
            report.backward_refs_removed
        );
    }
}
