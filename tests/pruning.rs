//! Integration tests for the reduction passes driven through the pipeline.

use addrspace::prelude::*;

/// A small self-contained address space: a hierarchy under Root, one type
/// that is used and one that is not, and an orphaned variable.
const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<UANodeSet xmlns="http://opcfoundation.org/UA/2011/03/UANodeSet.xsd">
  <Models>
    <Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/>
  </Models>
  <Aliases>
    <Alias Alias="Organizes">i=35</Alias>
    <Alias Alias="HasComponent">i=47</Alias>
    <Alias Alias="HasTypeDefinition">i=40</Alias>
  </Aliases>
  <UAObject NodeId="i=84" BrowseName="Root">
    <References>
      <Reference ReferenceType="Organizes">i=85</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=85" BrowseName="Objects">
    <References>
      <Reference ReferenceType="Organizes" IsForward="false">i=84</Reference>
      <Reference ReferenceType="Organizes">i=1000</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=1000" BrowseName="Machine">
    <References>
      <Reference ReferenceType="Organizes" IsForward="false">i=85</Reference>
      <Reference ReferenceType="HasComponent">i=1001</Reference>
      <Reference ReferenceType="HasTypeDefinition">i=2000</Reference>
    </References>
  </UAObject>
  <UAVariable NodeId="i=1001" BrowseName="Speed" DataType="i=3000">
    <References>
      <Reference ReferenceType="HasComponent" IsForward="false">i=1000</Reference>
    </References>
  </UAVariable>
  <UAVariable NodeId="i=1500" BrowseName="Adrift" DataType="i=3001"/>
  <UAObjectType NodeId="i=2000" BrowseName="MachineType"/>
  <UAObjectType NodeId="i=2001" BrowseName="UnusedType"/>
  <UADataType NodeId="i=3000" BrowseName="SpeedType"/>
  <UADataType NodeId="i=3001" BrowseName="UnusedDataType"/>
</UANodeSet>
"#;

fn run_with(options: &PipelineOptions) -> Result<PipelineOutcome> {
    pipeline::run(vec![read_nodeset(DOC)?], options)
}

#[test]
fn test_subtree_removal_takes_descendants() -> Result<()> {
    let options = PipelineOptions {
        remove_subtrees: vec!["i=1000".to_string()],
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    assert!(!outcome.space.contains(&NodeId::numeric(0, 1000)));
    assert!(!outcome.space.contains(&NodeId::numeric(0, 1001)));
    // Objects itself stays, with the edge to the removed child stripped.
    let objects = outcome.space.get(&NodeId::numeric(0, 85)).unwrap();
    assert!(objects
        .references()
        .iter()
        .all(|r| r.target != NodeId::numeric(0, 1000)));
    Ok(())
}

#[test]
fn test_orphan_collection() -> Result<()> {
    let options = PipelineOptions {
        remove_orphans: true,
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    assert!(!outcome.space.contains(&NodeId::numeric(0, 1500)));
    // Root is exempt, parented nodes stay.
    assert!(outcome.space.contains(&NodeId::numeric(0, 84)));
    assert!(outcome.space.contains(&NodeId::numeric(0, 1000)));
    assert_eq!(outcome.report.removed_orphans, vec![NodeId::numeric(0, 1500)]);
    Ok(())
}

#[test]
fn test_unused_type_pruning_cascades() -> Result<()> {
    let options = PipelineOptions {
        remove_orphans: true,
        remove_unused: Some(UnusedOptions::default()),
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    // Used types survive.
    assert!(outcome.space.contains(&NodeId::numeric(0, 2000)));
    assert!(outcome.space.contains(&NodeId::numeric(0, 3000)));
    // Unused ones go. The orphan was the only user of i=3001, and orphan
    // collection runs first, so both fall in one run.
    assert!(!outcome.space.contains(&NodeId::numeric(0, 2001)));
    assert!(!outcome.space.contains(&NodeId::numeric(0, 3001)));
    Ok(())
}

#[test]
fn test_retain_types_protects_unused_types() -> Result<()> {
    let options = PipelineOptions {
        remove_unused: Some(UnusedOptions {
            retain_ns0: false,
            retain_types: vec!["i=2001".to_string(), "i=3001".to_string()],
        }),
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    assert!(outcome.space.contains(&NodeId::numeric(0, 2001)));
    assert!(outcome.space.contains(&NodeId::numeric(0, 3001)));
    Ok(())
}

#[test]
fn test_retain_ns0_protects_everything_here() -> Result<()> {
    let options = PipelineOptions {
        remove_unused: Some(UnusedOptions {
            retain_ns0: true,
            retain_types: Vec::new(),
        }),
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    assert!(outcome.report.removed_unused.is_empty());
    Ok(())
}

#[test]
fn test_backward_reference_strip_keeps_forward_view() -> Result<()> {
    let options = PipelineOptions {
        remove_backward_refs: Some(Vec::new()),
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    assert!(outcome.report.backward_refs_removed > 0);
    for node in outcome.space.iter() {
        for reference in node.references() {
            assert!(
                reference.is_forward,
                "unexpected surviving backward reference on {}",
                node.node_id
            );
        }
    }
    Ok(())
}

#[test]
fn test_combined_reduction_still_serializes() -> Result<()> {
    let options = PipelineOptions {
        remove_orphans: true,
        remove_unused: Some(UnusedOptions::default()),
        remove_backward_refs: Some(vec!["HasComponent".to_string()]),
        ..PipelineOptions::default()
    };
    let outcome = run_with(&options)?;
    let xml = write_address_space(&outcome.space)?;
    let reparsed = read_nodeset(&xml)?;
    assert_eq!(reparsed.nodes.len(), outcome.space.len());
    Ok(())
}
