//! Integration tests for reciprocal reference repair on parsed documents.

use addrspace::prelude::*;
use addrspace::sanitize::SanitizeIssue;

fn space_from(xml: &str) -> Result<AddressSpace> {
    let mut space = AddressSpace::new();
    merge(&mut space, read_nodeset(xml)?)?;
    Ok(space)
}

#[test]
fn test_one_sided_document_becomes_bidirectional() -> Result<()> {
    // Every reference is stored on one side only.
    let xml = r#"<UANodeSet>
  <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
  <UAObject NodeId="i=84" BrowseName="Root">
    <References>
      <Reference ReferenceType="Organizes">i=85</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=85" BrowseName="Objects">
    <References>
      <Reference ReferenceType="Organizes">i=2253</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=2253" BrowseName="Server"/>
</UANodeSet>"#;
    let mut space = space_from(xml)?;
    let report = sanitize(&mut space);
    assert_eq!(report.backward_added, 2);
    assert_eq!(report.forward_added, 0);

    let objects = space.get(&NodeId::numeric(0, 85)).unwrap();
    assert!(objects.has_reference(&Reference::backward(
        "Organizes",
        NodeId::numeric(0, 84)
    )));
    let server = space.get(&NodeId::numeric(0, 2253)).unwrap();
    assert!(server.has_reference(&Reference::backward(
        "Organizes",
        NodeId::numeric(0, 85)
    )));
    Ok(())
}

#[test]
fn test_sanitize_twice_changes_nothing() -> Result<()> {
    let xml = r#"<UANodeSet>
  <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
  <UAObject NodeId="i=84" BrowseName="Root">
    <References>
      <Reference ReferenceType="Organizes">i=85</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=85" BrowseName="Objects"/>
</UANodeSet>"#;
    let mut space = space_from(xml)?;
    sanitize(&mut space);
    let second = sanitize(&mut space);
    assert!(second.is_clean());
    Ok(())
}

#[test]
fn test_stale_parent_attribute_is_dropped_on_output() -> Result<()> {
    // ParentNodeId points at i=85 but no backward reference backs it.
    let xml = r#"<UANodeSet>
  <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
  <UAObject NodeId="i=85" BrowseName="Objects"/>
  <UAVariable NodeId="i=100" BrowseName="Loose" ParentNodeId="i=85">
    <References>
      <Reference ReferenceType="HasTypeDefinition">i=63</Reference>
    </References>
  </UAVariable>
  <UAVariableType NodeId="i=63" BrowseName="BaseDataVariableType"/>
</UANodeSet>"#;
    let mut space = space_from(xml)?;
    let report = sanitize(&mut space);
    assert_eq!(report.parent_attrs_dropped, 1);
    assert!(report
        .issues
        .iter()
        .any(|i| matches!(i, SanitizeIssue::StaleParentAttribute { .. })));

    let serialized = write_address_space(&space)?;
    assert!(!serialized.contains("ParentNodeId"));
    Ok(())
}

#[test]
fn test_dangling_reference_is_reported_not_repaired() -> Result<()> {
    let xml = r#"<UANodeSet>
  <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
  <UAObject NodeId="i=84" BrowseName="Root">
    <References>
      <Reference ReferenceType="Organizes">i=99999</Reference>
    </References>
  </UAObject>
</UANodeSet>"#;
    let mut space = space_from(xml)?;
    let report = sanitize(&mut space);
    assert_eq!(report.backward_added, 0);
    assert!(report
        .issues
        .iter()
        .any(|i| matches!(i, SanitizeIssue::DanglingForward { .. })));
    // The dangling element itself is left in place.
    let root = space.get(&NodeId::numeric(0, 84)).unwrap();
    assert_eq!(root.references().len(), 1);
    Ok(())
}

#[test]
fn test_pipeline_default_run_sanitizes() -> Result<()> {
    let xml = r#"<UANodeSet>
  <Models><Model ModelUri="http://opcfoundation.org/UA/" Version="1.03"/></Models>
  <UAObject NodeId="i=84" BrowseName="Root">
    <References>
      <Reference ReferenceType="Organizes">i=85</Reference>
    </References>
  </UAObject>
  <UAObject NodeId="i=85" BrowseName="Objects"/>
</UANodeSet>"#;
    let outcome = pipeline::run(vec![read_nodeset(xml)?], &PipelineOptions::default())?;
    let report = outcome.report.sanitize.unwrap();
    assert_eq!(report.backward_added, 1);
    Ok(())
}
