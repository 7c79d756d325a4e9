//! End-to-end checks of the bundled R4 catalog through the `Capabilities` facade.

use std::sync::Arc;
use std::thread;

use octofhir_capability::{
    AccessScope, Capabilities, OWNER_PARAM, OperationScope, SearchParameterType,
};

#[test]
fn test_reference_scenarios() {
    let caps = Capabilities::bundled().unwrap();
    let resolver = caps.chain_resolver();
    let operations = caps.operations();
    let compartments = caps.compartments();

    assert_eq!(
        resolver.resolve_value_type(Some("Patient"), "name"),
        Some(SearchParameterType::String)
    );
    assert_eq!(
        resolver.resolve_value_type(Some("Observation"), "encounter.status"),
        Some(SearchParameterType::Token)
    );
    assert_eq!(
        resolver.resolve_value_type(None, "_lastUpdated"),
        Some(SearchParameterType::Date)
    );
    assert_eq!(
        resolver.resolve_value_type(Some("Patient"), "_lastUpdated:exact"),
        None
    );
    assert_eq!(operations.access_scope("Patient", "purge"), AccessScope::Write);
    assert_eq!(
        operations.access_scope("Patient", "everything"),
        AccessScope::Read
    );
    assert_eq!(compartments.find_all("Patient", "Account"), ["subject"]);
}

#[test]
fn test_compartments() {
    let caps = Capabilities::bundled().unwrap();
    let compartments = caps.compartments();

    for name in ["Patient", "Encounter", "RelatedPerson", "Practitioner", "Device"] {
        assert!(compartments.is_valid_compartment(name), "{name}");
        assert_eq!(compartments.find_first(name, name), Some(OWNER_PARAM));
    }
    assert!(!compartments.is_valid_compartment("Organization"));

    assert_eq!(
        compartments.find_all("Patient", "AllergyIntolerance"),
        ["patient", "recorder", "asserter"]
    );
    assert_eq!(
        compartments.find_first("Patient", "AllergyIntolerance"),
        Some("patient")
    );
    assert_eq!(
        compartments.find_all("Practitioner", "Encounter"),
        ["practitioner", "participant"]
    );
    assert!(compartments.is_valid_membership("Encounter", "Observation"));
    assert!(!compartments.is_valid_membership("Encounter", "Patient"));

    let observation = compartments.compartments_for("Observation");
    assert_eq!(
        observation,
        vec!["Patient", "Encounter", "RelatedPerson", "Practitioner", "Device"]
    );
}

#[test]
fn test_compartment_params_are_declared() {
    let caps = Capabilities::bundled().unwrap();
    let catalog = caps.catalog();
    let compartments = caps.compartments();

    // every linking parameter with a local definition must be a reference
    for compartment in catalog.compartments() {
        for member in compartments.members_of(compartment) {
            for param in compartments.find_all(compartment, member) {
                if let Some(def) = catalog.lookup_local(member, param) {
                    assert!(def.is_reference(), "{compartment}/{member}.{param}");
                }
            }
        }
    }
}

#[test]
fn test_operations() {
    let caps = Capabilities::bundled().unwrap();
    let operations = caps.operations();

    assert!(operations.is_supported_operation("Patient", "$everything"));
    assert!(operations.is_supported_operation("Observation", "purge"));
    assert!(!operations.is_supported_operation("Observation", "everything"));
    // external and global-only entries are not offered per resource type
    assert!(!operations.is_supported_operation("Patient", "reindex"));
    assert!(!operations.is_supported_operation("Observation", "convert"));

    assert!(operations.is_supported_global_operation("reindex", None));
    assert!(operations.is_supported_global_operation("$export", None));
    assert!(operations.is_supported_global_operation(
        "export",
        Some("http://hl7.org/fhir/uv/bulkdata/OperationDefinition/export")
    ));
    assert!(!operations.is_supported_global_operation(
        "export",
        Some("http://example.org/OperationDefinition/export")
    ));
    assert!(!operations.is_supported_global_operation("everything", None));

    assert_eq!(operations.access_scope("Claim", "submit"), AccessScope::Write);
    assert_eq!(operations.access_scope("Patient", "meta-add"), AccessScope::Write);
    assert_eq!(operations.access_scope("Patient", "undeclared"), AccessScope::Read);

    let purge = operations.find("Encounter", "purge").unwrap();
    assert_eq!(purge.scope, OperationScope::Mixed);
}

#[test]
fn test_catalog_facts() {
    let caps = Capabilities::bundled().unwrap();
    let catalog = caps.catalog();

    assert!(catalog.is_known_resource_type("OperationOutcome"));
    assert!(!catalog.is_server_supported_resource_type("OperationOutcome"));
    assert!(catalog.is_server_supported_resource_type("Patient"));
    assert!(catalog.is_server_supported_compartment("Device"));

    let criterion = catalog.everything_date_criterion("Observation").unwrap();
    assert_eq!(criterion.date_parameter, "date");
    let account = catalog.everything_date_criterion("Account").unwrap();
    assert_eq!(
        catalog
            .lookup_local("Account", &account.date_parameter)
            .unwrap()
            .value_type,
        SearchParameterType::Period
    );
    assert!(catalog.everything_date_criterion("Organization").is_none());

    assert_eq!(
        catalog.guess_resource_type_from_text("MedicationRequest/123"),
        Some("MedicationRequest")
    );
    assert_eq!(
        catalog.guess_resource_type_from_text("http://example.org/fhir/MedicationStatement/1"),
        Some("MedicationStatement")
    );
    assert_eq!(
        catalog.resource_type_of_reference("https://example.org/fhir/Encounter/e1/_history/2"),
        Some("Encounter")
    );
    assert_eq!(catalog.resource_type_of_reference("urn:uuid:1234"), None);
}

#[test]
fn test_shared_across_threads() {
    let caps = Capabilities::bundled().unwrap();
    let catalog = caps.shared_catalog();

    let handles: Vec<_> = ["Patient", "Observation", "Encounter", "Condition"]
        .into_iter()
        .map(|resource_type| {
            let caps = caps.clone();
            thread::spawn(move || {
                caps.chain_resolver()
                    .resolve_value_type(Some(resource_type), "patient.name")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // Patient has no `patient` parameter of its own
    assert_eq!(
        results,
        vec![
            None,
            Some(SearchParameterType::String),
            Some(SearchParameterType::String),
            Some(SearchParameterType::String),
        ]
    );
    assert!(Arc::strong_count(&catalog) >= 2);
}
