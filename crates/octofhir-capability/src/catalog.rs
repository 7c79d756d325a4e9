//! Capability catalog: the immutable registry of resource types, search
//! parameters, operations and compartments served by one FHIR version.
//!
//! Parameters are indexed by:
//! - Resource type and name (local scope)
//! - Name alone (global scope, applies to every resource type)
//!
//! The catalog is assembled once through [`CatalogBuilder`], which rejects
//! duplicates and dangling references, and is never mutated afterwards.
//! Share it behind an `Arc` and read it from any number of threads.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::compartment::CompartmentMembershipRule;
use crate::error::{CatalogError, Result};
use crate::operations::{OperationDefinition, normalize_operation_name};
use crate::parameters::SearchParameterDefinition;
use crate::reference::parse_reference;

/// Parameter used to time-bound an everything query for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EverythingDateCriterion {
    pub resource_type: String,
    pub date_parameter: String,
}

/// Counts reported once a catalog is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub resource_types: usize,
    pub supported_resource_types: usize,
    pub global_parameters: usize,
    pub parameters: usize,
    pub global_operations: usize,
    pub operations: usize,
    pub compartments: usize,
    pub compartment_rules: usize,
}

/// Immutable registry of server capabilities.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    resource_types: IndexSet<String>,
    supported_resource_types: IndexSet<String>,
    /// Known types ordered most specific first
    types_by_specificity: Vec<String>,
    global_parameters: IndexMap<String, SearchParameterDefinition>,
    /// resource type -> parameter name -> definition
    parameters: IndexMap<String, IndexMap<String, SearchParameterDefinition>>,
    global_operations: Vec<OperationDefinition>,
    operations: IndexMap<String, Vec<OperationDefinition>>,
    compartments: IndexSet<String>,
    supported_compartments: IndexSet<String>,
    /// compartment -> resource type -> linking parameters, in declaration order
    memberships: IndexMap<String, IndexMap<String, Vec<String>>>,
    everything_dates: IndexMap<String, EverythingDateCriterion>,
}

impl CapabilityCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn lookup_global(&self, name: &str) -> Option<&SearchParameterDefinition> {
        self.global_parameters.get(name)
    }

    pub fn lookup_local(&self, resource_type: &str, name: &str) -> Option<&SearchParameterDefinition> {
        self.parameters
            .get(resource_type)
            .and_then(|params| params.get(name))
    }

    /// Look a parameter up the way query keys do: global scope first, then
    /// the resource type's own parameters.
    pub fn lookup(&self, resource_type: Option<&str>, name: &str) -> Option<&SearchParameterDefinition> {
        self.lookup_global(name)
            .or_else(|| resource_type.and_then(|rt| self.lookup_local(rt, name)))
    }

    /// Parameters declared locally on a resource type.
    pub fn parameters_for(&self, resource_type: &str) -> Vec<&SearchParameterDefinition> {
        self.parameters
            .get(resource_type)
            .map(|params| params.values().collect())
            .unwrap_or_default()
    }

    /// Every parameter an indexer has to evaluate for a resource type:
    /// global parameters followed by local ones.
    pub fn all_parameters_for(&self, resource_type: &str) -> Vec<&SearchParameterDefinition> {
        let mut params: Vec<_> = self.global_parameters.values().collect();
        params.extend(self.parameters_for(resource_type));
        params
    }

    pub fn global_parameters(&self) -> impl Iterator<Item = &SearchParameterDefinition> {
        self.global_parameters.values()
    }

    /// Operations declared on a resource type. Mixed global operations are
    /// not merged in; see [`crate::operations::OperationScopeResolver`].
    pub fn operations_for(&self, resource_type: &str) -> &[OperationDefinition] {
        self.operations
            .get(resource_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn global_operations(&self) -> &[OperationDefinition] {
        &self.global_operations
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resource_types.iter().map(String::as_str)
    }

    pub fn supported_resource_types(&self) -> impl Iterator<Item = &str> {
        self.supported_resource_types.iter().map(String::as_str)
    }

    pub fn is_known_resource_type(&self, name: &str) -> bool {
        self.resource_types.contains(name)
    }

    pub fn is_server_supported_resource_type(&self, name: &str) -> bool {
        self.supported_resource_types.contains(name)
    }

    pub fn compartments(&self) -> impl Iterator<Item = &str> {
        self.compartments.iter().map(String::as_str)
    }

    pub fn is_known_compartment(&self, name: &str) -> bool {
        self.compartments.contains(name)
    }

    pub fn is_server_supported_compartment(&self, name: &str) -> bool {
        self.supported_compartments.contains(name)
    }

    pub(crate) fn memberships(&self) -> &IndexMap<String, IndexMap<String, Vec<String>>> {
        &self.memberships
    }

    pub fn everything_date_criterion(&self, resource_type: &str) -> Option<&EverythingDateCriterion> {
        self.everything_dates.get(resource_type)
    }

    /// Find the first known resource type name occurring anywhere in `text`.
    ///
    /// Names are tried most specific first, so `MedicationRequest/1` yields
    /// `MedicationRequest` rather than `Medication`. Any text merely containing
    /// a type name matches; prefer [`Self::resource_type_of_reference`] for
    /// reference strings.
    pub fn guess_resource_type_from_text(&self, text: &str) -> Option<&str> {
        self.types_by_specificity
            .iter()
            .find(|name| text.contains(name.as_str()))
            .map(String::as_str)
    }

    /// Resource type of a `Type/id` reference, if the type is known.
    pub fn resource_type_of_reference(&self, reference: &str) -> Option<&str> {
        let parsed = parse_reference(reference).ok()?;
        self.resource_types
            .get(parsed.resource_type.as_str())
            .map(String::as_str)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            resource_types: self.resource_types.len(),
            supported_resource_types: self.supported_resource_types.len(),
            global_parameters: self.global_parameters.len(),
            parameters: self.parameters.values().map(IndexMap::len).sum(),
            global_operations: self.global_operations.len(),
            operations: self.operations.values().map(Vec::len).sum(),
            compartments: self.compartments.len(),
            compartment_rules: self
                .memberships
                .values()
                .flat_map(IndexMap::values)
                .map(Vec::len)
                .sum(),
        }
    }
}

/// Collects catalog entries and validates them in [`CatalogBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    resource_types: Vec<String>,
    supported_resource_types: Option<Vec<String>>,
    compartments: Vec<String>,
    supported_compartments: Option<Vec<String>>,
    global_parameters: Vec<SearchParameterDefinition>,
    parameters: Vec<(String, SearchParameterDefinition)>,
    global_operations: Vec<OperationDefinition>,
    operations: Vec<(String, OperationDefinition)>,
    compartment_rules: Vec<CompartmentMembershipRule>,
    everything_dates: Vec<EverythingDateCriterion>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add names to the universe of known resource types.
    #[must_use]
    pub fn resource_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Restrict the server-supported subset. Defaults to every known type.
    #[must_use]
    pub fn supported_resource_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_resource_types = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn compartments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compartments.extend(names.into_iter().map(Into::into));
        self
    }

    /// Restrict the server-supported compartments. Defaults to every known one.
    #[must_use]
    pub fn supported_compartments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_compartments = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn global_parameter(mut self, param: SearchParameterDefinition) -> Self {
        self.global_parameters.push(param);
        self
    }

    #[must_use]
    pub fn parameter(mut self, resource_type: impl Into<String>, param: SearchParameterDefinition) -> Self {
        self.parameters.push((resource_type.into(), param));
        self
    }

    #[must_use]
    pub fn global_operation(mut self, op: OperationDefinition) -> Self {
        self.global_operations.push(op);
        self
    }

    #[must_use]
    pub fn operation(mut self, resource_type: impl Into<String>, op: OperationDefinition) -> Self {
        self.operations.push((resource_type.into(), op));
        self
    }

    #[must_use]
    pub fn compartment_rule(mut self, rule: CompartmentMembershipRule) -> Self {
        self.compartment_rules.push(rule);
        self
    }

    #[must_use]
    pub fn everything_date(
        mut self,
        resource_type: impl Into<String>,
        date_parameter: impl Into<String>,
    ) -> Self {
        self.everything_dates.push(EverythingDateCriterion {
            resource_type: resource_type.into(),
            date_parameter: date_parameter.into(),
        });
        self
    }

    /// Validate every entry and freeze the catalog.
    pub fn build(self) -> Result<CapabilityCatalog> {
        let mut catalog = CapabilityCatalog::default();

        for name in self.resource_types {
            require_non_empty(&name, "name", "resource type list")?;
            if !catalog.resource_types.insert(name.clone()) {
                return Err(CatalogError::DuplicateResourceType(name));
            }
        }

        catalog.supported_resource_types = match self.supported_resource_types {
            Some(names) => {
                let mut supported = IndexSet::with_capacity(names.len());
                for name in names {
                    if !catalog.resource_types.contains(&name) {
                        return Err(CatalogError::unknown_resource_type(
                            name,
                            "supported resource types",
                        ));
                    }
                    supported.insert(name);
                }
                supported
            }
            None => catalog.resource_types.clone(),
        };

        // A name containing another one is strictly longer, so ordering by
        // length puts the more specific name first.
        let mut by_specificity: Vec<String> = catalog.resource_types.iter().cloned().collect();
        by_specificity.sort_by(|a, b| b.len().cmp(&a.len()));
        catalog.types_by_specificity = by_specificity;

        for name in self.compartments {
            require_non_empty(&name, "name", "compartment list")?;
            if !catalog.compartments.insert(name.clone()) {
                return Err(CatalogError::DuplicateCompartment(name));
            }
        }

        catalog.supported_compartments = match self.supported_compartments {
            Some(names) => {
                let mut supported = IndexSet::with_capacity(names.len());
                for name in names {
                    if !catalog.compartments.contains(&name) {
                        return Err(CatalogError::unknown_compartment(
                            name,
                            "supported compartments",
                        ));
                    }
                    supported.insert(name);
                }
                supported
            }
            None => catalog.compartments.clone(),
        };

        for param in self.global_parameters {
            let context = format!("global parameter {}", param.name);
            require_non_empty(&param.name, "name", &context)?;
            check_parameter(&catalog, &param, &context)?;
            if catalog.global_parameters.contains_key(&param.name) {
                return Err(CatalogError::DuplicateGlobalParameter(param.name));
            }
            catalog.global_parameters.insert(param.name.clone(), param);
        }

        for (resource_type, param) in self.parameters {
            let context = format!("parameter {resource_type}.{}", param.name);
            require_non_empty(&param.name, "name", &context)?;
            require_known_type(&catalog, &resource_type, &context)?;
            check_parameter(&catalog, &param, &context)?;
            if catalog.global_parameters.contains_key(&param.name) {
                return Err(CatalogError::ShadowedParameter {
                    resource_type,
                    name: param.name,
                });
            }
            let local = catalog.parameters.entry(resource_type.clone()).or_default();
            if local.contains_key(&param.name) {
                return Err(CatalogError::DuplicateParameter {
                    resource_type,
                    name: param.name,
                });
            }
            local.insert(param.name.clone(), param);
        }

        for op in self.global_operations {
            let context = format!("global operation {}", op.name);
            let op = check_operation(op, &context)?;
            if catalog.global_operations.iter().any(|o| o.name == op.name) {
                return Err(CatalogError::DuplicateOperation {
                    scope: "global operations".to_string(),
                    name: op.name,
                });
            }
            catalog.global_operations.push(op);
        }

        for (resource_type, op) in self.operations {
            let context = format!("operation {resource_type}/${}", op.name);
            require_known_type(&catalog, &resource_type, &context)?;
            let op = check_operation(op, &context)?;
            let local = catalog.operations.entry(resource_type.clone()).or_default();
            if local.iter().any(|o| o.name == op.name) {
                return Err(CatalogError::DuplicateOperation {
                    scope: resource_type,
                    name: op.name,
                });
            }
            local.push(op);
        }

        for rule in self.compartment_rules {
            let context = format!(
                "compartment rule {}/{}",
                rule.compartment, rule.resource_type
            );
            require_non_empty(&rule.param, "param", &context)?;
            if !catalog.compartments.contains(&rule.compartment) {
                return Err(CatalogError::unknown_compartment(rule.compartment, context));
            }
            require_known_type(&catalog, &rule.resource_type, &context)?;
            let params = catalog
                .memberships
                .entry(rule.compartment.clone())
                .or_default()
                .entry(rule.resource_type.clone())
                .or_default();
            if params.contains(&rule.param) {
                return Err(CatalogError::DuplicateCompartmentRule {
                    compartment: rule.compartment,
                    resource_type: rule.resource_type,
                    param: rule.param,
                });
            }
            params.push(rule.param);
        }

        for criterion in self.everything_dates {
            let context = format!("everything date criterion for {}", criterion.resource_type);
            require_known_type(&catalog, &criterion.resource_type, &context)?;
            require_non_empty(&criterion.date_parameter, "date_parameter", &context)?;
            let param = catalog
                .lookup(Some(criterion.resource_type.as_str()), &criterion.date_parameter)
                .ok_or_else(|| {
                    CatalogError::invalid_everything(
                        &criterion.resource_type,
                        format!("unknown parameter '{}'", criterion.date_parameter),
                    )
                })?;
            if !param.value_type.is_temporal() {
                return Err(CatalogError::invalid_everything(
                    &criterion.resource_type,
                    format!(
                        "parameter '{}' is {}, not a date",
                        criterion.date_parameter, param.value_type
                    ),
                ));
            }
            if !catalog.supported_resource_types.contains(&criterion.resource_type) {
                tracing::warn!(
                    resource_type = %criterion.resource_type,
                    "Everything date criterion declared for an unsupported resource type"
                );
            }
            if catalog.everything_dates.contains_key(&criterion.resource_type) {
                return Err(CatalogError::DuplicateEverythingCriterion(
                    criterion.resource_type,
                ));
            }
            catalog
                .everything_dates
                .insert(criterion.resource_type.clone(), criterion);
        }

        let stats = catalog.stats();
        tracing::debug!(
            resource_types = stats.resource_types,
            supported = stats.supported_resource_types,
            global_parameters = stats.global_parameters,
            parameters = stats.parameters,
            operations = stats.operations + stats.global_operations,
            compartment_rules = stats.compartment_rules,
            "Built capability catalog"
        );

        Ok(catalog)
    }
}

fn require_non_empty(value: &str, field: &'static str, context: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::missing_field(field, context));
    }
    Ok(())
}

fn require_known_type(catalog: &CapabilityCatalog, resource_type: &str, context: &str) -> Result<()> {
    require_non_empty(resource_type, "resource_type", context)?;
    if !catalog.is_known_resource_type(resource_type) {
        return Err(CatalogError::unknown_resource_type(resource_type, context));
    }
    Ok(())
}

fn check_canonical(url: Option<&str>, context: &str) -> Result<()> {
    if let Some(url) = url {
        url::Url::parse(url).map_err(|source| CatalogError::InvalidCanonical {
            url: url.to_string(),
            context: context.to_string(),
            source,
        })?;
    }
    Ok(())
}

fn check_parameter(
    catalog: &CapabilityCatalog,
    param: &SearchParameterDefinition,
    context: &str,
) -> Result<()> {
    check_canonical(param.canonical.as_deref(), context)?;
    if param.is_reference() && !param.has_wildcard_target() {
        for target in &param.targets {
            require_known_type(catalog, target, context)?;
        }
    }
    Ok(())
}

fn check_operation(mut op: OperationDefinition, context: &str) -> Result<OperationDefinition> {
    op.name = normalize_operation_name(&op.name).to_string();
    require_non_empty(&op.name, "name", context)?;
    check_canonical(op.canonical.as_deref(), context)?;
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::AccessScope;
    use crate::parameters::SearchParameterType;

    fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
            .resource_types(["Patient", "Observation", "Medication", "MedicationRequest"])
            .global_parameter(
                SearchParameterDefinition::new("_id", SearchParameterType::Token)
                    .with_canonical("http://hl7.org/fhir/SearchParameter/Resource-id"),
            )
            .parameter(
                "Patient",
                SearchParameterDefinition::new("name", SearchParameterType::String)
                    .with_description("A portion of either family or given name"),
            )
            .parameter(
                "Patient",
                SearchParameterDefinition::new("birthdate", SearchParameterType::Date),
            )
            .parameter(
                "Observation",
                SearchParameterDefinition::new("subject", SearchParameterType::Reference)
                    .with_targets(["Patient"]),
            )
    }

    #[test]
    fn test_lookup_global_then_local() {
        let catalog = builder().build().unwrap();

        assert!(catalog.lookup_global("_id").is_some());
        assert!(catalog.lookup_global("name").is_none());
        assert_eq!(
            catalog.lookup_local("Patient", "name").unwrap().value_type,
            SearchParameterType::String
        );
        assert!(catalog.lookup_local("Observation", "name").is_none());

        assert!(catalog.lookup(None, "_id").is_some());
        assert!(catalog.lookup(None, "name").is_none());
        assert!(catalog.lookup(Some("Patient"), "name").is_some());
    }

    #[test]
    fn test_parameters_for() {
        let catalog = builder().build().unwrap();

        let names: Vec<_> = catalog
            .parameters_for("Patient")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "birthdate"]);
        assert!(catalog.parameters_for("Medication").is_empty());

        let all: Vec<_> = catalog
            .all_parameters_for("Patient")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(all, vec!["_id", "name", "birthdate"]);
    }

    #[test]
    fn test_supported_subset() {
        let catalog = builder()
            .supported_resource_types(["Patient"])
            .build()
            .unwrap();

        assert!(catalog.is_known_resource_type("Observation"));
        assert!(!catalog.is_server_supported_resource_type("Observation"));
        assert!(catalog.is_server_supported_resource_type("Patient"));
        assert!(!catalog.is_known_resource_type("Unicorn"));

        let err = builder()
            .supported_resource_types(["Unicorn"])
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownResourceType { .. }));
    }

    #[test]
    fn test_duplicates_fail_fast() {
        let err = builder()
            .resource_types(["Patient"])
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateResourceType(ref n) if n == "Patient"));

        let err = builder()
            .parameter(
                "Patient",
                SearchParameterDefinition::new("name", SearchParameterType::Token),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateParameter { .. }));

        let err = builder()
            .global_parameter(SearchParameterDefinition::new(
                "_id",
                SearchParameterType::Token,
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateGlobalParameter(_)));

        let err = builder()
            .parameter(
                "Observation",
                SearchParameterDefinition::new("_id", SearchParameterType::Token),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::ShadowedParameter { .. }));

        let err = builder()
            .operation(
                "Patient",
                OperationDefinition::new("everything", AccessScope::Read),
            )
            .operation(
                "Patient",
                OperationDefinition::new("$everything", AccessScope::Read),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateOperation { .. }));
    }

    #[test]
    fn test_unknown_references_fail_fast() {
        let err = builder()
            .parameter(
                "Unicorn",
                SearchParameterDefinition::new("horn", SearchParameterType::Token),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownResourceType { .. }));

        let err = builder()
            .parameter(
                "Observation",
                SearchParameterDefinition::new("focus", SearchParameterType::Reference)
                    .with_targets(["Unicorn"]),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownResourceType { .. }));

        // wildcard targets are not checked against the universe
        assert!(
            builder()
                .parameter(
                    "Observation",
                    SearchParameterDefinition::new("focus", SearchParameterType::Reference)
                        .with_targets(["Any"]),
                )
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_missing_fields_and_bad_canonical() {
        let err = builder()
            .parameter(
                "Patient",
                SearchParameterDefinition::new("", SearchParameterType::Token),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "name", .. }));

        let err = builder()
            .global_parameter(
                SearchParameterDefinition::new("_source", SearchParameterType::Uri)
                    .with_canonical("not a url"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCanonical { .. }));
    }

    #[test]
    fn test_everything_date_criterion() {
        let catalog = builder()
            .everything_date("Patient", "birthdate")
            .build()
            .unwrap();
        let criterion = catalog.everything_date_criterion("Patient").unwrap();
        assert_eq!(criterion.date_parameter, "birthdate");
        assert!(catalog.everything_date_criterion("Observation").is_none());

        let err = builder()
            .everything_date("Patient", "name")
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEverythingCriterion { .. }));

        let err = builder()
            .everything_date("Observation", "date")
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEverythingCriterion { .. }));
    }

    #[test]
    fn test_guess_resource_type_prefers_specific_names() {
        let catalog = builder().build().unwrap();

        assert_eq!(
            catalog.guess_resource_type_from_text("MedicationRequest/42"),
            Some("MedicationRequest")
        );
        assert_eq!(
            catalog.guess_resource_type_from_text("http://x/Medication/1"),
            Some("Medication")
        );
        assert_eq!(catalog.guess_resource_type_from_text("Device/1"), None);
        // heuristic: any mention matches
        assert_eq!(
            catalog.guess_resource_type_from_text("not a Patient reference"),
            Some("Patient")
        );
    }

    #[test]
    fn test_resource_type_of_reference() {
        let catalog = builder().build().unwrap();

        assert_eq!(
            catalog.resource_type_of_reference("MedicationRequest/42"),
            Some("MedicationRequest")
        );
        assert_eq!(
            catalog.resource_type_of_reference("http://example.org/fhir/Patient/1/_history/2"),
            Some("Patient")
        );
        assert_eq!(catalog.resource_type_of_reference("not a Patient reference"), None);
        assert_eq!(catalog.resource_type_of_reference("Device/1"), None);
    }

    #[test]
    fn test_stats() {
        let catalog = builder()
            .global_operation(OperationDefinition::new("purge", AccessScope::Write))
            .build()
            .unwrap();
        let stats = catalog.stats();
        assert_eq!(stats.resource_types, 4);
        assert_eq!(stats.supported_resource_types, 4);
        assert_eq!(stats.global_parameters, 1);
        assert_eq!(stats.parameters, 3);
        assert_eq!(stats.global_operations, 1);
        assert_eq!(stats.operations, 0);
    }
}
