//! FHIR compartment membership.
//!
//! A compartment groups resources by their relationship to an owning
//! resource. A resource type joins a compartment through one or more search
//! parameters that point back to the owner, e.g. `Observation` is in the
//! `Patient` compartment via `subject` and `performer`.
//!
//! Two lookups exist on purpose:
//! - [`CompartmentIndex::find_all`] returns every linking parameter, for
//!   queries that must OR over all paths into the compartment
//! - [`CompartmentIndex::find_first`] returns the first declared one, for
//!   callers that need a single representative path

use serde::{Deserialize, Serialize};

use crate::catalog::CapabilityCatalog;

/// Parameter value marking the compartment owner itself.
pub const OWNER_PARAM: &str = "{def}";

/// How a resource type is included in a compartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentMembershipRule {
    /// Compartment type (e.g., "Patient", "Practitioner")
    pub compartment: String,
    pub resource_type: String,
    /// Search parameter that links to the compartment owner
    pub param: String,
}

impl CompartmentMembershipRule {
    pub fn new(
        compartment: impl Into<String>,
        resource_type: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            compartment: compartment.into(),
            resource_type: resource_type.into(),
            param: param.into(),
        }
    }
}

/// Read-only view over the catalog's compartment rules.
#[derive(Debug, Clone, Copy)]
pub struct CompartmentIndex<'a> {
    catalog: &'a CapabilityCatalog,
}

impl<'a> CompartmentIndex<'a> {
    pub fn new(catalog: &'a CapabilityCatalog) -> Self {
        Self { catalog }
    }

    /// Every parameter linking `resource_type` into `compartment`, in
    /// declaration order. Empty when the type is not a member.
    pub fn find_all(&self, compartment: &str, resource_type: &str) -> &'a [String] {
        self.catalog
            .memberships()
            .get(compartment)
            .and_then(|members| members.get(resource_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first declared linking parameter only.
    pub fn find_first(&self, compartment: &str, resource_type: &str) -> Option<&'a str> {
        self.find_all(compartment, resource_type)
            .first()
            .map(String::as_str)
    }

    /// Whether the compartment is known and has at least one rule.
    pub fn is_valid_compartment(&self, compartment: &str) -> bool {
        self.catalog.is_known_compartment(compartment)
            && self.catalog.memberships().contains_key(compartment)
    }

    pub fn is_valid_membership(&self, compartment: &str, resource_type: &str) -> bool {
        !self.find_all(compartment, resource_type).is_empty()
    }

    /// Compartments `resource_type` can belong to, in declaration order.
    pub fn compartments_for(&self, resource_type: &str) -> Vec<&'a str> {
        self.catalog
            .memberships()
            .iter()
            .filter(|(_, members)| members.contains_key(resource_type))
            .map(|(compartment, _)| compartment.as_str())
            .collect()
    }

    /// Resource types that are members of `compartment`.
    pub fn members_of(&self, compartment: &str) -> Vec<&'a str> {
        self.catalog
            .memberships()
            .get(compartment)
            .map(|members| members.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
