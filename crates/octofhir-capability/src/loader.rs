//! Capability catalog loading from a declarative TOML asset.
//!
//! The asset is decoded into a [`CatalogDocument`] and replayed through a
//! [`CatalogBuilder`], so a catalog loaded from disk is validated exactly
//! like one assembled in code.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::catalog::{CapabilityCatalog, CatalogBuilder};
use crate::compartment::CompartmentMembershipRule;
use crate::error::{CatalogError, Result};
use crate::operations::{AccessScope, OperationDefinition, OperationScope};
use crate::parameters::{SearchParameterDefinition, SearchParameterType};

/// Catalog shipped with the crate, covering FHIR R4.
pub const BUNDLED_R4: &str = include_str!("../data/r4.toml");

/// Raw shape of a catalog asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub fhir_version: Option<String>,
    #[serde(default)]
    pub resource_types: Vec<String>,
    #[serde(default)]
    pub supported_resource_types: Option<Vec<String>>,
    #[serde(default)]
    pub compartments: Vec<String>,
    #[serde(default)]
    pub supported_compartments: Option<Vec<String>>,
    #[serde(default)]
    pub global_parameters: Vec<ParameterEntry>,
    /// resource type -> local parameters
    #[serde(default)]
    pub parameters: IndexMap<String, Vec<ParameterEntry>>,
    #[serde(default)]
    pub global_operations: Vec<OperationEntry>,
    #[serde(default)]
    pub operations: IndexMap<String, Vec<OperationEntry>>,
    /// compartment -> resource type -> linking parameters
    #[serde(default)]
    pub compartment_rules: IndexMap<String, IndexMap<String, Vec<String>>>,
    /// resource type -> date parameter
    #[serde(default)]
    pub everything_dates: IndexMap<String, String>,
}

/// One search parameter as written in the asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterEntry {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub value_type: Option<SearchParameterType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub canonical: Option<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// One operation as written in the asset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationEntry {
    pub name: Option<String>,
    #[serde(default)]
    pub scope: Option<OperationScope>,
    #[serde(default)]
    pub access: Option<AccessScope>,
    #[serde(default)]
    pub canonical: Option<String>,
}

impl ParameterEntry {
    fn into_definition(self, context: &str) -> Result<SearchParameterDefinition> {
        let name = self
            .name
            .ok_or_else(|| CatalogError::missing_field("name", context))?;
        let value_type = self
            .value_type
            .ok_or_else(|| CatalogError::missing_field("type", format!("{context} ({name})")))?;

        let mut param = SearchParameterDefinition::new(name, value_type);
        if let Some(description) = self.description {
            param = param.with_description(description);
        }
        if let Some(canonical) = self.canonical {
            param = param.with_canonical(canonical);
        }
        if !self.targets.is_empty() {
            param = param.with_targets(self.targets);
        }
        Ok(param)
    }
}

impl OperationEntry {
    fn into_definition(self, context: &str) -> Result<OperationDefinition> {
        let name = self
            .name
            .ok_or_else(|| CatalogError::missing_field("name", context))?;

        let mut op = OperationDefinition::new(name, self.access.unwrap_or_default());
        if let Some(scope) = self.scope {
            op = op.with_scope(scope);
        }
        if let Some(canonical) = self.canonical {
            op = op.with_canonical(canonical);
        }
        Ok(op)
    }
}

impl CatalogDocument {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Convert the raw document into builder calls.
    pub fn into_builder(self) -> Result<CatalogBuilder> {
        let mut builder = CatalogBuilder::new()
            .resource_types(self.resource_types)
            .compartments(self.compartments);
        if let Some(supported) = self.supported_resource_types {
            builder = builder.supported_resource_types(supported);
        }
        if let Some(supported) = self.supported_compartments {
            builder = builder.supported_compartments(supported);
        }

        for (i, entry) in self.global_parameters.into_iter().enumerate() {
            let context = format!("global parameter #{}", i + 1);
            builder = builder.global_parameter(entry.into_definition(&context)?);
        }

        for (resource_type, entries) in self.parameters {
            tracing::debug!(resource_type = %resource_type, count = entries.len(), "Reading parameters");
            for (i, entry) in entries.into_iter().enumerate() {
                let context = format!("{resource_type} parameter #{}", i + 1);
                builder = builder.parameter(resource_type.clone(), entry.into_definition(&context)?);
            }
        }

        for (i, entry) in self.global_operations.into_iter().enumerate() {
            let context = format!("global operation #{}", i + 1);
            builder = builder.global_operation(entry.into_definition(&context)?);
        }

        for (resource_type, entries) in self.operations {
            for (i, entry) in entries.into_iter().enumerate() {
                let context = format!("{resource_type} operation #{}", i + 1);
                builder = builder.operation(resource_type.clone(), entry.into_definition(&context)?);
            }
        }

        for (compartment, members) in self.compartment_rules {
            for (resource_type, params) in members {
                for param in params {
                    builder = builder.compartment_rule(CompartmentMembershipRule::new(
                        compartment.clone(),
                        resource_type.clone(),
                        param,
                    ));
                }
            }
        }

        for (resource_type, date_parameter) in self.everything_dates {
            builder = builder.everything_date(resource_type, date_parameter);
        }

        Ok(builder)
    }
}

/// Parse and validate a catalog from TOML text.
pub fn load_catalog_str(content: &str) -> Result<CapabilityCatalog> {
    load_document(CatalogDocument::from_toml_str(content)?)
}

/// Validate an already decoded document.
pub fn load_document(document: CatalogDocument) -> Result<CapabilityCatalog> {
    let fhir_version = document.fhir_version.clone();
    let catalog = document.into_builder()?.build()?;

    let stats = catalog.stats();
    tracing::info!(
        fhir_version = fhir_version.as_deref().unwrap_or("unknown"),
        resource_types = stats.resource_types,
        supported = stats.supported_resource_types,
        parameters = stats.parameters + stats.global_parameters,
        operations = stats.operations + stats.global_operations,
        compartments = stats.compartments,
        "Loaded capability catalog"
    );

    Ok(catalog)
}

/// Read a catalog asset from disk.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<CapabilityCatalog> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Reading capability catalog asset");
    let content = std::fs::read_to_string(path)?;
    load_catalog_str(&content)
}

/// The R4 catalog compiled into the crate.
pub fn bundled_r4() -> Result<CapabilityCatalog> {
    load_catalog_str(BUNDLED_R4)
}
