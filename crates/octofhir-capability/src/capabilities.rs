//! Shared handle over a loaded catalog.

use std::borrow::Cow;
use std::sync::Arc;

use crate::catalog::CapabilityCatalog;
use crate::chaining::{ChainResolver, DEFAULT_MAX_CHAIN_DEPTH};
use crate::compartment::CompartmentIndex;
use crate::config::CapabilityConfig;
use crate::error::Result;
use crate::loader::{BUNDLED_R4, CatalogDocument, load_document};
use crate::operations::OperationScopeResolver;

/// Cheaply clonable access to one immutable [`CapabilityCatalog`].
///
/// Request handlers clone this and borrow short-lived resolver views from it.
#[derive(Debug, Clone)]
pub struct Capabilities {
    catalog: Arc<CapabilityCatalog>,
    max_chain_depth: usize,
}

impl Capabilities {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self::from_shared(Arc::new(catalog))
    }

    pub fn from_shared(catalog: Arc<CapabilityCatalog>) -> Self {
        Self {
            catalog,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Load the configured catalog asset (or the bundled R4 one) and apply
    /// the configured supported-set overrides.
    pub fn from_config(config: &CapabilityConfig) -> Result<Self> {
        let content = match &config.catalog_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading capability catalog from file");
                Cow::Owned(std::fs::read_to_string(path)?)
            }
            None => Cow::Borrowed(BUNDLED_R4),
        };

        let mut document = CatalogDocument::from_toml_str(&content)?;
        if let Some(types) = &config.supported_resource_types {
            document.supported_resource_types = Some(types.clone());
        }
        if let Some(compartments) = &config.supported_compartments {
            document.supported_compartments = Some(compartments.clone());
        }

        let mut capabilities = Self::new(load_document(document)?);
        capabilities.max_chain_depth = config.max_chain_depth;
        Ok(capabilities)
    }

    /// The bundled R4 catalog with default settings.
    pub fn bundled() -> Result<Self> {
        Self::from_config(&CapabilityConfig::default())
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<CapabilityCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }

    pub fn chain_resolver(&self) -> ChainResolver<'_> {
        ChainResolver::new(&self.catalog).with_max_depth(self.max_chain_depth)
    }

    pub fn compartments(&self) -> CompartmentIndex<'_> {
        CompartmentIndex::new(&self.catalog)
    }

    pub fn operations(&self) -> OperationScopeResolver<'_> {
        OperationScopeResolver::new(&self.catalog)
    }
}
