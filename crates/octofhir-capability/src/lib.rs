pub mod capabilities;
pub mod catalog;
pub mod chaining;
pub mod compartment;
pub mod config;
pub mod error;
pub mod loader;
pub mod operations;
pub mod parameters;
pub mod reference;

pub use capabilities::Capabilities;
pub use catalog::{CapabilityCatalog, CatalogBuilder, CatalogStats, EverythingDateCriterion};
pub use chaining::{ChainResolver, KeyResolution, KeySegment, ParameterKey, ResolvedParameter, Unsupported};
pub use compartment::{CompartmentIndex, CompartmentMembershipRule, OWNER_PARAM};
pub use config::CapabilityConfig;
pub use error::{CatalogError, Result};
pub use loader::{bundled_r4, load_catalog_file, load_catalog_str};
pub use operations::{AccessScope, OperationDefinition, OperationScope, OperationScopeResolver};
pub use parameters::{SearchModifier, SearchParameterDefinition, SearchParameterType};
pub use reference::{ParsedReference, UntypedReference, parse_reference};
