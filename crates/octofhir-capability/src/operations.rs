//! Operation definitions and access scope resolution.
//!
//! Operations are declared either for a single resource type or globally.
//! Global entries carry a scope tag that decides where they are visible:
//!
//! - `external`: server maintenance operations (e.g. `$reindex`), only
//!   reachable at system level
//! - `global`: system-wide operations checked by name only
//! - `mixed`: shared definitions that also answer per-resource-type lookups

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::CapabilityCatalog;

/// Visibility of a globally declared operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationScope {
    External,
    #[default]
    Global,
    Mixed,
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => f.write_str("external"),
            Self::Global => f.write_str("global"),
            Self::Mixed => f.write_str("mixed"),
        }
    }
}

/// Access scope a caller needs to invoke an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    #[default]
    Read,
    Write,
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Definition of an operation (e.g. `$everything`, `$purge`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDefinition {
    /// Operation name without the leading `$`
    pub name: String,

    /// Visibility tag; only meaningful for global operations
    #[serde(default)]
    pub scope: OperationScope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,

    #[serde(default)]
    pub access: AccessScope,
}

impl OperationDefinition {
    /// Create a new operation definition with required fields
    pub fn new(name: impl Into<String>, access: AccessScope) -> Self {
        Self {
            name: normalize_operation_name(&name.into()).to_string(),
            scope: OperationScope::default(),
            canonical: None,
            access,
        }
    }

    /// Set the scope tag
    pub fn with_scope(mut self, scope: OperationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the canonical URL
    pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
        self.canonical = Some(canonical.into());
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == normalize_operation_name(name)
    }
}

/// Strip the `$` operation prefix used on the wire.
pub fn normalize_operation_name(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// Resolves which access scope an operation requires.
#[derive(Debug, Clone, Copy)]
pub struct OperationScopeResolver<'a> {
    catalog: &'a CapabilityCatalog,
}

impl<'a> OperationScopeResolver<'a> {
    pub fn new(catalog: &'a CapabilityCatalog) -> Self {
        Self { catalog }
    }

    /// Find the operation definition answering a per-resource-type lookup.
    ///
    /// Looks at the resource type's own operations first, then at global
    /// operations tagged `mixed`.
    pub fn find(&self, resource_type: &str, operation: &str) -> Option<&'a OperationDefinition> {
        self.catalog
            .operations_for(resource_type)
            .iter()
            .find(|op| op.matches(operation))
            .or_else(|| {
                self.catalog
                    .global_operations()
                    .iter()
                    .find(|op| op.scope == OperationScope::Mixed && op.matches(operation))
            })
    }

    /// Access scope required for `operation` on `resource_type`.
    ///
    /// Unknown operations default to [`AccessScope::Read`].
    pub fn access_scope(&self, resource_type: &str, operation: &str) -> AccessScope {
        match self.find(resource_type, operation) {
            Some(op) => op.access,
            None => {
                tracing::trace!(
                    resource_type = %resource_type,
                    operation = %operation,
                    "Operation not declared, defaulting to read scope"
                );
                AccessScope::Read
            }
        }
    }

    pub fn is_supported_operation(&self, resource_type: &str, operation: &str) -> bool {
        self.find(resource_type, operation).is_some()
    }

    /// Check a system-level operation by name, optionally pinned to a
    /// canonical URL.
    ///
    /// Every global entry counts here, including `external` maintenance
    /// operations.
    pub fn is_supported_global_operation(&self, operation: &str, canonical: Option<&str>) -> bool {
        self.catalog.global_operations().iter().any(|op| {
            op.matches(operation)
                && canonical.is_none_or(|url| op.canonical.as_deref() == Some(url))
        })
    }
}
