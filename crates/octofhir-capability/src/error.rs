use thiserror::Error;

/// Errors raised while assembling a capability catalog.
///
/// A catalog is meant to be correct before the first request is served, so
/// every inconsistency in the asset or in builder calls surfaces here instead
/// of at lookup time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate resource type: {0}")]
    DuplicateResourceType(String),

    #[error("Duplicate compartment: {0}")]
    DuplicateCompartment(String),

    #[error("Duplicate global search parameter: {0}")]
    DuplicateGlobalParameter(String),

    #[error("Duplicate search parameter {name} on {resource_type}")]
    DuplicateParameter {
        resource_type: String,
        name: String,
    },

    #[error("Search parameter {name} on {resource_type} is shadowed by a global parameter")]
    ShadowedParameter {
        resource_type: String,
        name: String,
    },

    #[error("Duplicate operation {name} in {scope}")]
    DuplicateOperation { scope: String, name: String },

    #[error("Duplicate compartment rule {compartment}/{resource_type}/{param}")]
    DuplicateCompartmentRule {
        compartment: String,
        resource_type: String,
        param: String,
    },

    #[error("Duplicate everything date criterion for {0}")]
    DuplicateEverythingCriterion(String),

    #[error("Unknown resource type {resource_type} referenced by {context}")]
    UnknownResourceType {
        resource_type: String,
        context: String,
    },

    #[error("Unknown compartment {compartment} referenced by {context}")]
    UnknownCompartment {
        compartment: String,
        context: String,
    },

    #[error("Missing required field '{field}' in {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid canonical URL '{url}' for {context}: {source}")]
    InvalidCanonical {
        url: String,
        context: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid everything date criterion for {resource_type}: {message}")]
    InvalidEverythingCriterion {
        resource_type: String,
        message: String,
    },

    #[error("Catalog asset parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Create a new UnknownResourceType error
    pub fn unknown_resource_type(
        resource_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::UnknownResourceType {
            resource_type: resource_type.into(),
            context: context.into(),
        }
    }

    /// Create a new UnknownCompartment error
    pub fn unknown_compartment(compartment: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownCompartment {
            compartment: compartment.into(),
            context: context.into(),
        }
    }

    /// Create a new MissingField error
    pub fn missing_field(field: &'static str, context: impl Into<String>) -> Self {
        Self::MissingField {
            field,
            context: context.into(),
        }
    }

    /// Create a new InvalidEverythingCriterion error
    pub fn invalid_everything(
        resource_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidEverythingCriterion {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// Check if this error comes from reading or decoding the asset itself
    /// rather than from its content.
    pub fn is_asset_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Io(_))
    }
}

/// Result type for catalog construction
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::unknown_resource_type("Foo", "parameter Foo.name");
        assert_eq!(
            err.to_string(),
            "Unknown resource type Foo referenced by parameter Foo.name"
        );

        let err = CatalogError::missing_field("name", "global parameter #3");
        assert_eq!(
            err.to_string(),
            "Missing required field 'name' in global parameter #3"
        );
    }

    #[test]
    fn test_is_asset_error() {
        let io = CatalogError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert!(io.is_asset_error());
        assert!(!CatalogError::DuplicateResourceType("Patient".into()).is_asset_error());
    }
}
