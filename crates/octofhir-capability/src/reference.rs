//! Structural parsing of reference strings.
//!
//! Extracts the resource type from the tail of a reference instead of
//! scanning for type names anywhere in the text:
//! - Relative: `Patient/123`
//! - Versioned: `Patient/123/_history/1`
//! - Absolute URL: `http://example.org/fhir/Patient/123`
//!
//! Contained (`#id`) and URN references carry no resource type.

use std::fmt;

/// The type and id found at the end of a reference string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedReference {
    pub resource_type: String,
    pub id: String,
    /// Version id from a `_history` suffix
    pub version: Option<String>,
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// Why a reference string carries no resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntypedReference {
    /// A contained reference (starts with `#`)
    Contained(String),
    /// A URN reference (`urn:uuid:xxx` or `urn:oid:xxx`)
    Urn(String),
    /// A malformed reference
    Invalid(String),
}

impl fmt::Display for UntypedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained(id) => write!(f, "contained reference: #{id}"),
            Self::Urn(urn) => write!(f, "URN reference: {urn}"),
            Self::Invalid(reason) => write!(f, "invalid reference: {reason}"),
        }
    }
}

impl std::error::Error for UntypedReference {}

/// Parse a reference string into type, id and optional version.
pub fn parse_reference(reference: &str) -> Result<ParsedReference, UntypedReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UntypedReference::Invalid("empty reference".to_string()));
    }

    if let Some(contained_id) = reference.strip_prefix('#') {
        return Err(UntypedReference::Contained(contained_id.to_string()));
    }

    if reference.starts_with("urn:") {
        return Err(UntypedReference::Urn(reference.to_string()));
    }

    // Drop scheme and authority of absolute URLs; the type/id pair is at the end.
    let path = match reference.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => reference,
    };

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    let (resource_type, id, version) = match parts.as_slice() {
        [.., rt, id, "_history", version] => (*rt, *id, Some(version.to_string())),
        [.., rt, id] => (*rt, *id, None),
        _ => {
            return Err(UntypedReference::Invalid(format!(
                "reference must contain at least Type/id: {reference}"
            )));
        }
    };

    if !resource_type
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
    {
        return Err(UntypedReference::Invalid(format!(
            "resource type must start with uppercase letter: {resource_type}"
        )));
    }

    Ok(ParsedReference {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
        version,
    })
}
