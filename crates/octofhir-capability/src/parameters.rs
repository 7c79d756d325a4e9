use serde::{Deserialize, Serialize};
use std::fmt;

/// Target type entries that mean "any resource type".
const WILDCARD_TARGETS: &[&str] = &["*", "Any", "Resource"];

/// Value type carried by a search parameter.
///
/// FHIR search types plus `Period`, which some servers expose for
/// interval-valued criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchParameterType {
    Token,
    String,
    Date,
    Number,
    Quantity,
    Uri,
    Period,
    Reference,
    Composite,
    Special,
}

impl SearchParameterType {
    /// Parse a search parameter type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "token" => Some(Self::Token),
            "string" => Some(Self::String),
            "date" => Some(Self::Date),
            "number" => Some(Self::Number),
            "quantity" => Some(Self::Quantity),
            "uri" => Some(Self::Uri),
            "period" => Some(Self::Period),
            "reference" => Some(Self::Reference),
            "composite" => Some(Self::Composite),
            "special" => Some(Self::Special),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::String => "string",
            Self::Date => "date",
            Self::Number => "number",
            Self::Quantity => "quantity",
            Self::Uri => "uri",
            Self::Period => "period",
            Self::Reference => "reference",
            Self::Composite => "composite",
            Self::Special => "special",
        }
    }

    /// Date-like types usable to time-bound an everything query.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Period)
    }
}

impl fmt::Display for SearchParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search modifiers recognised on the last segment of a key.
/// Applied as suffix to parameter name: `name:modifier`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchModifier {
    Exact,
    Contains,
    Text,
    In,
    NotIn,
    Below,
    Above,
    Not,
    Identifier,   // for reference parameters
    Type(String), // e.g., subject:Patient
    Missing,
    OfType,
    Iterate, // _include:iterate
}

impl SearchModifier {
    /// Parse a search modifier from a string.
    ///
    /// Capitalised qualifiers are read as a resource type (`subject:Patient`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing" => Some(Self::Missing),
            "exact" => Some(Self::Exact),
            "contains" => Some(Self::Contains),
            "not" => Some(Self::Not),
            "text" => Some(Self::Text),
            "in" => Some(Self::In),
            "not-in" => Some(Self::NotIn),
            "below" => Some(Self::Below),
            "above" => Some(Self::Above),
            "identifier" => Some(Self::Identifier),
            "ofType" => Some(Self::OfType),
            "iterate" => Some(Self::Iterate),
            other if other.starts_with(|c: char| c.is_ascii_uppercase()) => {
                Some(Self::Type(other.to_string()))
            }
            _ => None,
        }
    }
}

/// A search parameter definition, either global or local to one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameterDefinition {
    /// The code used in search queries (e.g., "name", "identifier")
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: SearchParameterType,
    /// Canonical URL of the parameter definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Target resource types for reference parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl SearchParameterDefinition {
    pub fn new(name: impl Into<String>, value_type: SearchParameterType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value_type,
            canonical: None,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    #[must_use]
    pub fn with_canonical(mut self, url: impl Into<String>) -> Self {
        self.canonical = Some(url.into());
        self
    }

    /// Set target resource types.
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_reference(&self) -> bool {
        self.value_type == SearchParameterType::Reference
    }

    /// Whether the declared targets accept any resource type.
    pub fn has_wildcard_target(&self) -> bool {
        self.targets
            .iter()
            .any(|t| WILDCARD_TARGETS.contains(&t.as_str()))
    }

    /// The only resource type a reference parameter can point to.
    ///
    /// `None` for non-reference parameters and for references declaring no
    /// target, several targets or a wildcard.
    pub fn single_target(&self) -> Option<&str> {
        if !self.is_reference() || self.has_wildcard_target() {
            return None;
        }
        match self.targets.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}
