//! Parsing and resolution of search parameter keys, including chains.
//!
//! A key is one or more `.`-separated segments, each `name[:qualifier]`:
//! - `name`, `name:exact` - plain parameter with optional modifier
//! - `encounter.status` - chain through a single-target reference
//! - `subject:Patient.name` - chain with an explicit target type
//! - `subject:Patient.organization.name` - nested chain
//!
//! Resolution never fails hard: an unresolvable key yields [`Unsupported`]
//! describing why, and the `Option` helpers collapse that to `None`.

use thiserror::Error;

use crate::catalog::CapabilityCatalog;
use crate::parameters::{SearchModifier, SearchParameterDefinition, SearchParameterType};

/// Default limit on the number of reference hops in one key.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Pagination control, accepted outside the catalog.
pub const PAGE_PARAM: &str = "page";

const INCLUDE_PARAM: &str = "_include";
const INCLUDE_ITERATE: &str = "iterate";

/// Result and global control parameters that never take a qualifier.
pub const RESERVED_CONTROL_PARAMS: &[&str] = &[
    "_id",
    "_lastUpdated",
    "_tag",
    "_profile",
    "_security",
    "_text",
    "_content",
    "_list",
    "_has",
    "_type",
    "_sort",
    "_count",
    "_revinclude",
    "_summary",
    "_total",
    "_elements",
    "_contained",
    "_containedType",
];

/// One `name[:qualifier...]` segment of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySegment<'k> {
    pub name: &'k str,
    pub qualifiers: Vec<&'k str>,
}

impl<'k> KeySegment<'k> {
    fn parse(text: &'k str) -> Self {
        let mut parts = text.split(':');
        let name = parts.next().unwrap_or_default();
        Self {
            name,
            qualifiers: parts.collect(),
        }
    }

    /// Text after the first `:`, read as a search modifier.
    pub fn modifier(&self) -> Option<&'k str> {
        self.qualifiers.first().copied()
    }

    /// Text after the last `:`, read as an explicit target type on a chain link.
    pub fn explicit_type(&self) -> Option<&'k str> {
        self.qualifiers.last().copied()
    }

    pub fn is_qualified(&self) -> bool {
        !self.qualifiers.is_empty()
    }
}

/// A raw key split into its chain links and final parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterKey<'k> {
    pub raw: &'k str,
    /// Reference hops, outermost first
    pub links: Vec<KeySegment<'k>>,
    /// The parameter evaluated on the resource type reached by the links
    pub target: KeySegment<'k>,
}

impl<'k> ParameterKey<'k> {
    pub fn parse(raw: &'k str) -> Self {
        let mut segments: Vec<KeySegment<'k>> = raw.split('.').map(KeySegment::parse).collect();
        // split always yields at least one item
        let target = segments.pop().unwrap_or_else(|| KeySegment::parse(""));
        Self {
            raw,
            links: segments,
            target,
        }
    }

    pub fn is_chained(&self) -> bool {
        !self.links.is_empty()
    }

    /// Number of reference hops.
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &KeySegment<'k>> {
        self.links.iter().chain(std::iter::once(&self.target))
    }
}

/// Why a key does not name a supported search criterion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("Empty segment in parameter key")]
    EmptySegment,

    #[error("Control parameter {0} does not accept a qualifier")]
    ReservedQualifier(String),

    #[error("_include only accepts the :iterate qualifier, got :{0}")]
    IncludeQualifier(String),

    #[error("Chain of {depth} links exceeds the maximum of {max}")]
    ChainTooDeep { depth: usize, max: usize },

    #[error("Unknown parameter {param} on {scope}")]
    UnknownParameter { param: String, scope: String },

    #[error("Parameter {0} is not a reference type, cannot chain")]
    NotReference(String),

    #[error("Ambiguous chain: parameter {param} declares {targets} target types, use :Type modifier")]
    AmbiguousTarget { param: String, targets: usize },
}

impl Unsupported {
    fn unknown(param: &str, context: Option<&str>) -> Self {
        Self::UnknownParameter {
            param: param.to_string(),
            scope: context.unwrap_or("global scope").to_string(),
        }
    }
}

/// A key that resolved to a supported criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter<'a> {
    pub value_type: SearchParameterType,
    /// Catalog definition of the final parameter; `None` for `page` and a
    /// bare `_include:iterate` on a catalog without `_include`
    pub definition: Option<&'a SearchParameterDefinition>,
    pub modifier: Option<SearchModifier>,
    /// Resource types reached by each chain link, outermost first
    pub chain: Vec<String>,
}

impl<'a> ResolvedParameter<'a> {
    fn control(value_type: SearchParameterType, definition: Option<&'a SearchParameterDefinition>) -> Self {
        Self {
            value_type,
            definition,
            modifier: None,
            chain: Vec::new(),
        }
    }

    /// Resource type the final parameter points to, when it is a reference
    /// with exactly one declared target.
    pub fn target_resource_type(&self) -> Option<&'a str> {
        self.definition.and_then(SearchParameterDefinition::single_target)
    }
}

/// Per-key outcome for batch resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResolution {
    pub key: String,
    pub supported: bool,
    pub value_type: Option<SearchParameterType>,
    pub target_resource_type: Option<String>,
}

/// Resolves raw query keys against a [`CapabilityCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct ChainResolver<'a> {
    catalog: &'a CapabilityCatalog,
    max_depth: usize,
}

impl<'a> ChainResolver<'a> {
    pub fn new(catalog: &'a CapabilityCatalog) -> Self {
        Self {
            catalog,
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve `raw_key` in the context of `resource_type`, or of the global
    /// scope only when `resource_type` is `None`.
    pub fn resolve(
        &self,
        resource_type: Option<&str>,
        raw_key: &str,
    ) -> Result<ResolvedParameter<'a>, Unsupported> {
        if raw_key == PAGE_PARAM {
            return Ok(ResolvedParameter::control(SearchParameterType::Number, None));
        }

        let key = ParameterKey::parse(raw_key);

        if key.segments().any(|s| s.name.is_empty())
            || key.links.iter().any(|l| l.qualifiers.iter().any(|q| q.is_empty()))
        {
            return Err(Unsupported::EmptySegment);
        }

        if key.depth() > self.max_depth {
            return Err(Unsupported::ChainTooDeep {
                depth: key.depth(),
                max: self.max_depth,
            });
        }

        if let Some(segment) = key
            .segments()
            .find(|s| s.is_qualified() && RESERVED_CONTROL_PARAMS.contains(&s.name))
        {
            return Err(Unsupported::ReservedQualifier(segment.name.to_string()));
        }

        if key.target.name == INCLUDE_PARAM && key.target.is_qualified() {
            if key.target.qualifiers.as_slice() != [INCLUDE_ITERATE] {
                return Err(Unsupported::IncludeQualifier(key.target.qualifiers.join(":")));
            }
            if !key.is_chained() {
                let definition = self.catalog.lookup_global(INCLUDE_PARAM);
                let mut resolved = ResolvedParameter::control(
                    definition.map_or(SearchParameterType::Special, |d| d.value_type),
                    definition,
                );
                resolved.modifier = Some(SearchModifier::Iterate);
                return Ok(resolved);
            }
        }

        let mut context = resource_type;
        let mut chain = Vec::with_capacity(key.depth());
        for link in &key.links {
            context = self.link_target(resource_type, context, link)?;
            if let Some(target) = context {
                chain.push(target.to_string());
            }
        }

        // Without a starting type no local scope is ever opened.
        let scope = resource_type.and(context);
        let definition = self
            .catalog
            .lookup(scope, key.target.name)
            .ok_or_else(|| Unsupported::unknown(key.target.name, scope))?;

        tracing::trace!(
            key = %raw_key,
            resource_type = ?resource_type,
            value_type = %definition.value_type,
            chain = ?chain,
            "Resolved search parameter"
        );

        Ok(ResolvedParameter {
            value_type: definition.value_type,
            definition: Some(definition),
            modifier: key.target.modifier().and_then(SearchModifier::parse),
            chain,
        })
    }

    /// Resource type reached by following one chain link from `context`.
    fn link_target<'s>(
        &self,
        original: Option<&'s str>,
        context: Option<&'s str>,
        link: &KeySegment<'s>,
    ) -> Result<Option<&'s str>, Unsupported>
    where
        'a: 's,
    {
        // A key without a starting type can only chain through global references.
        if original.is_none() {
            let definition = self
                .catalog
                .lookup_global(link.name)
                .ok_or_else(|| Unsupported::unknown(link.name, None))?;
            if !definition.is_reference() {
                return Err(Unsupported::NotReference(link.name.to_string()));
            }
        }

        // `ref:Type:qualifier.param` evaluates `param` against the resource
        // type the whole key started from.
        if link.qualifiers.len() > 1
            && self.catalog.is_known_resource_type(link.qualifiers[0])
        {
            return Ok(original);
        }

        if let Some(explicit) = link.explicit_type() {
            return Ok(Some(explicit));
        }

        let scope = original.and(context);
        let definition = self
            .catalog
            .lookup(scope, link.name)
            .ok_or_else(|| Unsupported::unknown(link.name, scope))?;

        if !definition.is_reference() {
            return Err(Unsupported::NotReference(link.name.to_string()));
        }

        definition
            .single_target()
            .map(Some)
            .ok_or_else(|| Unsupported::AmbiguousTarget {
                param: link.name.to_string(),
                targets: definition.targets.len(),
            })
    }

    pub fn resolve_value_type(
        &self,
        resource_type: Option<&str>,
        raw_key: &str,
    ) -> Option<SearchParameterType> {
        self.resolve_logged(resource_type, raw_key)
            .map(|resolved| resolved.value_type)
    }

    /// Resource type a reference-valued key ultimately points to.
    pub fn resolve_reference_target(
        &self,
        resource_type: Option<&str>,
        raw_key: &str,
    ) -> Option<&'a str> {
        self.resolve_logged(resource_type, raw_key)
            .and_then(|resolved| resolved.target_resource_type())
    }

    pub fn is_supported(&self, resource_type: Option<&str>, raw_key: &str) -> bool {
        self.resolve_logged(resource_type, raw_key).is_some()
    }

    /// Resolve every key of a request, preserving input order.
    pub fn resolve_keys<I, S>(&self, resource_type: Option<&str>, keys: I) -> Vec<KeyResolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| {
                let key = key.as_ref();
                let resolved = self.resolve_logged(resource_type, key);
                KeyResolution {
                    key: key.to_string(),
                    supported: resolved.is_some(),
                    value_type: resolved.as_ref().map(|r| r.value_type),
                    target_resource_type: resolved
                        .as_ref()
                        .and_then(ResolvedParameter::target_resource_type)
                        .map(str::to_string),
                }
            })
            .collect()
    }

    fn resolve_logged(
        &self,
        resource_type: Option<&str>,
        raw_key: &str,
    ) -> Option<ResolvedParameter<'a>> {
        match self.resolve(resource_type, raw_key) {
            Ok(resolved) => Some(resolved),
            Err(reason) => {
                tracing::debug!(
                    key = %raw_key,
                    resource_type = ?resource_type,
                    reason = %reason,
                    "Unsupported search parameter"
                );
                None
            }
        }
    }
}
