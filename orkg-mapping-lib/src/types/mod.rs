use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Nested form mapping keyed by predicate id. Key order follows the source
/// template's property order, so serialized output is stable run to run.
pub type TemplateMapping = IndexMap<String, PropertyMapping>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "one to one")]
    OneToOne,
    #[serde(rename = "one to many")]
    OneToMany,
}

impl Cardinality {
    /// An absent `max_count` means unbounded. Anything above one is
    /// multi-valued; everything else, an explicit zero included, maps to
    /// single-valued.
    pub fn from_max_count(max_count: Option<u32>) -> Self {
        match max_count {
            None => Cardinality::OneToMany,
            Some(n) if n > 1 => Cardinality::OneToMany,
            Some(_) => Cardinality::OneToOne,
        }
    }
}

/// Kind of RDF term observed as the object of a predicate. `Unknown` is a
/// successful lookup that saw no usage at all; degraded lookups report
/// `Literal` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Literal,
    #[serde(rename = "IRI")]
    Iri,
    #[serde(rename = "Blank node")]
    BlankNode,
    Unknown,
}

/// One form field derived from a template property. `value_type` is absent
/// until the enrichment pass has run and present on every node afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub label: String,
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtemplate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtemplate_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtemplate_properties: Option<TemplateMapping>,
    #[serde(rename = "valueType", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

/// Final pipeline artifact: the root template's identity plus its fully
/// built (and usually enriched) mapping tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    #[serde(rename = "templateId")]
    pub template_id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mapping: TemplateMapping,
}
