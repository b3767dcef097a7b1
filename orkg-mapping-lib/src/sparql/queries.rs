use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::types::ValueType;

static PREDICATE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^P\d+$").unwrap());
static CLASS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^C\d+$").unwrap());

const ORKG_PREFIXES: &str = "\
PREFIX orkgp: <http://orkg.org/orkg/predicate/>
PREFIX orkgc: <http://orkg.org/orkg/class/>
PREFIX orkgr: <http://orkg.org/orkg/resource/>
";

pub const DEFAULT_RESOURCES_LIMIT: usize = 500;
const MAX_RESOURCES_LIMIT: usize = 1000;

/// Query probing which kinds of RDF term appear as objects of a predicate.
/// Only ids in the public predicate shape map onto the `orkgp:` namespace;
/// anything else gets no query and the caller short-circuits to its
/// default without a remote call.
pub fn build_value_type_query(predicate_id: &str) -> Option<String> {
    if !PREDICATE_ID.is_match(predicate_id) {
        return None;
    }
    Some(format!(
        "{ORKG_PREFIXES}\
SELECT DISTINCT ?oType WHERE {{
  ?s orkgp:{predicate_id} ?o .
  BIND(
    IF(isLiteral(?o), \"Literal\",
      IF(isIRI(?o), \"IRI\",
        IF(isBlank(?o), \"Blank node\", \"Unknown\")
      )
    ) AS ?oType
  )
}}
LIMIT 100
"
    ))
}

/// Query listing distinct resource IRIs used with a predicate, with labels
/// for selection. A class narrows the listing to its instances; predicate
/// keys outside the public shape fall back to a class-only listing when a
/// usable class is given.
pub fn build_resources_query(
    predicate_id: &str,
    class_id: Option<&str>,
    limit: usize,
) -> Option<String> {
    let limit = limit.min(MAX_RESOURCES_LIMIT);
    let class_id = class_id.filter(|id| CLASS_ID.is_match(id));

    if PREDICATE_ID.is_match(predicate_id) {
        let class_filter = class_id
            .map(|id| format!("  ?o orkgp:P31 orkgc:{} .\n", id))
            .unwrap_or_default();
        return Some(format!(
            "{ORKG_PREFIXES}\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX schema: <http://schema.org/>
SELECT DISTINCT ?o ?oLabel WHERE {{
  ?s orkgp:{predicate_id} ?o .
  FILTER(isIRI(?o))
{class_filter}  OPTIONAL {{
    {{ ?o rdfs:label ?oLabel }}
    UNION
    {{ ?o schema:name ?oLabel }}
  }}
}}
ORDER BY ?oLabel
LIMIT {limit}
"
        ));
    }

    let class_id = class_id?;
    Some(format!(
        "{ORKG_PREFIXES}\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX schema: <http://schema.org/>
SELECT DISTINCT ?o ?oLabel WHERE {{
  ?o orkgp:P31 orkgc:{class_id} .
  OPTIONAL {{
    {{ ?o rdfs:label ?oLabel }}
    UNION
    {{ ?o schema:name ?oLabel }}
  }}
}}
ORDER BY ?oLabel
LIMIT {limit}
"
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct SparqlResult {
    #[serde(default)]
    pub results: SparqlResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<SparqlBinding>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SparqlBinding {
    #[serde(default, rename = "oType")]
    pub o_type: Option<SparqlValue>,
    #[serde(default)]
    pub o: Option<SparqlValue>,
    #[serde(default, rename = "oLabel")]
    pub o_label: Option<SparqlValue>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlValue {
    pub value: String,
}

/// Collapses the observed object kinds into one value type with a fixed
/// precedence: IRI over Literal over Blank node. A result with no
/// observations at all is a genuine `Unknown`, distinct from the `Literal`
/// default used when a lookup degrades.
pub fn parse_value_type(result: &SparqlResult) -> ValueType {
    let types: HashSet<&str> = result
        .results
        .bindings
        .iter()
        .filter_map(|binding| binding.o_type.as_ref().map(|v| v.value.as_str()))
        .collect();

    if types.contains("IRI") {
        ValueType::Iri
    } else if types.contains("Literal") {
        ValueType::Literal
    } else if types.contains("Blank node") {
        ValueType::BlankNode
    } else {
        ValueType::Unknown
    }
}
