use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::config::OrkgConfig;
use crate::enrich::ValueTypeOracle;
use crate::error::MappingError;
use crate::sparql::queries::{
    build_resources_query, build_value_type_query, parse_value_type, SparqlResult,
};
use crate::types::ValueType;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// One selectable resource observed in the live graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceOption {
    pub id: String,
    pub label: String,
}

/// Client for the ORKG SPARQL endpoint (Virtuoso): form-encoded POST,
/// JSON results.
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn from_config(config: &OrkgConfig) -> Result<Self, MappingError> {
        Ok(Self {
            http: config.http_client()?,
            endpoint: config.sparql_endpoint.clone(),
        })
    }

    /// Fallible value-type lookup. An id outside the public predicate
    /// shape resolves to `Literal` without touching the endpoint; remote
    /// and malformed-response failures surface as errors here.
    pub async fn try_lookup_value_type(
        &self,
        predicate_id: &str,
    ) -> Result<ValueType, MappingError> {
        let Some(query) = build_value_type_query(predicate_id) else {
            return Ok(ValueType::Literal);
        };
        let result = self.execute(&query).await?;
        Ok(parse_value_type(&result))
    }

    /// Total version of the lookup: any failure degrades to `Literal`, so
    /// enrichment keeps running while the endpoint is down.
    pub async fn lookup_value_type(&self, predicate_id: &str) -> ValueType {
        match self.try_lookup_value_type(predicate_id).await {
            Ok(value_type) => value_type,
            Err(err) => {
                debug!(
                    predicate = %predicate_id,
                    error = %err,
                    "value type lookup failed, defaulting to Literal"
                );
                ValueType::Literal
            }
        }
    }

    /// Resource options observed for a predicate, optionally narrowed to
    /// instances of a class. Unusable ids and any remote failure yield an
    /// empty list; callers treat that the same as "nothing to suggest".
    pub async fn resources(
        &self,
        predicate_id: &str,
        class_id: Option<&str>,
        limit: usize,
    ) -> Vec<ResourceOption> {
        let Some(query) = build_resources_query(predicate_id, class_id, limit) else {
            return Vec::new();
        };
        match self.execute(&query).await {
            Ok(result) => result
                .results
                .bindings
                .into_iter()
                .filter_map(|binding| {
                    let iri = binding.o?.value;
                    let label = binding
                        .o_label
                        .map(|label| label.value)
                        .or_else(|| {
                            iri.rsplit('/')
                                .next()
                                .filter(|tail| !tail.is_empty())
                                .map(str::to_string)
                        })
                        .unwrap_or_else(|| iri.clone());
                    Some(ResourceOption { id: iri, label })
                })
                .collect(),
            Err(err) => {
                debug!(
                    predicate = %predicate_id,
                    error = %err,
                    "resource listing failed, returning no options"
                );
                Vec::new()
            }
        }
    }

    async fn execute(&self, query: &str) -> Result<SparqlResult, MappingError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MappingError::Remote(format!(
                "SPARQL endpoint returned status {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.contains("application/json") && !content_type.contains(SPARQL_RESULTS_JSON)
        {
            return Err(MappingError::Remote(format!(
                "SPARQL endpoint returned unexpected content type {:?}",
                content_type
            )));
        }

        Ok(response.json::<SparqlResult>().await?)
    }
}

#[async_trait]
impl ValueTypeOracle for SparqlClient {
    async fn value_type(&self, predicate_id: &str) -> ValueType {
        self.lookup_value_type(predicate_id).await
    }
}
