use crate::config::OrkgConfig;
use crate::enrich::enrich_template_mapping;
use crate::error::MappingError;
use crate::flow::TemplateFlow;
use crate::mapping::generate_template_mapping;
use crate::sparql::SparqlClient;
use crate::template::TemplateClient;
use crate::types::{Questionnaire, TemplateMapping, ValueType};

/// Orchestrates the full pipeline: graph resolution, mapping construction
/// and value-type enrichment against one ORKG deployment.
pub struct Processor {
    templates: TemplateClient,
    sparql: SparqlClient,
}

impl Processor {
    pub fn from_config(config: OrkgConfig) -> Result<Self, MappingError> {
        tracing::info!(
            api_base = %config.api_base,
            sparql_endpoint = %config.sparql_endpoint,
            "creating processor"
        );
        Ok(Self {
            templates: TemplateClient::from_config(&config)?,
            sparql: SparqlClient::from_config(&config)?,
        })
    }

    /// Resolves the template graph rooted at `template_id` and builds its
    /// nested mapping, without touching the SPARQL endpoint.
    pub async fn resolve(&self, template_id: &str) -> Result<Questionnaire, MappingError> {
        let template_id = template_id.trim();
        if template_id.is_empty() {
            return Err(MappingError::InvalidInput(
                "template id must not be empty".to_string(),
            ));
        }

        let flow = TemplateFlow::load(&self.templates, template_id).await?;
        if flow.state.has_warnings() {
            for warning in flow.state.get_warnings() {
                tracing::warn!(source = ?warning.source, "{}", warning.message);
            }
            tracing::warn!(
                skipped = flow.state.get_warnings().len(),
                "resolution skipped unreachable branches"
            );
        }

        let mapping = generate_template_mapping(&flow.templates, &flow.root.id);
        tracing::info!(
            templates = flow.templates.len(),
            top_level_fields = mapping.len(),
            "generated template mapping"
        );

        Ok(Questionnaire {
            template_id: template_id.to_string(),
            label: flow.root.label,
            description: flow.root.description,
            mapping,
        })
    }

    /// Full pipeline: `resolve` followed by value-type enrichment of the
    /// built mapping.
    pub async fn process(&self, template_id: &str) -> Result<Questionnaire, MappingError> {
        let mut questionnaire = self.resolve(template_id).await?;
        let mapping = std::mem::take(&mut questionnaire.mapping);
        questionnaire.mapping = self.enrich(mapping).await;
        tracing::info!(
            resource_fields = count_value_type(&questionnaire.mapping, ValueType::Iri),
            "mapping enriched with value types"
        );
        Ok(questionnaire)
    }

    /// Enrichment-only pass over an existing mapping, for callers that
    /// built or stored one earlier.
    pub async fn enrich(&self, mapping: TemplateMapping) -> TemplateMapping {
        enrich_template_mapping(&self.sparql, mapping).await
    }

    pub fn templates(&self) -> &TemplateClient {
        &self.templates
    }

    pub fn sparql(&self) -> &SparqlClient {
        &self.sparql
    }
}

fn count_value_type(mapping: &TemplateMapping, wanted: ValueType) -> usize {
    mapping
        .values()
        .map(|property| {
            let own = usize::from(property.value_type == Some(wanted));
            let nested = property
                .subtemplate_properties
                .as_ref()
                .map(|children| count_value_type(children, wanted))
                .unwrap_or(0);
            own + nested
        })
        .sum()
}
