//! ORKG Template Mapping Library
//!
//! This library resolves an ORKG template and everything it references into
//! a nested form mapping, then enriches that mapping with the value types
//! predicates carry in the live knowledge graph.

mod config;
mod enrich;
mod error;
mod flow;
mod mapping;
mod processor;
mod sparql;
mod template;
mod types;

pub use config::{OrkgConfig, DEFAULT_API_BASE, DEFAULT_SPARQL_ENDPOINT};
pub use enrich::{enrich_template_mapping, ValueTypeOracle};
pub use error::{MappingError, ResolutionMessage, ResolutionState};
pub use flow::TemplateFlow;
pub use mapping::generate_template_mapping;
pub use mapping::links::{create_resource_link, resource_link, resource_link_from_iri};
pub use processor::Processor;
pub use sparql::{ResourceOption, SparqlClient, DEFAULT_RESOURCES_LIMIT};
pub use template::{
    EntityRef, GraphProperty, GraphTemplate, Template, TemplateClient, TemplateListItem,
    TemplatePage, TemplateProperty, TemplateQuery,
};
pub use types::{Cardinality, PropertyMapping, Questionnaire, TemplateMapping, ValueType};
