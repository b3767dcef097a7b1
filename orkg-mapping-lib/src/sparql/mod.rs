mod client;
mod queries;

pub use client::{ResourceOption, SparqlClient};
pub use queries::{
    build_resources_query, build_value_type_query, parse_value_type, SparqlBinding, SparqlResult,
    SparqlResults, SparqlValue, DEFAULT_RESOURCES_LIMIT,
};
