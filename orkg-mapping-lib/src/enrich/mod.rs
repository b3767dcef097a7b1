use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexSet;
use tracing::debug;

use crate::types::{TemplateMapping, ValueType};

/// Number of value-type lookups issued concurrently. Batches run strictly
/// one after another to keep pressure on the public endpoint bounded.
const BATCH_SIZE: usize = 5;

/// Source of value types for predicates. Total by contract: an
/// implementation folds its failures into a default answer instead of
/// erroring, so enrichment can never fail a pipeline run.
#[async_trait]
pub trait ValueTypeOracle: Send + Sync {
    async fn value_type(&self, predicate_id: &str) -> ValueType;
}

/// Depth-first collection of every distinct predicate key in the tree, in
/// first-seen order.
fn collect_predicate_ids(mapping: &TemplateMapping, ids: &mut IndexSet<String>) {
    for (id, property) in mapping {
        ids.insert(id.clone());
        if let Some(children) = &property.subtemplate_properties {
            collect_predicate_ids(children, ids);
        }
    }
}

/// Annotates every node of the mapping with the value type its predicate
/// carries in the live graph. Each distinct id is looked up exactly once
/// per run; nodes sharing an id share the answer. The tree's shape, keys
/// and key order come back untouched.
pub async fn enrich_template_mapping(
    oracle: &dyn ValueTypeOracle,
    mut mapping: TemplateMapping,
) -> TemplateMapping {
    let mut ids = IndexSet::new();
    collect_predicate_ids(&mapping, &mut ids);
    debug!(predicates = ids.len(), "enriching mapping with value types");

    let ids: Vec<String> = ids.into_iter().collect();
    let mut cache: HashMap<String, ValueType> = HashMap::with_capacity(ids.len());
    for batch in ids.chunks(BATCH_SIZE) {
        let lookups = join_all(batch.iter().map(|id| oracle.value_type(id))).await;
        for (id, value_type) in batch.iter().zip(lookups) {
            cache.insert(id.clone(), value_type);
        }
    }

    apply_value_types(&mut mapping, &cache);
    mapping
}

fn apply_value_types(mapping: &mut TemplateMapping, cache: &HashMap<String, ValueType>) {
    for (id, property) in mapping.iter_mut() {
        property.value_type = Some(cache.get(id).copied().unwrap_or(ValueType::Literal));
        if let Some(children) = property.subtemplate_properties.as_mut() {
            apply_value_types(children, cache);
        }
    }
}
