pub mod links;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::mapping::links::create_resource_link;
use crate::template::{GraphProperty, GraphTemplate};
use crate::types::{Cardinality, PropertyMapping, TemplateMapping};

/// Builds the nested form mapping for a resolved template set. Pure: works
/// entirely off the already-fetched templates, no remote calls.
///
/// The root is the template with the given id, falling back to the first
/// resolved template; an empty set yields an empty mapping. Top-level keys
/// are the root's property path ids in source order.
pub fn generate_template_mapping(
    templates: &[GraphTemplate],
    root_template_id: &str,
) -> TemplateMapping {
    let mut templates_by_class: HashMap<&str, &GraphTemplate> = HashMap::new();
    for template in templates {
        if let Some(target_class) = &template.target_class {
            // Last writer wins when two templates claim the same class.
            templates_by_class.insert(target_class.id.as_str(), template);
        }
    }

    let root = templates
        .iter()
        .find(|template| template.id == root_template_id)
        .or_else(|| templates.first());
    let Some(root) = root else {
        return TemplateMapping::new();
    };

    debug!(root = %root.id, templates = templates.len(), "building template mapping");

    let mut visited_class_ids = HashSet::new();
    let mut mapping = TemplateMapping::new();
    for property in &root.properties {
        let Some(key) = property_key(property) else {
            continue;
        };
        let node = build_property(property, &templates_by_class, &mut visited_class_ids, key);
        mapping.insert(key.to_string(), node);
    }
    mapping
}

/// A property is keyed by its predicate: the path id when present, the
/// descriptor's own id otherwise. Properties with neither cannot be
/// addressed and are dropped.
fn property_key(property: &GraphProperty) -> Option<&str> {
    property
        .path
        .as_ref()
        .map(|path| path.id.as_str())
        .or(property.id.as_deref())
}

fn build_property(
    property: &GraphProperty,
    templates_by_class: &HashMap<&str, &GraphTemplate>,
    visited_class_ids: &mut HashSet<String>,
    key: &str,
) -> PropertyMapping {
    let path_label = property.path.as_ref().and_then(|path| path.label.as_deref());
    let class_label = property
        .class
        .as_ref()
        .and_then(|class| class.label.as_deref());

    // The label prefers presence (a present-but-empty class label is kept);
    // the description additionally skips empty strings before falling back
    // to the key.
    let label = class_label.or(path_label).unwrap_or(key).to_string();
    let description = [
        property.description.as_deref(),
        property.label.as_deref(),
        path_label,
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !candidate.is_empty())
    .unwrap_or(key)
    .to_string();

    let mut node = PropertyMapping {
        label,
        cardinality: Cardinality::from_max_count(property.max_count),
        description: Some(description),
        predicate_label: path_label.map(str::to_string),
        class_label: class_label.map(str::to_string),
        subtemplate_id: None,
        subtemplate_label: None,
        class_id: None,
        create_link: None,
        subtemplate_properties: None,
        value_type: None,
    };

    let Some(class) = &property.class else {
        return node;
    };
    let Some(target) = templates_by_class.get(class.id.as_str()) else {
        return node;
    };

    node.subtemplate_id = Some(target.id.clone());
    node.subtemplate_label = Some(target.label.clone());
    node.class_id = Some(class.id.clone());
    node.create_link = create_resource_link(&class.id);

    // Expand at most once per class along the current path: a class already
    // on the path is a cycle and stays a linked leaf, while the same class
    // reached through a sibling path expands again.
    if !target.properties.is_empty() && !visited_class_ids.contains(&class.id) {
        visited_class_ids.insert(class.id.clone());
        let mut children = TemplateMapping::new();
        for child in &target.properties {
            let Some(child_key) = property_key(child) else {
                continue;
            };
            let child_node =
                build_property(child, templates_by_class, visited_class_ids, child_key);
            children.insert(child_key.to_string(), child_node);
        }
        node.subtemplate_properties = Some(children);
        visited_class_ids.remove(&class.id);
    }

    node
}
