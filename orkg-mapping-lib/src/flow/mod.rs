use std::collections::HashSet;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::error::{MappingError, ResolutionState};
use crate::template::{GraphTemplate, Template, TemplateClient};

/// Result of walking a template's reference graph: the root record, every
/// distinct template reachable from it (root first, in discovery order)
/// and the branches that were skipped along the way.
#[derive(Debug)]
pub struct TemplateFlow {
    pub root: Template,
    pub templates: Vec<GraphTemplate>,
    pub state: ResolutionState,
}

impl TemplateFlow {
    /// Loads the template graph rooted at `template_id`. Only the root can
    /// fail the load: an absent root is `TemplateNotFound` and a root
    /// remote failure propagates. Every downstream lookup degrades to a
    /// recorded skip instead, so a partially reachable graph still
    /// produces a usable flow.
    pub async fn load(client: &TemplateClient, template_id: &str) -> Result<Self, MappingError> {
        let root = client
            .fetch_template(template_id)
            .await?
            .ok_or_else(|| MappingError::TemplateNotFound(template_id.to_string()))?;
        info!(template_id = %root.id, label = %root.label, "resolving template graph");

        let mut walker = FlowWalker {
            client,
            visited: HashSet::from([root.id.clone()]),
            templates: vec![GraphTemplate::from(&root)],
            state: ResolutionState::new(),
        };
        walker.expand(&root).await;

        debug!(
            resolved = walker.templates.len(),
            skipped = walker.state.get_warnings().len(),
            "template graph resolved"
        );
        Ok(Self {
            root,
            templates: walker.templates,
            state: walker.state,
        })
    }
}

struct FlowWalker<'a> {
    client: &'a TemplateClient,
    visited: HashSet<String>,
    templates: Vec<GraphTemplate>,
    state: ResolutionState,
}

impl FlowWalker<'_> {
    /// Depth-first expansion of one resolved template: explicitly listed
    /// neighbors first, then templates discovered through property target
    /// classes. The future is boxed because the call is recursive.
    fn expand<'b>(&'b mut self, node: &'b Template) -> BoxFuture<'b, ()> {
        async move {
            if let Some(neighbors) = &node.neighbors {
                for neighbor in neighbors {
                    // Neighbor lists mix in non-template entities; only
                    // resource-shaped ids can name templates.
                    if !neighbor.id.starts_with('R') {
                        continue;
                    }
                    // Marked before the fetch: a failed id is not retried
                    // when rediscovered from another node.
                    if !self.visited.insert(neighbor.id.clone()) {
                        continue;
                    }
                    match self.client.fetch_template(&neighbor.id).await {
                        Ok(Some(fetched)) => {
                            self.templates.push(GraphTemplate::from(&fetched));
                            self.expand(&fetched).await;
                        }
                        Ok(None) => {
                            warn!(neighbor = %neighbor.id, "neighbor template not found, skipping branch");
                            self.state.add_warning(
                                format!("neighbor template {} not found", neighbor.id),
                                Some(node.id.clone()),
                            );
                        }
                        Err(err) => {
                            warn!(neighbor = %neighbor.id, error = %err, "neighbor fetch failed, skipping branch");
                            self.state.add_warning(
                                format!("neighbor template {} failed: {}", neighbor.id, err),
                                Some(node.id.clone()),
                            );
                        }
                    }
                }
            }

            for property in &node.properties {
                let Some(class) = &property.class else {
                    continue;
                };
                if self.has_template_for_class(&class.id) {
                    continue;
                }
                match self.client.find_by_target_class(&class.id).await {
                    Ok(Some(subtemplate)) => {
                        // Fetched in full before the visited check; an id
                        // already seen through the neighbor channel is
                        // simply discarded here.
                        if !self.visited.insert(subtemplate.id.clone()) {
                            continue;
                        }
                        self.templates.push(GraphTemplate::from(&subtemplate));
                        self.expand(&subtemplate).await;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(class = %class.id, error = %err, "target-class lookup failed, skipping branch");
                        self.state.add_warning(
                            format!("subtemplate lookup for class {} failed: {}", class.id, err),
                            Some(node.id.clone()),
                        );
                    }
                }
            }
        }
        .boxed()
    }

    fn has_template_for_class(&self, class_id: &str) -> bool {
        self.templates.iter().any(|template| {
            template
                .target_class
                .as_ref()
                .is_some_and(|class| class.id == class_id)
        })
    }
}
