use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::OrkgConfig;
use crate::error::MappingError;

/// Media type the ORKG REST API serves template records under.
const TEMPLATE_MEDIA_TYPE: &str = "application/vnd.orkg.template.v1+json";

/// Entity reference as the ORKG API embeds it: an id plus an optional
/// human label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProperty {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub min_count: Option<u32>,
    #[serde(default)]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub path: Option<EntityRef>,
    #[serde(default)]
    pub class: Option<EntityRef>,
    #[serde(default)]
    pub datatype: Option<EntityRef>,
}

/// Template record as served by the ORKG REST API. `neighbors` carries
/// lazily embedded related templates when the endpoint chooses to inline
/// them; they are full records recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_class: Option<EntityRef>,
    #[serde(default)]
    pub properties: Vec<TemplateProperty>,
    #[serde(default)]
    pub neighbors: Option<Vec<Template>>,
}

/// Template trimmed to the fields graph resolution and mapping
/// construction read. Presentation-only fields (`placeholder`, `datatype`)
/// and the embedded `neighbors` stubs are dropped here.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphTemplate {
    pub id: String,
    pub label: String,
    pub target_class: Option<EntityRef>,
    pub properties: Vec<GraphProperty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphProperty {
    pub id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub path: Option<EntityRef>,
    pub class: Option<EntityRef>,
}

impl From<&Template> for GraphTemplate {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            label: if template.label.is_empty() {
                template.id.clone()
            } else {
                template.label.clone()
            },
            target_class: template.target_class.clone(),
            properties: template.properties.iter().map(GraphProperty::from).collect(),
        }
    }
}

impl From<&TemplateProperty> for GraphProperty {
    fn from(property: &TemplateProperty) -> Self {
        Self {
            id: property.id.clone(),
            label: property.label.clone(),
            description: property.description.clone(),
            min_count: property.min_count,
            max_count: property.max_count,
            path: property.path.clone(),
            class: property.class.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateListItem {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub target_class: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TemplatePage {
    pub items: Vec<TemplateListItem>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct TemplateQuery {
    pub q: Option<String>,
    pub page: u32,
    pub size: u32,
    pub target_class: Option<String>,
}

impl Default for TemplateQuery {
    fn default() -> Self {
        Self {
            q: None,
            page: 0,
            size: 20,
            target_class: None,
        }
    }
}

/// The paged listing has drifted across ORKG API versions: content under
/// `content` or `elements`, the total under `totalElements`, `total` or
/// `page.total_elements`. Entries that do not parse as templates are
/// skipped rather than failing the page.
fn parse_template_page(body: Value) -> TemplatePage {
    let entries = body
        .get("content")
        .or_else(|| body.get("elements"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let items: Vec<TemplateListItem> = entries
        .into_iter()
        .filter_map(|entry| {
            let template: Template = serde_json::from_value(entry).ok()?;
            Some(TemplateListItem {
                label: if template.label.is_empty() {
                    template.id.clone()
                } else {
                    template.label
                },
                description: template.description,
                target_class: template.target_class.map(|class| class.id),
                id: template.id,
            })
        })
        .collect();

    let total = body
        .get("totalElements")
        .and_then(Value::as_u64)
        .or_else(|| body.get("total").and_then(Value::as_u64))
        .or_else(|| body.pointer("/page/total_elements").and_then(Value::as_u64))
        .unwrap_or(items.len() as u64);

    TemplatePage { items, total }
}

/// Client for the ORKG template REST endpoints.
pub struct TemplateClient {
    http: reqwest::Client,
    api_base: String,
}

impl TemplateClient {
    pub fn from_config(config: &OrkgConfig) -> Result<Self, MappingError> {
        Ok(Self {
            http: config.http_client()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one template by id. A 404 is a regular outcome (`None`);
    /// any other non-success status is a remote error for the caller to
    /// classify.
    pub async fn fetch_template(&self, template_id: &str) -> Result<Option<Template>, MappingError> {
        let url = format!("{}/templates/{}", self.api_base, template_id);
        debug!(url = %url, "fetching template");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, TEMPLATE_MEDIA_TYPE)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(Some(response.json::<Template>().await?)),
            404 => Ok(None),
            status => Err(MappingError::Remote(format!(
                "template fetch for {} returned status {}",
                template_id, status
            ))),
        }
    }

    /// Pages through the template listing, optionally filtered by a search
    /// string or target class. Non-success responses collapse to an empty
    /// page, mirroring how the upstream service reports "no results".
    pub async fn list_templates(&self, query: &TemplateQuery) -> Result<TemplatePage, MappingError> {
        let url = format!("{}/templates", self.api_base);
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("size", query.size.to_string()),
        ];
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        if let Some(target_class) = &query.target_class {
            params.push(("target_class", target_class.clone()));
        }
        debug!(url = %url, page = query.page, size = query.size, "listing templates");

        let response = self
            .http
            .get(&url)
            .query(&params)
            .header(ACCEPT, TEMPLATE_MEDIA_TYPE)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(
                status = %response.status(),
                "template listing returned non-success, treating as empty page"
            );
            return Ok(TemplatePage::default());
        }

        let body = response.json::<Value>().await?;
        Ok(parse_template_page(body))
    }

    /// Resolves the template whose `target_class` is the given class, if
    /// one exists: a size-1 filtered listing followed by a full fetch of
    /// the hit.
    pub async fn find_by_target_class(
        &self,
        class_id: &str,
    ) -> Result<Option<Template>, MappingError> {
        let query = TemplateQuery {
            target_class: Some(class_id.to_string()),
            size: 1,
            ..TemplateQuery::default()
        };
        let page = self.list_templates(&query).await?;
        let Some(item) = page.items.into_iter().next() else {
            return Ok(None);
        };
        self.fetch_template(&item.id).await
    }
}
