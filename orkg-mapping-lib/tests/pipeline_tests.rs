//! Integration tests for graph resolution and the full pipeline against a
//! mocked ORKG deployment (template API and SPARQL endpoint on one mock
//! server).

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use orkg_mapping::{
    MappingError, OrkgConfig, Processor, TemplateClient, TemplateFlow, ValueType,
};

fn config_for(server: &MockServer) -> OrkgConfig {
    OrkgConfig::new()
        .with_api_base(format!("{}/api", server.uri()))
        .with_sparql_endpoint(format!("{}/triplestore", server.uri()))
}

async fn mount_template(server: &MockServer, id: &str, body: serde_json::Value, hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/templates/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cyclic_neighbor_graph_resolves_each_template_once() {
    let server = MockServer::start().await;

    mount_template(
        &server,
        "R1",
        json!({
            "id": "R1",
            "label": "Alpha",
            "neighbors": [
                { "id": "R2", "label": "Beta" },
                { "id": "C5", "label": "a class, not a template" }
            ]
        }),
        1,
    )
    .await;
    mount_template(
        &server,
        "R2",
        json!({
            "id": "R2",
            "label": "Beta",
            "neighbors": [{ "id": "R1", "label": "Alpha" }]
        }),
        1,
    )
    .await;
    // Ids outside the resource shape are filtered before any fetch.
    Mock::given(method("GET"))
        .and(path("/api/templates/C5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TemplateClient::from_config(&config_for(&server)).unwrap();
    let flow = TemplateFlow::load(&client, "R1").await.unwrap();

    let ids: Vec<&str> = flow.templates.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["R1", "R2"]);
    assert_eq!(flow.root.id, "R1");
    assert!(!flow.state.has_warnings());
}

#[tokio::test]
async fn test_only_root_failures_are_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/templates/R404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/templates/R500"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = TemplateClient::from_config(&config).unwrap();

    let err = TemplateFlow::load(&client, "R404").await.unwrap_err();
    assert!(matches!(err, MappingError::TemplateNotFound(ref id) if id == "R404"));

    let err = TemplateFlow::load(&client, "R500").await.unwrap_err();
    assert!(matches!(err, MappingError::Remote(_)));

    // Same classification through the full pipeline entry point.
    let processor = Processor::from_config(config).unwrap();
    let err = processor.process("R404").await.unwrap_err();
    assert!(matches!(err, MappingError::TemplateNotFound(_)));
}

#[tokio::test]
async fn test_failing_neighbor_branches_are_skipped_and_recorded() {
    let server = MockServer::start().await;

    mount_template(
        &server,
        "R1",
        json!({
            "id": "R1",
            "label": "Alpha",
            "neighbors": [
                { "id": "R2", "label": "broken" },
                { "id": "R3", "label": "fine" },
                { "id": "R4", "label": "gone" }
            ]
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/templates/R2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_template(&server, "R3", json!({ "id": "R3", "label": "fine" }), 1).await;
    Mock::given(method("GET"))
        .and(path("/api/templates/R4"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = TemplateClient::from_config(&config_for(&server)).unwrap();
    let flow = TemplateFlow::load(&client, "R1").await.unwrap();

    let ids: Vec<&str> = flow.templates.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["R1", "R3"]);

    let warnings = flow.state.get_warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| w.message.contains("R2")));
    assert!(warnings.iter().any(|w| w.message.contains("R4")));
    assert!(warnings.iter().all(|w| w.source.as_deref() == Some("R1")));
}

#[tokio::test]
async fn test_class_derived_subtemplates_resolve_through_listing() {
    let server = MockServer::start().await;

    mount_template(
        &server,
        "R1",
        json!({
            "id": "R1",
            "label": "Alpha",
            "properties": [
                {
                    "path": { "id": "P1", "label": "has part" },
                    "class": { "id": "C20", "label": "Part" }
                },
                {
                    "path": { "id": "P9", "label": "another part" },
                    "class": { "id": "C20", "label": "Part" }
                }
            ]
        }),
        1,
    )
    .await;
    // Both properties share the class; the second one is satisfied by the
    // already-resolved template and the listing runs once.
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .and(query_param("target_class", "C20"))
        .and(query_param("size", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "id": "R2", "label": "Part template", "target_class": { "id": "C20" } }
            ],
            "totalElements": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_template(
        &server,
        "R2",
        json!({
            "id": "R2",
            "label": "Part template",
            "target_class": { "id": "C20", "label": "Part" },
            "properties": [{ "path": { "id": "P3", "label": "weight" }, "max_count": 1 }]
        }),
        1,
    )
    .await;

    let client = TemplateClient::from_config(&config_for(&server)).unwrap();
    let flow = TemplateFlow::load(&client, "R1").await.unwrap();

    let ids: Vec<&str> = flow.templates.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["R1", "R2"]);
    assert!(!flow.state.has_warnings());
}

#[tokio::test]
async fn test_unresolvable_class_keeps_property_as_plain_field() {
    let server = MockServer::start().await;

    mount_template(
        &server,
        "R1",
        json!({
            "id": "R1",
            "label": "Alpha",
            "properties": [{
                "path": { "id": "P1", "label": "has license" },
                "class": { "id": "C77", "label": "License" }
            }]
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .and(query_param("target_class", "C77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [],
            "totalElements": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TemplateClient::from_config(&config_for(&server)).unwrap();
    let flow = TemplateFlow::load(&client, "R1").await.unwrap();

    // No template targets the class: not an error, not even a warning.
    assert_eq!(flow.templates.len(), 1);
    assert!(!flow.state.has_warnings());
}

async fn mount_study_graph(server: &MockServer) {
    mount_template(
        server,
        "R1",
        json!({
            "id": "R1",
            "label": "Alpha",
            "description": "A root template",
            "properties": [
                {
                    "path": { "id": "P1", "label": "has part" },
                    "class": { "id": "C20", "label": "Part" }
                },
                {
                    "path": { "id": "P2", "label": "has note" },
                    "max_count": 1
                }
            ]
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/templates"))
        .and(query_param("target_class", "C20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "id": "R2", "label": "Part template", "target_class": { "id": "C20" } }
            ],
            "totalElements": 1
        })))
        .mount(server)
        .await;
    mount_template(
        server,
        "R2",
        json!({
            "id": "R2",
            "label": "Part template",
            "target_class": { "id": "C20", "label": "Part" },
            "properties": [{ "path": { "id": "P3", "label": "weight" }, "max_count": 1 }]
        }),
        1,
    )
    .await;
}

#[tokio::test]
async fn test_process_builds_enriched_questionnaire() {
    let server = MockServer::start().await;
    mount_study_graph(&server).await;

    // One lookup per distinct predicate; every one observes IRIs.
    Mock::given(method("POST"))
        .and(path("/triplestore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "bindings": [{ "oType": { "value": "IRI" } }] }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let processor = Processor::from_config(config_for(&server)).unwrap();
    let questionnaire = processor.process("R1").await.unwrap();

    assert_eq!(questionnaire.template_id, "R1");
    assert_eq!(questionnaire.label, "Alpha");
    assert_eq!(questionnaire.description.as_deref(), Some("A root template"));

    let mapping = &questionnaire.mapping;
    assert_eq!(mapping.keys().collect::<Vec<_>>(), ["P1", "P2"]);

    let part = &mapping["P1"];
    assert_eq!(part.label, "Part");
    assert_eq!(part.subtemplate_id.as_deref(), Some("R2"));
    assert_eq!(
        part.create_link.as_deref(),
        Some("https://orkg.org/resources/create?classes=C20")
    );
    assert_eq!(part.value_type, Some(ValueType::Iri));

    let children = part.subtemplate_properties.as_ref().unwrap();
    assert_eq!(children["P3"].value_type, Some(ValueType::Iri));
    assert_eq!(mapping["P2"].value_type, Some(ValueType::Iri));

    let json = serde_json::to_value(&questionnaire).unwrap();
    assert_eq!(json["templateId"], "R1");
    assert_eq!(json["mapping"]["P1"]["valueType"], "IRI");
    assert_eq!(
        json["mapping"]["P1"]["subtemplate_properties"]["P3"]["cardinality"],
        "one to one"
    );
}

#[tokio::test]
async fn test_sparql_outage_degrades_every_node_to_literal() {
    let server = MockServer::start().await;
    mount_study_graph(&server).await;

    Mock::given(method("POST"))
        .and(path("/triplestore"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let processor = Processor::from_config(config_for(&server)).unwrap();
    let questionnaire = processor.process("R1").await.unwrap();

    // Tree shape is identical to the healthy run; only the annotations
    // fall back.
    let mapping = &questionnaire.mapping;
    assert_eq!(mapping.keys().collect::<Vec<_>>(), ["P1", "P2"]);
    assert_eq!(mapping["P1"].value_type, Some(ValueType::Literal));
    assert_eq!(mapping["P2"].value_type, Some(ValueType::Literal));
    let children = mapping["P1"].subtemplate_properties.as_ref().unwrap();
    assert_eq!(children["P3"].value_type, Some(ValueType::Literal));
}
