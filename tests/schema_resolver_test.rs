// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

mod common;

use std::time::{Duration, Instant};

use serde_json::json;
use survey_launcher::config::{RegisterApi, ServicesConfig};
use survey_launcher::surveys::{SchemaError, SchemaResolver, BUILTIN_SCHEMAS};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn services() -> ServicesConfig {
    ServicesConfig::default()
}

#[tokio::test]
async fn test_resolve_by_url_reads_ids_and_busts_cache() {
    common::setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/e_commerce.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"eq_id": "123-456-789", "form_type": "002"})),
        )
        .mount(&server)
        .await;

    let resolver = SchemaResolver::new(&services()).unwrap();
    let url = format!("{}/schemas/e_commerce.json", server.uri());
    let schema = resolver.resolve_by_url(&url).await.unwrap();

    assert_eq!(schema.eq_id, "123-456-789");
    assert_eq!(schema.form_type, "002");
    assert_eq!(schema.name, url);
    let busted = schema.url.unwrap();
    assert!(busted.starts_with(&format!("{}?bust=", url)));
    assert_eq!(busted.len(), url.len() + "?bust=".len() + 14);
}

#[tokio::test]
async fn test_resolve_by_url_keeps_existing_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "eq_id": "1",
                "form_type": "0005",
                "metadata": [{"name": "flag_1", "validator": "boolean"}]
            })),
        )
        .mount(&server)
        .await;

    let resolver = SchemaResolver::new(&services()).unwrap();
    let url = format!("{}/schema?version=3", server.uri());
    let schema = resolver.resolve_by_url(&url).await.unwrap();

    assert_eq!(schema.url.as_deref(), Some(url.as_str()));
    assert_eq!(schema.metadata.len(), 1);
    assert!(schema.metadata[0].is_boolean());
}

#[tokio::test]
async fn test_resolve_by_url_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = SchemaResolver::new(&services()).unwrap();
    let err = resolver
        .resolve_by_url(&format!("{}/missing.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_resolve_by_url_bad_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let resolver = SchemaResolver::new(&services()).unwrap();
    let err = resolver
        .resolve_by_url(&format!("{}/broken.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Unmarshal { .. }));
}

#[tokio::test]
async fn test_validator_rejection_carries_body() {
    let schemas = MockServer::start().await;
    let validator = MockServer::start().await;
    let document = json!({"eq_id": "1", "form_type": "0005"});

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document.clone()))
        .mount(&schemas)
        .await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .and(body_json(document))
        .respond_with(ResponseTemplate::new(400).set_body_string("missing sections"))
        .expect(1)
        .mount(&validator)
        .await;

    let mut config = services();
    config.schema_validator_url = Some(validator.uri());
    let resolver = SchemaResolver::new(&config).unwrap();

    let err = resolver
        .resolve_by_url(&format!("{}/1_0005.json", schemas.uri()))
        .await
        .unwrap_err();
    match err {
        SchemaError::Validation { reason } => assert_eq!(reason, "missing sections"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_validator_acceptance() {
    let schemas = MockServer::start().await;
    let validator = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"eq_id": "1", "form_type": "0005"})),
        )
        .mount(&schemas)
        .await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&validator)
        .await;

    let mut config = services();
    config.schema_validator_url = Some(format!("{}/", validator.uri()));
    let resolver = SchemaResolver::new(&config).unwrap();

    let schema = resolver
        .resolve_by_url(&format!("{}/1_0005.json", schemas.uri()))
        .await
        .unwrap();
    assert_eq!(schema.eq_id, "1");
}

#[tokio::test]
async fn test_register_listing_adds_one_schema() {
    common::setup();
    let register = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/questionnaires/published"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "registry_id": "b02f1331-57f3-4427-8182-c969dbed6414",
                "survey_id": "187",
                "form_type": "002",
                "title": "Ecommerce",
                "lastPublished": "2019-12-12T08:55:27.731Z",
                "survey_version": "1",
                "eq_id": "123-456-789"
            }
        ])))
        .mount(&register)
        .await;

    let mut config = services();
    config.survey_register_url = Some(register.uri());
    let resolver = SchemaResolver::new(&config).unwrap();

    let schemas = resolver.available_schemas().await;
    assert_eq!(schemas.len(), BUILTIN_SCHEMAS.len() + 1);

    let schema = resolver
        .resolve_by_name("187_002 Ecommerce (v1 - 12/12/2019)")
        .await
        .unwrap();
    assert_eq!(schema.eq_id, "123-456-789");
    assert_eq!(schema.form_type, "002");
    assert_eq!(
        schema.url,
        Some(format!("{}/questionnaire/187/002/1", register.uri()))
    );
}

#[tokio::test]
async fn test_legacy_register_listing() {
    let register = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"schemas": [
                {"name": "mbs_9999.json", "_links": {"self": {"href": "http://register/mbs_9999.json"}}}
            ]}
        })))
        .mount(&register)
        .await;

    let mut config = services();
    config.survey_register_url = Some(format!("{}/", register.uri()));
    config.register_api = RegisterApi::Legacy;
    let resolver = SchemaResolver::new(&config).unwrap();

    let schema = resolver.resolve_by_name("mbs_9999.json").await.unwrap();
    assert_eq!(schema.eq_id, "mbs");
    assert_eq!(schema.form_type, "9999");
    assert_eq!(schema.url.as_deref(), Some("http://register/mbs_9999.json"));
}

#[tokio::test]
async fn test_failing_register_is_skipped() {
    let register = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&register)
        .await;

    let mut config = services();
    config.survey_register_url = Some(register.uri());
    let resolver = SchemaResolver::new(&config).unwrap();

    assert_eq!(resolver.available_schemas().await.len(), BUILTIN_SCHEMAS.len());
}

#[tokio::test]
async fn test_runner_listing_is_merged_without_duplicates() {
    let runner = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!(["1_0005.json", "lms_1.json"])),
        )
        .mount(&runner)
        .await;

    let mut config = services();
    config.survey_runner_url = runner.uri();
    config.list_runner_schemas = true;
    let resolver = SchemaResolver::new(&config).unwrap();

    let schemas = resolver.available_schemas().await;
    assert_eq!(schemas.len(), BUILTIN_SCHEMAS.len() + 1);
    let lms = schemas.iter().find(|s| s.name == "lms_1.json").unwrap();
    assert_eq!(lms.eq_id, "lms");
    assert_eq!(lms.form_type, "1");
}

#[tokio::test]
async fn test_required_metadata_from_runner() {
    let runner = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/1/0005"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eq_id": "1",
            "form_type": "0005",
            "metadata": [
                {"name": "user_id", "validator": "string"},
                {"name": "flag_1", "validator": "boolean"}
            ]
        })))
        .mount(&runner)
        .await;

    let mut config = services();
    config.survey_runner_schema_url = Some(runner.uri());
    let resolver = SchemaResolver::new(&config).unwrap();

    let schema = resolver.resolve_by_name("1_0005.json").await.unwrap();
    let metadata = resolver.required_metadata(&schema).await.unwrap();
    let names: Vec<&str> = metadata.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["user_id", "flag_1"]);
}

#[tokio::test]
async fn test_metadata_failure_is_an_error() {
    let runner = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&runner)
        .await;

    let mut config = services();
    config.survey_runner_schema_url = Some(runner.uri());
    let resolver = SchemaResolver::new(&config).unwrap();

    let schema = resolver.resolve_by_name("1_0005.json").await.unwrap();
    assert!(matches!(
        resolver.required_metadata(&schema).await,
        Err(SchemaError::Status { status: 500, .. })
    ));
    assert!(matches!(
        resolver.with_required_metadata(schema).await,
        Err(SchemaError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"eq_id": "1", "form_type": "0005"}))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let mut config = services();
    config.http_timeout_secs = 1;
    let resolver = SchemaResolver::new(&config).unwrap();

    let started = Instant::now();
    let err = resolver
        .resolve_by_url(&format!("{}/slow.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Fetch { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}
