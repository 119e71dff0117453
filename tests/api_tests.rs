// HTTP API tests for Breed Assist

use actix_web::{http::StatusCode, test, web, App};
use breed_assist::core::{AffinityMatrix, CharacterUniverse, Filter};
use breed_assist::models::{CharactersResponse, ErrorResponse, FilterResponse, HealthResponse, WhitelistStatus};
use breed_assist::routes::{self, filter::AppState, handle_json_payload_error};
use breed_assist::services::{CharacterRegistry, MatrixCache, MatrixLoader, SearchUrlBuilder};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

const CHILD_A_CSV: &str = "\
,名前,親相性,A,B,C,D,合計
,A,,0,0,0,0,0
,B,,0,0,0,0,0
,C,,0,0,0,0,0
,D,,0,0,0,0,0
";

/// Four characters, only A and B like each other; a child table exists for A alone
fn create_test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("A.csv"), CHILD_A_CSV).unwrap();
    std::fs::write(dir.path().join("B.csv"), "no anchor here\n").unwrap();

    let universe =
        CharacterUniverse::new(["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect()).unwrap();
    let mut global = AffinityMatrix::zeros(4);
    global.set(0, 1, 10).unwrap();
    global.set(1, 0, 10).unwrap();

    let mut registry = CharacterRegistry::default();
    registry.insert("A", 1001, true);
    registry.insert("B", 1002, true);
    registry.insert("C", 1003, true);
    registry.insert("D", 1004, false);

    let state = AppState {
        universe: Arc::new(universe),
        global: Arc::new(global),
        registry: Arc::new(registry),
        loader: Arc::new(MatrixLoader::default()),
        child_matrix_dir: Arc::new(dir.path().to_path_buf()),
        cache: Arc::new(MatrixCache::new(16, 60)),
        search: Arc::new(SearchUrlBuilder::default()),
        filter: Filter::default(),
    };
    (state, dir)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_universe_size() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.characters, 4);
}

#[actix_web::test]
async fn test_characters_listing() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/characters").to_request();
    let body: CharactersResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.total, 4);
    assert_eq!(body.characters[0].name, "A");
    assert!(body.characters[0].deployed);
    assert!(!body.characters[3].deployed);
}

#[actix_web::test]
async fn test_filter_returns_lists_and_search_url() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "A", "xPct": 50.0, "yPct": 25.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: FilterResponse = test::read_body_json(resp).await;
    assert_eq!(body.blacklist, vec!["C"]);
    assert_eq!(body.whitelist, vec!["B", "A"]);
    assert_eq!(body.status, WhitelistStatus::Recommended);
    assert_eq!(body.stats.blacklist_target, 1);
    assert!(body.search_url.starts_with("https://uma.pure-db.com/#/search?searchInfo="));
    assert!(!body.request_id.is_empty());
}

#[actix_web::test]
async fn test_filter_uses_default_thresholds() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "A" }))
        .to_request();
    let body: FilterResponse = test::call_and_read_body_json(&app, req).await;
    // 20% of four characters floors to zero
    assert_eq!(body.stats.blacklist_target, 0);
    assert!(body.blacklist.is_empty());
    assert_eq!(body.whitelist, vec!["B"]);
}

#[actix_web::test]
async fn test_filter_both_parents_owned() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({
            "child": "A",
            "parent1": "B",
            "parent2": "C",
            "owned1": true,
            "owned2": true
        }))
        .to_request();
    let body: FilterResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.whitelist.is_empty());
    assert!(body.blacklist.is_empty());
    assert_eq!(body.status, WhitelistStatus::NothingNeeded);
}

#[actix_web::test]
async fn test_filter_unknown_names() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "Z" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "A", "ancestors1": ["Nobody"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.message.contains("Nobody"));
}

#[actix_web::test]
async fn test_filter_rejects_same_parent_twice() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "A", "parent1": "B", "parent2": "B" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Invalid filter parameters");
}

#[actix_web::test]
async fn test_filter_validation_errors() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "A", "yPct": 250.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_json");
}

#[actix_web::test]
async fn test_filter_missing_and_broken_child_tables() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "C" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({ "child": "B" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_filter_rejects_too_many_factors() {
    let (state, _dir) = create_test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/filter")
        .set_json(json!({
            "child": "A",
            "search": {
                "redFactors": [
                    { "kind": "turf" }, { "kind": "mile" }, { "kind": "long" }, { "kind": "chaser" }
                ]
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
