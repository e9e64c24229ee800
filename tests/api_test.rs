mod common;

use common::{full_features, prediction_service, temp_path};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use waitforit::application::insights::InsightService;
use waitforit::application::search::TitleSearchService;
use waitforit::application::upcoming::{UpcomingPrecomputer, UpcomingSeed, write_upcoming};
use waitforit::config::ItadEnvConfig;
use waitforit::infrastructure::{ItadClient, JsonFeatureStore, Metrics};
use waitforit::interfaces::http::{AppState, api_routes};
use warp::http::StatusCode;

fn snapshot() -> JsonFeatureStore {
    let raw = json!({
        "123456": full_features(true),
        "480": full_features(false),
        "7": { "log_launch_price": 4.0 }
    });
    JsonFeatureStore::from_json_str(&raw.to_string()).unwrap()
}

fn state(upcoming_path: PathBuf) -> AppState {
    let predictions = Arc::new(prediction_service(Arc::new(snapshot())));
    // No API key: the catalog stays disabled
    let catalog = Arc::new(ItadClient::new(&ItadEnvConfig::default()));

    AppState {
        search: Arc::new(TitleSearchService::new(catalog, predictions.clone(), "US")),
        insights: InsightService::new(0.5),
        metrics: Some(Metrics::new().unwrap()),
        predictions,
        upcoming_path,
    }
}

fn body<B: AsRef<[u8]>>(resp: &warp::http::Response<B>) -> Value {
    serde_json::from_slice(resp.body().as_ref()).unwrap()
}

#[tokio::test]
async fn test_predict_known_game() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 123456}))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    let p30 = json["prob_30d"].as_f64().unwrap();
    let p60 = json["prob_60d"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p30));
    assert!((0.0..=1.0).contains(&p60));
    assert_eq!(json["decision"], "Likely to discount — Wait");
}

#[tokio::test]
async fn test_predict_low_scores_buy_now() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 480}))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(&resp)["decision"], "Unlikely — Buy now");
}

#[tokio::test]
async fn test_predict_is_repeatable() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let resp = warp::test::request()
            .method("POST")
            .path("/predict")
            .json(&json!({"app_id": 123456}))
            .reply(&routes)
            .await;
        bodies.push(body(&resp));
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_predict_unknown_game_is_404() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 999999}))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body(&resp);
    assert_eq!(json["code"], "not_found");
    assert!(json["error"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
async fn test_predict_rejects_bad_app_ids() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    for payload in [json!({}), json!({"app_id": "abc"}), json!({"app_id": 1.5}), json!({"app_id": 0})] {
        let resp = warp::test::request()
            .method("POST")
            .path("/predict")
            .json(&payload)
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body(&resp)["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_predict_malformed_json_is_400() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["code"], "validation_error");
}

#[tokio::test]
async fn test_predict_without_body_is_400() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["code"], "validation_error");

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .header("content-type", "application/json")
        .header("transfer-encoding", "chunked")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["code"], "validation_error");
}

#[tokio::test]
async fn test_predict_oversized_body_is_413() {
    let routes = api_routes(state(temp_path("upcoming.json")));
    let padding = "x".repeat(70 * 1024);

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 480, "padding": padding}))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body(&resp)["code"], "validation_error");
}

#[tokio::test]
async fn test_predict_incomplete_features_is_503() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 7}))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body(&resp)["code"], "data_unavailable");
}

#[tokio::test]
async fn test_predict_horizon_with_insights() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict/horizon?include_insights=true")
        .json(&json!({
            "appid": 1030300,
            "horizon": "60d",
            "features": full_features(true),
            "threshold": 0.9
        }))
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json["horizon"], "60d");
    assert_eq!(json["threshold"], 0.9);
    assert_eq!(json["will_discount"], true);
    assert!(
        json["insights"]["sale_confidence_comment"]
            .as_str()
            .unwrap()
            .contains("60 days")
    );
}

#[tokio::test]
async fn test_predict_horizon_validation() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let cases = [
        json!({"appid": 1, "horizon": "90d", "features": full_features(true)}),
        json!({"appid": 1, "horizon": "30d", "features": {}}),
        json!({"appid": 1, "horizon": "30d", "features": {"log_launch_price": "cheap"}}),
        json!({"appid": 1, "horizon": "30d", "features": {"log_launch_price": 4.0}}),
        json!({"appid": 1, "horizon": "30d"}),
    ];
    for payload in cases {
        let resp = warp::test::request()
            .method("POST")
            .path("/predict/horizon")
            .json(&payload)
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }
}

#[tokio::test]
async fn test_search_without_itad_is_503() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("GET")
        .path("/predict/search?title=Hades")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body(&resp)["code"], "not_configured");

    let resp = warp::test::request()
        .method("GET")
        .path("/predict/search")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_from_itad_requires_itad() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict/from_itad")
        .json(&json!({"itad_id": "silksong", "horizon": "30d"}))
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body(&resp)["code"], "not_configured");

    let resp = warp::test::request()
        .method("POST")
        .path("/predict/from_itad")
        .json(&json!({"itad_id": "silksong", "horizon": "90d"}))
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upcoming_served_from_precomputed_file() {
    let path = temp_path("upcoming.json");
    let routes = api_routes(state(path.clone()));

    let resp = warp::test::request()
        .method("GET")
        .path("/games/upcoming")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let predictions = Arc::new(prediction_service(Arc::new(snapshot())));
    let precomputer = UpcomingPrecomputer::new(predictions, None);
    let games = precomputer
        .run(&[UpcomingSeed {
            name: "Winter Launch".to_string(),
            release_date: Some("2030-12-05".to_string()),
            price: Some(59.99),
        }])
        .await;
    write_upcoming(&path, &games).unwrap();

    let resp = warp::test::request()
        .method("GET")
        .path("/games/upcoming")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json[0]["name"], "Winter Launch");
    assert_eq!(json[0]["decision"], "Likely to discount — Wait");
    assert_eq!(json[0]["insights"]["bullets"].as_array().unwrap().len(), 3);

    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

#[tokio::test]
async fn test_health_and_metrics() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_30d_loaded"], true);
    assert_eq!(json["model_60d_version"], "test-60d");

    warp::test::request()
        .method("POST")
        .path("/predict")
        .json(&json!({"app_id": 999999}))
        .reply(&routes)
        .await;

    let resp = warp::test::request()
        .method("GET")
        .path("/metrics")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.body().as_ref().to_vec()).unwrap();
    assert!(text.contains("waitforit_prediction_errors_total{kind=\"not_found\"} 1"));
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let routes = api_routes(state(temp_path("upcoming.json")));

    let resp = warp::test::request()
        .method("GET")
        .path("/nope")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&resp)["code"], "not_found");

    let resp = warp::test::request()
        .method("GET")
        .path("/predict")
        .reply(&routes)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
