//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tally_core::analysis::ANALYSIS_FALLBACK;
use tally_core::{MockBackend, TransactionRecord};
use tower::ServiceExt;

fn no_auth() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

fn setup_test_app() -> (Router, Database) {
    setup_with_ai(Some(MockBackend::new().into()))
}

fn setup_with_ai(ai: Option<AIClient>) -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_ai(db.clone(), ai, None, no_auth());
    (app, db)
}

fn seed(db: &Database, description: &str, amount: f64, category: &str) {
    db.insert_transaction(&TransactionRecord {
        category: category.to_string(),
        date: Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap(),
        ..TransactionRecord::unclassified(description, amount)
    })
    .unwrap();
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Categories ==========

#[tokio::test]
async fn test_list_categories() {
    let (app, _) = setup_test_app();

    let response = get(&app, "/api/categories").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0], "Food & Dining");
    assert_eq!(json["fallback"], "Other");
}

// ========== Transactions ==========

#[tokio::test]
async fn test_create_transaction_classifies() {
    let (app, _) = setup_test_app();

    let response = post_json(
        &app,
        "/api/transactions",
        serde_json::json!({ "description": "UBER *TRIP", "amount": -23.4, "notes": "airport" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Transportation");
    assert_eq!(json["notes"], "airport");

    let list = get_body_json(get(&app, "/api/transactions").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_transaction_backend_down_files_as_other() {
    let (app, _) = setup_with_ai(Some(MockBackend::failing("connection refused").into()));

    let response = post_json(
        &app,
        "/api/transactions",
        serde_json::json!({ "description": "NETFLIX.COM", "amount": -15.49 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(get_body_json(response).await["category"], "Other");
}

#[tokio::test]
async fn test_create_transaction_rejects_blank_description() {
    let (app, db) = setup_test_app();

    let response = post_json(
        &app,
        "/api/transactions",
        serde_json::json!({ "description": "   ", "amount": -5.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Description is required");
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_create_transaction_invalid_json() {
    let (app, _) = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transactions")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_list_transactions_newest_first() {
    let (app, db) = setup_test_app();
    for (day, description) in [(1, "first"), (20, "latest"), (10, "middle")] {
        db.insert_transaction(&TransactionRecord {
            date: Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap(),
            ..TransactionRecord::unclassified(description, -1.0)
        })
        .unwrap();
    }

    let json = get_body_json(get(&app, "/api/transactions").await).await;
    let descriptions: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, ["latest", "middle", "first"]);
}

#[tokio::test]
async fn test_delete_transaction() {
    let (app, db) = setup_test_app();
    seed(&db, "Coffee", -4.5, "Food & Dining");
    let id = db.list_transactions().unwrap()[0].id;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/transactions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["success"], true);
    assert_eq!(db.count_transactions().unwrap(), 0);

    // Second delete of the same id
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/transactions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Budgets ==========

#[tokio::test]
async fn test_set_budget_upserts() {
    let (app, _) = setup_test_app();

    let response = post_json(
        &app,
        "/api/budgets",
        serde_json::json!({ "category": "Groceries", "amount": 400.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = get_body_json(response).await;

    let response = post_json(
        &app,
        "/api/budgets",
        serde_json::json!({ "category": "Groceries", "amount": 350.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = get_body_json(response).await;
    assert_eq!(first["id"], second["id"]);

    let budgets = get_body_json(get(&app, "/api/budgets").await).await;
    let budgets = budgets.as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["amount"], 350.0);
}

#[tokio::test]
async fn test_set_budget_rejects_negative() {
    let (app, db) = setup_test_app();

    let response = post_json(
        &app,
        "/api/budgets",
        serde_json::json!({ "category": "Shopping", "amount": -5.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(db.list_budgets().unwrap().is_empty());
}

#[tokio::test]
async fn test_budget_progress() {
    let (app, db) = setup_test_app();
    seed(&db, "WHOLE FOODS", -90.0, "Groceries");
    seed(&db, "TRADER JOE'S", -30.0, "Groceries");
    db.upsert_budget("Groceries", 100.0).unwrap();
    db.upsert_budget("Shopping", 0.0).unwrap();

    let response = get(&app, "/api/budgets/progress").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let progress = json.as_array().unwrap();
    assert_eq!(progress.len(), 2);

    assert_eq!(progress[0]["category"], "Groceries");
    assert_eq!(progress[0]["spent"], 120.0);
    assert_eq!(progress[0]["is_over_budget"], true);

    assert_eq!(progress[1]["category"], "Shopping");
    assert_eq!(progress[1]["progress_percent"], 0.0);
    assert_eq!(progress[1]["is_over_budget"], false);
}

#[tokio::test]
async fn test_suggest_budget() {
    let (app, db) = setup_test_app();
    seed(&db, "WHOLE FOODS", -480.0, "Groceries");

    let response = post_json(
        &app,
        "/api/budgets/suggest",
        serde_json::json!({ "category": "Groceries" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await["suggestion"],
        "A good starting point could be $450."
    );
}

#[tokio::test]
async fn test_suggest_budget_without_history_skips_backend() {
    let mock = MockBackend::new();
    let (app, _) = setup_with_ai(Some(mock.clone().into()));

    let response = post_json(
        &app,
        "/api/budgets/suggest",
        serde_json::json!({ "category": "Travel" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await["suggestion"],
        "No spending history for Travel. Set a budget manually to start!"
    );
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_suggest_budget_backend_failure_is_bad_gateway() {
    let (app, db) = setup_with_ai(Some(MockBackend::failing("timeout").into()));
    seed(&db, "Cinema", -30.0, "Entertainment");

    let response = post_json(
        &app,
        "/api/budgets/suggest",
        serde_json::json!({ "category": "Entertainment" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(get_body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_suggest_budget_without_backend_is_bad_gateway() {
    let (app, db) = setup_with_ai(None);
    seed(&db, "Cinema", -30.0, "Entertainment");

    let response = post_json(
        &app,
        "/api/budgets/suggest",
        serde_json::json!({ "category": "Entertainment" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ========== Dashboard & analysis ==========

#[tokio::test]
async fn test_dashboard_data() {
    let (app, db) = setup_test_app();
    seed(&db, "ACME PAYROLL", 2500.0, "Income");
    seed(&db, "Pizza", -20.0, "Food & Dining");
    seed(&db, "Burgers", -30.0, "Food & Dining");
    seed(&db, "Refund", 15.0, "Food & Dining");
    seed(&db, "WHOLE FOODS", -60.0, "Groceries");

    let response = get(&app, "/api/dashboard-data").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let spending = json["spending_by_category"].as_array().unwrap();
    assert_eq!(spending.len(), 2);
    assert_eq!(spending[0]["category"], "Food & Dining");
    assert_eq!(spending[0]["total"], 50.0);
    assert_eq!(spending[1]["category"], "Groceries");

    assert_eq!(json["income_vs_expense"]["income"], 2515.0);
    assert_eq!(json["income_vs_expense"]["expenses"], 110.0);
}

#[tokio::test]
async fn test_dashboard_empty() {
    let (app, _) = setup_test_app();

    let json = get_body_json(get(&app, "/api/dashboard-data").await).await;
    assert!(json["spending_by_category"].as_array().unwrap().is_empty());
    assert_eq!(json["income_vs_expense"]["income"], 0.0);
    assert_eq!(json["income_vs_expense"]["expenses"], 0.0);
}

#[tokio::test]
async fn test_analysis_requires_transactions() {
    let mock = MockBackend::new();
    let (app, _) = setup_with_ai(Some(mock.clone().into()));

    let response = post_json(&app, "/api/analysis", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await["error"],
        "No transactions provided for analysis."
    );
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_analysis_with_empty_body() {
    let (app, db) = setup_with_ai(Some(MockBackend::with_response("  Nice work!  ").into()));
    seed(&db, "Pizza", -20.0, "Food & Dining");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analysis")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["analysis"], "Nice work!");
}

#[tokio::test]
async fn test_analysis_include_income() {
    let (app, db) = setup_test_app();
    seed(&db, "ACME PAYROLL", 2500.0, "Income");

    // Income only: nothing to analyse by default
    let response = post_json(&app, "/api/analysis", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/api/analysis",
        serde_json::json!({ "include_income": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_analysis_backend_failure_returns_fallback() {
    let (app, db) = setup_with_ai(Some(MockBackend::failing("model not found").into()));
    seed(&db, "Pizza", -20.0, "Food & Dining");

    let response = post_json(&app, "/api/analysis", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["analysis"], ANALYSIS_FALLBACK);
}

// ========== AI health ==========

#[tokio::test]
async fn test_ai_health_with_mock() {
    let (app, _) = setup_test_app();

    let json = get_body_json(get(&app, "/api/ai/health").await).await;
    assert_eq!(json["configured"], true);
    assert_eq!(json["available"], true);
    assert_eq!(json["backend"], "mock");
}

#[tokio::test]
async fn test_ai_health_unhealthy_and_missing() {
    let (app, _) = setup_with_ai(Some(MockBackend::unhealthy().into()));
    let json = get_body_json(get(&app, "/api/ai/health").await).await;
    assert_eq!(json["configured"], true);
    assert_eq!(json["available"], false);

    let (app, _) = setup_with_ai(None);
    let json = get_body_json(get(&app, "/api/ai/health").await).await;
    assert_eq!(json["configured"], false);
    assert!(json["backend"].is_null());
}

// ========== Audit ==========

#[tokio::test]
async fn test_mutations_are_audited() {
    let (app, _) = setup_test_app();

    let response = post_json(
        &app,
        "/api/transactions",
        serde_json::json!({ "description": "UBER *TRIP", "amount": -12.0 }),
    )
    .await;
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    post_json(
        &app,
        "/api/budgets",
        serde_json::json!({ "category": "Transportation", "amount": 80.0 }),
    )
    .await;

    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/transactions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = get_body_json(get(&app, "/api/audit?limit=10").await).await;
    let actions: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["delete", "upsert", "create"]);
    assert_eq!(json[0]["actor"], "local-dev");
    assert_eq!(json[0]["entity_id"], id);
}

#[tokio::test]
async fn test_failed_mutation_is_not_audited() {
    let (app, db) = setup_test_app();

    post_json(
        &app,
        "/api/budgets",
        serde_json::json!({ "category": "", "amount": 10.0 }),
    )
    .await;
    assert!(db.list_audit_log(10).unwrap().is_empty());
}

// ========== Auth & security ==========

fn setup_auth_app() -> Router {
    let config = ServerConfig {
        require_auth: true,
        api_keys: vec!["s3cret-key".to_string()],
        ..Default::default()
    };
    create_router_with_ai(Database::in_memory().unwrap(), None, None, config)
}

#[tokio::test]
async fn test_auth_required_without_header() {
    let app = setup_auth_app();

    let response = get(&app, "/api/categories").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        get_body_json(response).await["error"],
        "Authentication required"
    );
}

#[tokio::test]
async fn test_auth_with_api_key() {
    let app = setup_auth_app();

    for (key, expected) in [
        ("s3cret-key", StatusCode::OK),
        ("wrong-key!", StatusCode::UNAUTHORIZED),
        ("s3cret", StatusCode::UNAUTHORIZED),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/categories")
                    .header("authorization", format!("Bearer {}", key))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "key {:?}", key);
    }
}

#[tokio::test]
async fn test_audit_actor_for_api_key() {
    let config = ServerConfig {
        require_auth: true,
        api_keys: vec!["k1".to_string()],
        ..Default::default()
    };
    let db = Database::in_memory().unwrap();
    let app = create_router_with_ai(db.clone(), Some(MockBackend::new().into()), None, config);

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/budgets")
            .header("authorization", "Bearer k1")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"category":"Housing & Utilities","amount":1200}"#))
            .unwrap(),
    )
    .await
    .unwrap();

    let entries = db.list_audit_log(1).unwrap();
    assert_eq!(entries[0].actor, "api-key");
}

#[tokio::test]
async fn test_security_headers() {
    let (app, _) = setup_test_app();

    let response = get(&app, "/api/categories").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_static_dir_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Tally</h1>").unwrap();

    let app = create_router_with_ai(
        Database::in_memory().unwrap(),
        None,
        dir.path().to_str(),
        no_auth(),
    );

    let response = get(&app, "/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>Tally</h1>");
}

// ========== Helpers ==========

#[test]
fn test_validate_api_key() {
    let keys = vec!["alpha".to_string(), "beta-key".to_string()];
    assert!(validate_api_key("alpha", &keys));
    assert!(validate_api_key("beta-key", &keys));
    assert!(!validate_api_key("alph", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("alpha", &[]));
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(parse_api_keys(" a, b ,,c "), ["a", "b", "c"]);
    assert!(parse_api_keys("").is_empty());
}

#[test]
fn test_app_error_mapping() {
    use tally_core::Error;

    let cases = [
        (Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
        (Error::NotFound("gone".into()), StatusCode::NOT_FOUND),
        (Error::Ai("down".into()), StatusCode::BAD_GATEWAY),
        (Error::InvalidData("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(AppError::from(err).status, status);
    }
}
