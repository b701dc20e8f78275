use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_logistics::{build_router, state::AppState};

fn app() -> Router {
    build_router(AppState::in_memory(), &[])
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value) -> String {
    let (status, value) = call(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{}: {}", uri, value);
    value["data"]["id"].as_str().unwrap().to_string()
}

async fn create_transport(app: &Router, plate: &str) -> String {
    create(
        app,
        "/api/transports",
        json!({ "plate_number": plate, "capacity": "12000" }),
    )
    .await
}

async fn create_driver(app: &Router, license: &str) -> String {
    create(
        app,
        "/api/drivers",
        json!({ "full_name": "Ana Ruiz", "license_number": license, "license_classes": ["C"] }),
    )
    .await
}

async fn create_order(app: &Router) -> String {
    let client_id = create(app, "/api/clients", json!({ "name": "Acme" })).await;
    let object_id = create(
        app,
        "/api/client-objects",
        json!({ "client_id": client_id, "name": "Site A" }),
    )
    .await;
    create(
        app,
        "/api/orders",
        json!({ "client_id": client_id, "object_id": object_id, "priority": 3 }),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_second_driver_assignment_is_409() {
    let app = app();
    let t1 = create_transport(&app, "T1-001").await;
    let t2 = create_transport(&app, "T2-002").await;
    let d1 = create_driver(&app, "LIC-001").await;

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/api/transports/{}/driver", t1),
        Some(json!({ "driver_id": d1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/transports/{}/driver", t2),
        Some(json!({ "driver_id": d1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_transition_is_409_with_dedicated_code() {
    let app = app();
    let order = create_order(&app).await;
    let status_uri = format!("/api/orders/{}/status", order);

    for status in ["SCHEDULED", "IN_PROGRESS", "COMPLETED"] {
        let (code, _) = call(&app, Method::PUT, &status_uri, Some(json!({ "status": status }))).await;
        assert_eq!(code, StatusCode::OK);
    }

    let (code, body) = call(&app, Method::PUT, &status_uri, Some(json!({ "status": "DRAFT" }))).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");

    let (_, current) = call(&app, Method::GET, &format!("/api/orders/{}", order), None).await;
    assert_eq!(current["status"], "COMPLETED");
}

#[tokio::test]
async fn test_soft_deleted_rows_are_hidden_unless_requested() {
    let app = app();
    let d1 = create_driver(&app, "LIC-001").await;
    let uri = format!("/api/drivers/{}", d1);

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = call(&app, Method::GET, &format!("{}?include_deleted=true", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["deleted_at"].is_null());

    let (status, body) = call(&app, Method::POST, &format!("{}/restore", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["deleted_at"].is_null());
}

#[tokio::test]
async fn test_equipment_with_two_locations_is_400() {
    let app = app();
    let client_id = create(&app, "/api/clients", json!({ "name": "Acme" })).await;
    let object_id = create(
        &app,
        "/api/client-objects",
        json!({ "client_id": client_id, "name": "Site A" }),
    )
    .await;
    let warehouse_id = create(&app, "/api/warehouses", json!({ "name": "North" })).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/equipment",
        Some(json!({
            "kind": "container",
            "condition": "good",
            "volume": "20",
            "client_object_id": object_id,
            "warehouse_id": warehouse_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_explicit_null_clears_order_transport() {
    let app = app();
    let order = create_order(&app).await;
    let t1 = create_transport(&app, "T1-001").await;
    let uri = format!("/api/orders/{}", order);

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("{}/transport", uri),
        Some(json!({ "transport_id": t1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transport_id"], t1.as_str());

    // Campo ausente: no cambia
    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({ "priority": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transport_id"], t1.as_str());
    assert_eq!(body["data"]["priority"], 7);

    // null explícito: se limpia
    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({ "transport_id": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["transport_id"].is_null());

    let (status, body) = call(&app, Method::PUT, &uri, Some(json!({ "client_id": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_actor_header_must_be_a_uuid() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-actor-id", "not-a-uuid")
        .body(Body::from(
            json!({
                "client_id": uuid::Uuid::new_v4(),
                "object_id": uuid::Uuid::new_v4(),
                "priority": 1,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
