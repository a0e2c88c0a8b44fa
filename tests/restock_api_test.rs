mod common;

use axum::http::Method;
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};

async fn create_mug(app: &TestApp) -> String {
    let payload = json!({
        "name": "Mug",
        "sku": "M-1",
        "price": 5,
        "stock_level": 3,
        "low_stock_threshold": 10
    });
    let response = app.request(Method::POST, "/api/v1/products", Some(payload)).await;
    assert_eq!(response.status(), 201);
    let created = response_json(response).await;
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn restock_moves_product_out_of_low_stock() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await;

    // 3 <= 10, so the mug starts low
    let response = app
        .request(Method::GET, "/api/v1/products/low-stock", None)
        .await;
    let low = response_json(response).await;
    assert_eq!(low.as_array().unwrap().len(), 1);
    assert_eq!(low[0]["sku"], "M-1");

    // Restock by 10
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{id}/restock"),
            Some(json!({"quantity": 10})),
        )
        .await;
    assert_eq!(response.status(), 201);
    let event = response_json(response).await;
    assert_eq!(event["product_id"], id.as_str());
    assert_eq!(event["quantity"], 10);
    assert_eq!(event["previous_stock"], 3);
    assert_eq!(event["new_stock"], 13);
    assert!(event["timestamp"].as_str().is_some());

    // Stock level reflects the event
    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    let product = response_json(response).await;
    assert_eq!(product["stock_level"], 13);

    // 13 > 10, no longer low
    let response = app
        .request(Method::GET, "/api/v1/products/low-stock", None)
        .await;
    let low = response_json(response).await;
    assert!(low.as_array().unwrap().is_empty());

    // The event shows up in the restock log
    let response = app.request(Method::GET, "/api/v1/restocks", None).await;
    assert_eq!(response.status(), 200);
    let log = response_json(response).await;
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["previous_stock"], 3);
    assert_eq!(log[0]["new_stock"], 13);
}

#[tokio::test]
async fn invalid_quantities_leave_stock_unchanged() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await;
    let uri = format!("/api/v1/products/{id}/restock");

    for quantity in [json!(0), json!(-5), json!(2.5)] {
        let response = app
            .request(Method::POST, &uri, Some(json!({ "quantity": quantity })))
            .await;
        assert_eq!(response.status(), 400, "quantity {quantity} should be rejected");
        let body = response_json(response).await;
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("positive integer"));
    }

    // Missing quantity names the field
    let response = app.request(Method::POST, &uri, Some(json!({}))).await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Missing field: quantity"));

    // No mutation happened and no event was recorded
    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    let product = response_json(response).await;
    assert_eq!(product["stock_level"], 3);

    let response = app.request(Method::GET, "/api/v1/restocks", None).await;
    let log = response_json(response).await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn restocking_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    create_mug(&app).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/restock", Uuid::new_v4()),
            Some(json!({"quantity": 5})),
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = app.request(Method::GET, "/api/v1/restocks", None).await;
    let log = response_json(response).await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn restock_log_is_most_recent_first_and_truncatable() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await;
    let uri = format!("/api/v1/products/{id}/restock");

    for quantity in [1, 2, 3] {
        let response = app
            .request(Method::POST, &uri, Some(json!({ "quantity": quantity })))
            .await;
        assert_eq!(response.status(), 201);
    }

    let response = app.request(Method::GET, "/api/v1/restocks", None).await;
    let log = response_json(response).await;
    let quantities: Vec<i64> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["quantity"].as_i64().unwrap())
        .collect();
    assert_eq!(quantities, vec![3, 2, 1]);

    let response = app
        .request(Method::GET, "/api/v1/restocks?limit=2", None)
        .await;
    let log = response_json(response).await;
    let quantities: Vec<i64> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["quantity"].as_i64().unwrap())
        .collect();
    assert_eq!(quantities, vec![3, 2]);
}

#[tokio::test]
async fn concurrent_restocks_are_not_lost() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await;
    let uri = format!("/api/v1/products/{id}/restock");

    // Both read-modify-writes run under a row lock, so neither increment
    // can overwrite the other.
    let (first, second) = tokio::join!(
        app.request(Method::POST, &uri, Some(json!({"quantity": 4}))),
        app.request(Method::POST, &uri, Some(json!({"quantity": 6}))),
    );
    assert_eq!(first.status(), 201);
    assert_eq!(second.status(), 201);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    let product = response_json(response).await;
    assert_eq!(product["stock_level"], 13);
}

#[tokio::test]
async fn deleting_a_product_keeps_its_restock_history() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{id}/restock"),
            Some(json!({"quantity": 4})),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 204);

    // History is retained for audit
    let response = app.request(Method::GET, "/api/v1/restocks", None).await;
    let log = response_json(response).await;
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["product_id"], id.as_str());
}
