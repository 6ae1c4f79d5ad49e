//! Order lifecycle: placement, line items with price snapshots, status
//! transitions, cancellation and the flattened admin listing.

mod common;

use axum::http::StatusCode;
use common::{decimal_field, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn placing_an_order_defaults_to_pending() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;

    let response = app
        .post(
            "/orders",
            json!({ "customerId": customer_id, "totalAmount": "25.00" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let created = response_json(response).await;
    let order_id = created["id"].as_i64().expect("id");

    assert_eq!(location.as_deref(), Some(format!("/orders/{order_id}").as_str()));
    assert_eq!(created["status"], "Pending");
    assert_eq!(decimal_field(&created["totalAmount"]), dec!(25.00));
    assert!(created["orderDate"].as_str().is_some());
}

#[tokio::test]
async fn placing_an_order_rejects_unknown_status() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;

    let response = app
        .post(
            "/orders",
            json!({
                "customerId": customer_id,
                "totalAmount": "25.00",
                "status": "Teleported",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn line_items_snapshot_the_catalog_price() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;
    let line_id = app.add_line_item(order_id, medicine_id, 2).await;

    // A later catalog price change must not rewrite the recorded line.
    let response = app
        .put(
            &format!("/medicines/{medicine_id}"),
            json!({
                "name": "Amoxicillin",
                "brand": "Moxatag",
                "description": "",
                "price": "20.00",
                "quantityInStock": 40,
                "expiryDate": "2027-06-30",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let line = response_json(app.get(&format!("/orderdetails/{line_id}")).await).await;
    assert_eq!(decimal_field(&line["unitPrice"]), dec!(12.50));
    assert_eq!(decimal_field(&line["medicine"]["price"]), dec!(20.00));
}

#[tokio::test]
async fn line_item_quantity_must_be_positive() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;

    let response = app
        .post(
            "/orderdetails",
            json!({ "orderId": order_id, "medicineId": medicine_id, "quantity": 0 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let line_id = app.add_line_item(order_id, medicine_id, 2).await;
    let response = app
        .put(&format!("/orderdetails/{line_id}"), json!({ "quantity": -1 }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put(&format!("/orderdetails/{line_id}"), json!({ "quantity": 5 }))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let line = response_json(app.get(&format!("/orderdetails/{line_id}")).await).await;
    assert_eq!(line["quantity"].as_i64(), Some(5));
}

#[tokio::test]
async fn line_items_require_existing_order_and_medicine() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;

    let response = app
        .post(
            "/orderdetails",
            json!({ "orderId": 999, "medicineId": medicine_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/orderdetails",
            json!({ "orderId": order_id, "medicineId": 999, "quantity": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_moves_forward_but_never_backward() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let order_id = app.place_order(customer_id, "25.00").await;

    let set_status = |status: &'static str| {
        let app = &app;
        async move {
            app.put(
                &format!("/orders/{order_id}/status"),
                json!({ "status": status }),
            )
            .await
        }
    };

    // Skipping straight to Delivered is illegal from Pending.
    assert_eq!(set_status("Delivered").await.status(), StatusCode::CONFLICT);

    assert_eq!(set_status("Processing").await.status(), StatusCode::OK);
    assert_eq!(set_status("Shipped").await.status(), StatusCode::OK);
    // Re-sending the current status is an idempotent overwrite.
    assert_eq!(set_status("Shipped").await.status(), StatusCode::OK);
    // A shipped order can no longer be cancelled.
    assert_eq!(set_status("Cancelled").await.status(), StatusCode::CONFLICT);

    let response = set_status("Delivered").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Order status updated successfully");

    assert_eq!(set_status("Pending").await.status(), StatusCode::CONFLICT);

    let order = response_json(app.get(&format!("/orders/{order_id}")).await).await;
    assert_eq!(order["status"], "Delivered");
}

#[tokio::test]
async fn status_update_validates_input_and_target() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let order_id = app.place_order(customer_id, "25.00").await;

    let response = app
        .put(&format!("/orders/{order_id}/status"), json!({ "status": "Lost" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put("/orders/999/status", json!({ "status": "Processing" }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancelling_removes_the_order_and_its_lines() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;
    let line_id = app.add_line_item(order_id, medicine_id, 2).await;

    let response = app.delete(&format!("/orders/{order_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        app.get(&format!("/orders/{order_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/orderdetails/{line_id}")).await.status(),
        StatusCode::NOT_FOUND
    );

    let response = app.delete(&format!("/orders/{order_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_flattens_customer_and_counts_lines() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;
    app.add_line_item(order_id, medicine_id, 2).await;

    let orders = response_json(app.get("/orders").await).await;
    let orders = orders.as_array().expect("order list");
    assert_eq!(orders.len(), 1);
    let summary = &orders[0];
    assert_eq!(summary["id"].as_i64(), Some(order_id));
    assert_eq!(summary["orderId"], format!("ORD-{order_id}"));
    assert_eq!(summary["customerName"], "Asha Patel");
    assert_eq!(summary["customerEmail"], "asha@example.com");
    assert_eq!(summary["itemCount"].as_u64(), Some(1));
    assert_eq!(summary["shippingAddress"], "12 High Street");
    assert_eq!(summary["status"], "Pending");
}

#[tokio::test]
async fn listing_filters_by_status_and_search() {
    let app = TestApp::new().await;
    let (_, asha) = app.register_customer("Asha Patel", "asha@example.com").await;
    let (_, ben) = app.register_customer("Ben Okafor", "ben@example.com").await;
    let pending = app.place_order(asha, "10.00").await;
    let shipped = app.place_order(ben, "20.00").await;
    for status in ["Processing", "Shipped"] {
        let response = app
            .put(&format!("/orders/{shipped}/status"), json!({ "status": status }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let only_pending = response_json(app.get("/orders?status=Pending").await).await;
    let only_pending = only_pending.as_array().expect("orders");
    assert_eq!(only_pending.len(), 1);
    assert_eq!(only_pending[0]["id"].as_i64(), Some(pending));

    // "All" disables the status filter.
    let all = response_json(app.get("/orders?status=All").await).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let by_name = response_json(app.get("/orders?search=okafor").await).await;
    let by_name = by_name.as_array().expect("orders");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["id"].as_i64(), Some(shipped));

    let by_customer = response_json(app.get(&format!("/orders?customerId={asha}")).await).await;
    let by_customer = by_customer.as_array().expect("orders");
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0]["id"].as_i64(), Some(pending));
}

#[tokio::test]
async fn orders_by_customer_groups_lines_per_order() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let first = app.place_order(customer_id, "25.00").await;
    let second = app.place_order(customer_id, "12.50").await;
    app.add_line_item(first, medicine_id, 2).await;
    app.add_line_item(first, medicine_id, 1).await;
    app.add_line_item(second, medicine_id, 1).await;

    let orders = response_json(app.get(&format!("/orders/customer/{customer_id}")).await).await;
    let orders = orders.as_array().expect("orders");
    assert_eq!(orders.len(), 2);
    for order in orders {
        let expected_lines = if order["id"].as_i64() == Some(first) { 2 } else { 1 };
        let lines = order["orderDetails"].as_array().expect("lines");
        assert_eq!(lines.len(), expected_lines);
        assert_eq!(lines[0]["medicine"]["name"], "Amoxicillin");
    }
}

#[tokio::test]
async fn order_details_endpoint_requires_the_order() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let order_id = app.place_order(customer_id, "25.00").await;

    // A real order without lines is an empty list, not an error.
    let lines = response_json(app.get(&format!("/orders/{order_id}/details")).await).await;
    assert_eq!(lines.as_array().map(Vec::len), Some(0));

    let response = app.get("/orders/999/details").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_dropdown_is_the_fixed_contract() {
    let app = TestApp::new().await;

    let statuses = response_json(app.get("/orders/status").await).await;
    assert_eq!(
        statuses,
        json!(["Pending", "Processing", "Delivered", "Cancelled"])
    );
}
