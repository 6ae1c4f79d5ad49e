//! Catalog management: categories, medicines, paging, search and the
//! low-stock view.

mod common;

use axum::http::StatusCode;
use common::{decimal_field, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn category_create_returns_location() {
    let app = TestApp::new().await;

    let response = app.post("/categories", json!({ "name": "Antibiotics" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let created = response_json(response).await;
    let category_id = created["id"].as_i64().expect("id");
    assert_eq!(
        location.as_deref(),
        Some(format!("/categories/{category_id}").as_str())
    );

    let response = app.post("/categories", json!({ "name": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_list_includes_their_medicines() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Antibiotics").await;
    app.create_medicine("Amoxicillin", "Moxatag", "12.50", 40, Some(category_id))
        .await;

    let category = response_json(app.get(&format!("/categories/{category_id}")).await).await;
    assert_eq!(category["name"], "Antibiotics");
    let medicines = category["medicines"].as_array().expect("medicines");
    assert_eq!(medicines.len(), 1);
    assert_eq!(medicines[0]["name"], "Amoxicillin");

    let dropdown = response_json(app.get("/categories/dropdown").await).await;
    let dropdown = dropdown.as_array().expect("dropdown");
    assert_eq!(dropdown.len(), 1);
    assert_eq!(dropdown[0]["value"].as_i64(), Some(category_id));
    assert_eq!(dropdown[0]["label"], "Antibiotics");
}

#[tokio::test]
async fn category_rename_and_missing_lookup() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Antibiotics").await;

    let response = app
        .put(&format!("/categories/{category_id}"), json!({ "name": "Analgesics" }))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let category = response_json(app.get(&format!("/categories/{category_id}")).await).await;
    assert_eq!(category["name"], "Analgesics");

    let response = app.get("/categories/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_detaches_its_medicines() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Antibiotics").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, Some(category_id))
        .await;

    let response = app.delete(&format!("/categories/{category_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&format!("/categories/{category_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The medicine survives with its category link cleared.
    let medicine = response_json(app.get(&format!("/medicines/{medicine_id}")).await).await;
    assert_eq!(medicine["name"], "Amoxicillin");
    assert!(medicine["categoryId"].is_null());
}

#[tokio::test]
async fn medicine_create_returns_location_and_flattened_category() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Antibiotics").await;

    let response = app
        .post(
            "/medicines",
            json!({
                "name": "Amoxicillin",
                "brand": "Moxatag",
                "description": "Broad-spectrum antibiotic",
                "price": "12.50",
                "quantityInStock": 40,
                "expiryDate": "2027-06-30",
                "categoryId": category_id,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let created = response_json(response).await;
    let medicine_id = created["id"].as_i64().expect("id");
    assert_eq!(location.as_deref(), Some(format!("/medicines/{medicine_id}").as_str()));

    let medicine = response_json(app.get(&format!("/medicines/{medicine_id}")).await).await;
    assert_eq!(medicine["name"], "Amoxicillin");
    assert_eq!(decimal_field(&medicine["price"]), dec!(12.50));
    assert_eq!(medicine["category"]["name"], "Antibiotics");
}

#[tokio::test]
async fn medicine_validation_rejects_negative_values() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/medicines",
            json!({
                "name": "Amoxicillin",
                "brand": "Moxatag",
                "price": "-1.00",
                "quantityInStock": 40,
                "expiryDate": "2027-06-30",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/medicines",
            json!({
                "name": "Amoxicillin",
                "brand": "Moxatag",
                "price": "1.00",
                "quantityInStock": -5,
                "expiryDate": "2027-06-30",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paging_keeps_the_total_across_pages() {
    let app = TestApp::new().await;
    for i in 0..12 {
        app.create_medicine(&format!("Medicine {i}"), "Generic", "5.00", 20, None)
            .await;
    }

    let page1 = response_json(app.get("/medicines/paged?page=1&pageSize=9").await).await;
    assert_eq!(page1["totalCount"].as_u64(), Some(12));
    assert_eq!(page1["page"].as_u64(), Some(1));
    assert_eq!(page1["values"].as_array().map(Vec::len), Some(9));

    let page2 = response_json(app.get("/medicines/paged?page=2&pageSize=9").await).await;
    assert_eq!(page2["totalCount"].as_u64(), Some(12));
    assert_eq!(page2["values"].as_array().map(Vec::len), Some(3));

    // Pages past the end are empty but keep the unchanged total.
    let page3 = response_json(app.get("/medicines/paged?page=3&pageSize=9").await).await;
    assert_eq!(page3["totalCount"].as_u64(), Some(12));
    assert_eq!(page3["values"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn search_matches_name_or_brand() {
    let app = TestApp::new().await;
    app.create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None).await;
    app.create_medicine("Ibuprofen", "Advil", "4.00", 80, None).await;
    app.create_medicine("Paracetamol", "Tylenol", "3.00", 60, None).await;

    let by_name = response_json(app.get("/medicines/search?name=cillin").await).await;
    assert_eq!(by_name.as_array().map(Vec::len), Some(1));
    assert_eq!(by_name[0]["name"], "Amoxicillin");

    let by_brand = response_json(app.get("/medicines/search?name=Advil").await).await;
    assert_eq!(by_brand.as_array().map(Vec::len), Some(1));
    assert_eq!(by_brand[0]["name"], "Ibuprofen");
}

#[tokio::test]
async fn low_stock_view_uses_inclusive_threshold() {
    let app = TestApp::new().await;
    app.create_medicine("Scarce", "Generic", "5.00", 5, None).await;
    app.create_medicine("Boundary", "Generic", "5.00", 10, None).await;
    app.create_medicine("Plenty", "Generic", "5.00", 11, None).await;

    let low = response_json(app.get("/medicines/stock").await).await;
    let names: Vec<&str> = low
        .as_array()
        .expect("low stock list")
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Scarce", "Boundary"]);
}

#[tokio::test]
async fn medicines_by_category_requires_the_category() {
    let app = TestApp::new().await;
    let category_id = app.create_category("Antibiotics").await;
    app.create_medicine("Amoxicillin", "Moxatag", "12.50", 40, Some(category_id))
        .await;
    app.create_medicine("Ibuprofen", "Advil", "4.00", 80, None).await;

    let in_category =
        response_json(app.get(&format!("/medicines/bycategory/{category_id}")).await).await;
    assert_eq!(in_category.as_array().map(Vec::len), Some(1));
    assert_eq!(in_category[0]["name"], "Amoxicillin");

    let response = app.get("/medicines/bycategory/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_medicine_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (_, customer_id) = app.register_customer("Asha Patel", "asha@example.com").await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;
    let order_id = app.place_order(customer_id, "25.00").await;
    let line_id = app.add_line_item(order_id, medicine_id, 2).await;

    let response = app.delete(&format!("/medicines/{medicine_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Once the order line is gone the medicine can be removed.
    let response = app.delete(&format!("/orderdetails/{line_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.delete(&format!("/medicines/{medicine_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get(&format!("/medicines/{medicine_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn medicine_dropdown_lists_ids_and_names() {
    let app = TestApp::new().await;
    let medicine_id = app
        .create_medicine("Amoxicillin", "Moxatag", "12.50", 40, None)
        .await;

    let dropdown = response_json(app.get("/medicines/dropdown").await).await;
    let dropdown = dropdown.as_array().expect("dropdown");
    assert_eq!(dropdown.len(), 1);
    assert_eq!(dropdown[0]["value"].as_i64(), Some(medicine_id));
    assert_eq!(dropdown[0]["label"], "Amoxicillin");
}
