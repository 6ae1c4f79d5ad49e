#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use pharmacy_api::{
    config::AppConfig,
    db::{self, DbConfig},
    AppState,
};

/// Harness for exercising the full router against an in-memory SQLite
/// database. The pool is pinned to a single connection so the in-memory
/// database survives across requests.
pub struct TestApp {
    router: Router,
    uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().expect("temp uploads dir");

        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let config = AppConfig {
            database_url: db_config.url,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            auto_migrate: false,
            uploads_dir: uploads.path().display().to_string(),
        };

        let state = AppState {
            db: Arc::new(pool),
            config,
        };

        Self {
            router: pharmacy_api::app_router(state),
            uploads,
        }
    }

    pub fn uploads_path(&self) -> &std::path::Path {
        self.uploads.path()
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None).await
    }

    /// Sends a single-file multipart upload with a handcrafted body.
    pub async fn upload(&self, uri: &str, file_name: &str, content: &[u8]) -> Response {
        let boundary = "test-file-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("multipart request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("response")
    }

    // ----- seeding helpers -----

    /// Registers a customer account and returns `(user_id, customer_id)`.
    pub async fn register_customer(&self, full_name: &str, email: &str) -> (i64, i64) {
        let response = self
            .post(
                "/auth/register",
                json!({
                    "fullName": full_name,
                    "email": email,
                    "password": "secret123",
                    "role": "Customer",
                    "address": "12 High Street",
                    "phoneNumber": "555-0101",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "registration failed");
        let body = response_json(response).await;
        let user_id = body["userId"].as_i64().expect("userId");

        let customers = response_json(self.get("/customers").await).await;
        let customer_id = customers
            .as_array()
            .expect("customer list")
            .iter()
            .find(|c| c["userId"].as_i64() == Some(user_id))
            .and_then(|c| c["id"].as_i64())
            .expect("registered customer record");

        (user_id, customer_id)
    }

    pub async fn create_category(&self, name: &str) -> i64 {
        let response = self.post("/categories", json!({ "name": name })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["id"].as_i64().expect("id")
    }

    pub async fn create_medicine(
        &self,
        name: &str,
        brand: &str,
        price: &str,
        quantity: i32,
        category_id: Option<i64>,
    ) -> i64 {
        let response = self
            .post(
                "/medicines",
                json!({
                    "name": name,
                    "brand": brand,
                    "description": "",
                    "price": price,
                    "quantityInStock": quantity,
                    "expiryDate": "2027-06-30",
                    "categoryId": category_id,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["id"].as_i64().expect("id")
    }

    pub async fn place_order(&self, customer_id: i64, total: &str) -> i64 {
        let response = self
            .post(
                "/orders",
                json!({ "customerId": customer_id, "totalAmount": total }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["id"].as_i64().expect("id")
    }

    pub async fn add_line_item(&self, order_id: i64, medicine_id: i64, quantity: i32) -> i64 {
        let response = self
            .post(
                "/orderdetails",
                json!({
                    "orderId": order_id,
                    "medicineId": medicine_id,
                    "quantity": quantity,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["id"].as_i64().expect("id")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response")
}

/// Monetary fields round-trip through SQLite's numeric affinity, so the JSON
/// may carry "12.5" for a stored 12.50. Compare as decimals, not strings.
pub fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected a decimal value, got {other}"),
    }
}
