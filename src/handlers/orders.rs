use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::services::orders::{self, CreateOrderRequest, OrderListFilter};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    status: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderListFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = orders::list_orders(&state.db, filter).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = orders::get_order(&state.db, id).await?;
    Ok(Json(order))
}

async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = orders::place_order(&state.db, request).await?;
    let location = format!("/orders/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    orders::update_order_status(&state.db, id, &request.status).await?;
    Ok(Json(
        serde_json::json!({ "message": "Order status updated successfully" }),
    ))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    orders::cancel_order(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn orders_by_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = orders::orders_by_customer(&state.db, customer_id).await?;
    Ok(Json(orders))
}

async fn order_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let lines = orders::order_details(&state.db, id).await?;
    Ok(Json(lines))
}

async fn order_statuses() -> impl IntoResponse {
    Json(orders::order_statuses())
}

/// Streams the filtered orders as a CSV attachment named for today's date.
async fn export_orders(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let csv = orders::export_orders_csv(&state.db, query.status.as_deref()).await?;
    let filename = format!("orders-{}.csv", Utc::now().format("%Y%m%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/export", get(export_orders))
        .route("/status", get(order_statuses))
        .route("/customer/:customer_id", get(orders_by_customer))
        .route("/:id", get(get_order).delete(cancel_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/details", get(order_details))
}
