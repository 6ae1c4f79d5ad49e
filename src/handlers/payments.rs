use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::errors::ServiceError;
use crate::services::payments::{self, RecordPaymentRequest};
use crate::AppState;

async fn list_payments(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let payments = payments::list_payments(&state.db).await?;
    Ok(Json(payments))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = payments::get_payment(&state.db, id).await?;
    Ok(Json(payment))
}

async fn payments_by_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let payments = payments::payments_by_order(&state.db, order_id).await?;
    Ok(Json(payments))
}

async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = payments::record_payment(&state.db, request).await?;
    let location = format!("/payments/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn payment_methods() -> impl IntoResponse {
    Json(payments::payment_methods())
}

async fn payment_statuses() -> impl IntoResponse {
    Json(payments::payment_statuses())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/methods", get(payment_methods))
        .route("/status", get(payment_statuses))
        .route("/order/:order_id", get(payments_by_order))
        .route("/:id", get(get_payment))
}
