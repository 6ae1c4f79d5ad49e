use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::errors::ServiceError;
use crate::services::order_details::{self, AddLineItemRequest, UpdateLineItemRequest};
use crate::AppState;

async fn add_line_item(
    State(state): State<AppState>,
    Json(request): Json<AddLineItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = order_details::add_line_item(&state.db, request).await?;
    let location = format!("/orderdetails/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn get_line_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let line = order_details::get_line_item(&state.db, id).await?;
    Ok(Json(line))
}

async fn update_line_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateLineItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    order_details::update_line_item_quantity(&state.db, id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_line_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    order_details::remove_line_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_line_item))
        .route(
            "/:id",
            get(get_line_item)
                .put(update_line_item)
                .delete(remove_line_item),
        )
}
