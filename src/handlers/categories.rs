use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::errors::ServiceError;
use crate::services::categories::{self, CategoryRequest};
use crate::AppState;

async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let categories = categories::list_categories(&state.db).await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = categories::get_category(&state.db, id).await?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = categories::create_category(&state.db, request).await?;
    let location = format!("/categories/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    categories::update_category(&state.db, id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    categories::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn categories_dropdown(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = categories::categories_dropdown(&state.db).await?;
    Ok(Json(items))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/dropdown", get(categories_dropdown))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}
