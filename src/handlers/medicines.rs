use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::services::{
    categories,
    medicines::{self, MedicineRequest},
};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedQuery {
    page: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    name: Option<String>,
}

async fn list_medicines(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let medicines = medicines::list_medicines(&state.db).await?;
    Ok(Json(medicines))
}

async fn list_medicines_paged(
    State(state): State<AppState>,
    Query(query): Query<PagedQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = medicines::list_medicines_paged(&state.db, query.page, query.page_size).await?;
    Ok(Json(page))
}

async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicine = medicines::get_medicine(&state.db, id).await?;
    Ok(Json(medicine))
}

async fn create_medicine(
    State(state): State<AppState>,
    Json(request): Json<MedicineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = medicines::create_medicine(&state.db, request).await?;
    let location = format!("/medicines/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<MedicineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    medicines::update_medicine(&state.db, id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    medicines::delete_medicine(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_medicines(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = query.name.unwrap_or_default();
    let medicines = medicines::search_medicines(&state.db, &name).await?;
    Ok(Json(medicines))
}

async fn low_stock_medicines(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicines = medicines::low_stock_medicines(&state.db).await?;
    Ok(Json(medicines))
}

async fn medicines_dropdown(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = medicines::medicines_dropdown(&state.db).await?;
    Ok(Json(items))
}

async fn medicines_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let medicines = categories::medicines_by_category(&state.db, category_id).await?;
    Ok(Json(medicines))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_medicines).post(create_medicine))
        .route("/paged", get(list_medicines_paged))
        .route("/search", get(search_medicines))
        .route("/stock", get(low_stock_medicines))
        .route("/dropdown", get(medicines_dropdown))
        .route("/bycategory/:category_id", get(medicines_by_category))
        .route(
            "/:id",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
}
