use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::errors::ServiceError;
use crate::services::customers::{self, CustomerRequest};
use crate::AppState;

async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let customers = customers::list_customers(&state.db).await?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = customers::get_customer(&state.db, id).await?;
    Ok(Json(customer))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = customers::create_customer(&state.db, request).await?;
    let location = format!("/customers/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    customers::update_customer(&state.db, id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    customers::delete_customer(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn customers_dropdown(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = customers::customers_dropdown(&state.db).await?;
    Ok(Json(items))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/dropdown", get(customers_dropdown))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}
