use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};

use crate::errors::ServiceError;
use crate::services::auth::{self, LoginRequest, RegisterRequest};
use crate::AppState;

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = auth::register(&state.db, request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = auth::login(&state.db, request).await?;
    Ok(Json(response))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
