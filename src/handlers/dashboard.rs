use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::auth::Role;
use crate::errors::ServiceError;
use crate::services::dashboard;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsQuery {
    role: String,
    user_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentOrdersQuery {
    role: String,
    user_id: i32,
    limit: Option<u64>,
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let role: Role = query.role.parse()?;
    let stats = dashboard::stats(&state.db, role, query.user_id).await?;
    Ok(Json(stats))
}

async fn recent_orders(
    State(state): State<AppState>,
    Query(query): Query<RecentOrdersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let role: Role = query.role.parse()?;
    let orders = dashboard::recent_orders(&state.db, role, query.user_id, query.limit).await?;
    Ok(Json(orders))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/recent-orders", get(recent_orders))
}
