//! Pharmacy API Library
//!
//! Relational store for a pharmacy (categories, medicines, customers, users,
//! orders, order lines, payments) exposed over a REST interface. The order
//! lifecycle (placement, line items, payments, status changes, cancellation)
//! is the operational core; everything else is straightforward CRUD.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Shared application state. The database connection is created once at
/// startup and threaded explicitly through every handler and service call;
/// there is no process-global persistence handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
}

/// Builds the full application router: REST resources, static serving for
/// uploaded user images, request tracing and permissive CORS for the SPA.
pub fn app_router(state: AppState) -> Router {
    let uploads_dir = state.config.uploads_dir.clone();

    handlers::api_routes()
        .nest_service("/UserImages", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
