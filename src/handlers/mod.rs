pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod medicines;
pub mod order_details;
pub mod orders;
pub mod payments;
pub mod users;

use axum::Router;

use crate::AppState;

/// Assembles every resource router under its path prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/categories", categories::routes())
        .nest("/customers", customers::routes())
        .nest("/medicines", medicines::routes())
        .nest("/orders", orders::routes())
        .nest("/orderdetails", order_details::routes())
        .nest("/payments", payments::routes())
        .nest("/users", users::routes())
        .nest("/dashboard", dashboard::routes())
}
