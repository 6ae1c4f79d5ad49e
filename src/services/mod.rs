pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod medicines;
pub mod order_details;
pub mod orders;
pub mod payments;
pub mod users;

use serde::Serialize;

/// Minimal `{value, label}` pair used to populate client-side selects.
#[derive(Debug, Clone, Serialize)]
pub struct DropdownItem {
    pub value: i32,
    pub label: String,
}
