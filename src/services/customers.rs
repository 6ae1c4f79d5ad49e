use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::{customer, user};
use crate::errors::ServiceError;
use crate::services::DropdownItem;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub user_id: Option<i32>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithUser {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub user: Option<user::Model>,
}

#[instrument(skip(db))]
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<CustomerWithUser>, ServiceError> {
    let rows = customer::Entity::find()
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(customer, user)| CustomerWithUser { customer, user })
        .collect())
}

#[instrument(skip(db))]
pub async fn get_customer(db: &DatabaseConnection, id: i32) -> Result<CustomerWithUser, ServiceError> {
    let mut rows = customer::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    match rows.pop() {
        Some((customer, user)) => Ok(CustomerWithUser { customer, user }),
        None => Err(ServiceError::NotFound(format!("Customer {id} not found"))),
    }
}

#[instrument(skip(db, request))]
pub async fn create_customer(
    db: &DatabaseConnection,
    request: CustomerRequest,
) -> Result<customer::Model, ServiceError> {
    request.validate()?;

    let model = customer::ActiveModel {
        user_id: Set(request.user_id),
        address: Set(request.address),
        phone_number: Set(request.phone_number),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(customer_id = created.id, "created customer");
    Ok(created)
}

#[instrument(skip(db, request))]
pub async fn update_customer(
    db: &DatabaseConnection,
    id: i32,
    request: CustomerRequest,
) -> Result<(), ServiceError> {
    request.validate()?;

    let existing = customer::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {id} not found")))?;

    let mut active: customer::ActiveModel = existing.into();
    active.user_id = Set(request.user_id);
    active.address = Set(request.address);
    active.phone_number = Set(request.phone_number);
    active.update(db).await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let existing = customer::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {id} not found")))?;

    customer::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(customer_id = id, "deleted customer");
    Ok(())
}

/// Labels come from the linked account's full name when one exists.
#[instrument(skip(db))]
pub async fn customers_dropdown(db: &DatabaseConnection) -> Result<Vec<DropdownItem>, ServiceError> {
    let rows = customer::Entity::find()
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(customer, user)| DropdownItem {
            value: customer.id,
            label: user
                .map(|u| u.full_name)
                .unwrap_or_else(|| format!("Customer {}", customer.id)),
        })
        .collect())
}
