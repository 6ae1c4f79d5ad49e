use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::{hash_password, Role};
use crate::entities::{customer, user};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCustomers {
    #[serde(flatten)]
    pub user: user::Model,
    pub customers: Vec<customer::Model>,
}

#[instrument(skip(db))]
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserWithCustomers>, ServiceError> {
    let rows = user::Entity::find()
        .find_with_related(customer::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(user, customers)| UserWithCustomers { user, customers })
        .collect())
}

#[instrument(skip(db))]
pub async fn get_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {id} not found")))
}

#[instrument(skip(db, request), fields(email = %request.email))]
pub async fn create_user(
    db: &DatabaseConnection,
    request: CreateUserRequest,
) -> Result<user::Model, ServiceError> {
    request.validate()?;
    let role: Role = request.role.parse()?;

    let model = user::ActiveModel {
        full_name: Set(request.full_name),
        email: Set(request.email),
        password_hash: Set(hash_password(&request.password)?),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
        img_url: Set(None),
        ..Default::default()
    };

    let created = model.insert(db).await.map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::Conflict("Email already registered.".to_string())
        } else {
            ServiceError::DatabaseError(e)
        }
    })?;

    info!(user_id = created.id, "created user");
    Ok(created)
}

#[instrument(skip(db, request))]
pub async fn update_user(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateUserRequest,
) -> Result<(), ServiceError> {
    request.validate()?;
    let role: Role = request.role.parse()?;

    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {id} not found")))?;

    let mut active: user::ActiveModel = existing.into();
    active.full_name = Set(request.full_name);
    active.email = Set(request.email);
    active.role = Set(role.to_string());
    active.update(db).await.map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::Conflict("Email already registered.".to_string())
        } else {
            ServiceError::DatabaseError(e)
        }
    })?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {id} not found")))?;

    user::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(user_id = id, "deleted user");
    Ok(())
}

/// Distinct role strings present in storage, for the admin filter dropdown.
#[instrument(skip(db))]
pub async fn roles_dropdown(db: &DatabaseConnection) -> Result<Vec<String>, ServiceError> {
    let roles = user::Entity::find()
        .select_only()
        .column(user::Column::Role)
        .distinct()
        .into_tuple::<String>()
        .all(db)
        .await?;

    Ok(roles)
}

/// Persists the relative URL of a freshly uploaded profile image.
#[instrument(skip(db))]
pub async fn set_image_url(
    db: &DatabaseConnection,
    id: i32,
    img_url: &str,
) -> Result<(), ServiceError> {
    let existing = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))?;

    let mut active: user::ActiveModel = existing.into();
    active.img_url = Set(Some(img_url.to_string()));
    active.update(db).await?;
    Ok(())
}
