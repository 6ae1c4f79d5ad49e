//! Registration and login.
//!
//! Registration inserts the user and, for the customer role, the linked
//! customer row inside one transaction so a crash between the two inserts
//! cannot leave a half-registered account. Duplicate emails surface as the
//! database uniqueness violation and map to a conflict.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::{hash_password, verify_password, Role};
use crate::entities::{customer, user};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i32,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[instrument(skip(db, request), fields(email = %request.email))]
pub async fn register(
    db: &DatabaseConnection,
    request: RegisterRequest,
) -> Result<RegisterResponse, ServiceError> {
    request.validate()?;

    let role: Role = request.role.parse()?;

    if role == Role::Customer {
        let blank = |field: &Option<String>| field.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&request.address) || blank(&request.phone_number) {
            return Err(ServiceError::ValidationError(
                "Address and PhoneNumber are required for Customer role.".to_string(),
            ));
        }
    }

    let password_hash = hash_password(&request.password)?;

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        full_name: Set(request.full_name.clone()),
        email: Set(request.email.clone()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
        img_url: Set(None),
        ..Default::default()
    };

    let user = user.insert(&txn).await.map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::Conflict("Email already registered.".to_string())
        } else {
            ServiceError::DatabaseError(e)
        }
    })?;

    if role == Role::Customer {
        let customer = customer::ActiveModel {
            user_id: Set(Some(user.id)),
            address: Set(request.address.unwrap_or_default()),
            phone_number: Set(request.phone_number.unwrap_or_default()),
            ..Default::default()
        };
        customer.insert(&txn).await?;
    }

    txn.commit().await?;

    info!(user_id = user.id, %role, "registered user");
    Ok(RegisterResponse {
        message: "Registration successful".to_string(),
        user_id: user.id,
    })
}

#[instrument(skip(db, request), fields(email = %request.email))]
pub async fn login(
    db: &DatabaseConnection,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(db)
        .await?;

    // One undifferentiated message for both unknown email and bad password.
    let user = user.filter(|u| verify_password(&request.password, &u.password_hash));
    let user =
        user.ok_or_else(|| ServiceError::Unauthorized("Invalid email or password.".to_string()))?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        user_id: user.id,
        full_name: user.full_name,
        email: user.email,
        role: user.role,
    })
}
