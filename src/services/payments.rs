//! Payment records. Payments are recorded, not processed; multiple payments
//! per order are allowed and are never reconciled against the order total.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::entities::{order, payment};
use crate::errors::ServiceError;

/// Fixed dropdown contracts consumed by the checkout form.
const PAYMENT_METHODS: [&str; 3] = ["Card", "UPI", "COD"];
const PAYMENT_STATUSES: [&str; 2] = ["Success", "Failed"];

const DEFAULT_PAYMENT_STATUS: &str = "Pending";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub order_id: i32,
    pub amount_paid: Decimal,
    pub payment_method: String,
    pub payment_status: Option<String>,
}

#[instrument(skip(db, request), fields(order_id = request.order_id))]
pub async fn record_payment(
    db: &DatabaseConnection,
    request: RecordPaymentRequest,
) -> Result<payment::Model, ServiceError> {
    let order = order::Entity::find_by_id(request.order_id).one(db).await?;
    if order.is_none() {
        return Err(ServiceError::ValidationError("Invalid OrderId".to_string()));
    }

    let status = request
        .payment_status
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_STATUS.to_string());

    let model = payment::ActiveModel {
        order_id: Set(request.order_id),
        amount_paid: Set(request.amount_paid),
        payment_method: Set(request.payment_method),
        payment_status: Set(status),
        payment_date: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(payment_id = created.id, "recorded payment");
    Ok(created)
}

#[instrument(skip(db))]
pub async fn list_payments(db: &DatabaseConnection) -> Result<Vec<payment::Model>, ServiceError> {
    Ok(payment::Entity::find().all(db).await?)
}

#[instrument(skip(db))]
pub async fn get_payment(db: &DatabaseConnection, id: i32) -> Result<payment::Model, ServiceError> {
    payment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Payment {id} not found")))
}

#[instrument(skip(db))]
pub async fn payments_by_order(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<Vec<payment::Model>, ServiceError> {
    let payments = payment::Entity::find()
        .filter(payment::Column::OrderId.eq(order_id))
        .all(db)
        .await?;

    Ok(payments)
}

pub fn payment_methods() -> Vec<String> {
    PAYMENT_METHODS.iter().map(|s| s.to_string()).collect()
}

pub fn payment_statuses() -> Vec<String> {
    PAYMENT_STATUSES.iter().map(|s| s.to_string()).collect()
}
