//! Line-item operations. The medicine price is snapshotted into the line at
//! insertion time and never recomputed from the catalog afterwards, so
//! receipts stay historically accurate. Stock is not reserved or decremented
//! here; inventory is managed separately by staff.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::entities::{medicine, order, order_detail};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineItemRequest {
    pub order_id: i32,
    pub medicine_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLineItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemWithMedicine {
    #[serde(flatten)]
    pub detail: order_detail::Model,
    pub medicine: Option<medicine::Model>,
}

fn check_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip(db, request), fields(order_id = request.order_id, medicine_id = request.medicine_id))]
pub async fn add_line_item(
    db: &DatabaseConnection,
    request: AddLineItemRequest,
) -> Result<order_detail::Model, ServiceError> {
    check_quantity(request.quantity)?;

    let order = order::Entity::find_by_id(request.order_id).one(db).await?;
    if order.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Order {} not found",
            request.order_id
        )));
    }

    let medicine = medicine::Entity::find_by_id(request.medicine_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Medicine {} not found", request.medicine_id))
        })?;

    let model = order_detail::ActiveModel {
        order_id: Set(request.order_id),
        medicine_id: Set(request.medicine_id),
        quantity: Set(request.quantity),
        // Price snapshot: later catalog price changes must not alter this row.
        unit_price: Set(medicine.price),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(order_detail_id = created.id, "added line item");
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get_line_item(
    db: &DatabaseConnection,
    id: i32,
) -> Result<LineItemWithMedicine, ServiceError> {
    let mut rows = order_detail::Entity::find()
        .filter(order_detail::Column::Id.eq(id))
        .find_also_related(medicine::Entity)
        .all(db)
        .await?;

    match rows.pop() {
        Some((detail, medicine)) => Ok(LineItemWithMedicine { detail, medicine }),
        None => Err(ServiceError::NotFound(format!(
            "Order detail {id} not found"
        ))),
    }
}

/// Overwrites the quantity in place. The order total is not recomputed.
#[instrument(skip(db))]
pub async fn update_line_item_quantity(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateLineItemRequest,
) -> Result<(), ServiceError> {
    check_quantity(request.quantity)?;

    let existing = order_detail::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order detail {id} not found")))?;

    let mut active: order_detail::ActiveModel = existing.into();
    active.quantity = Set(request.quantity);
    active.update(db).await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn remove_line_item(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let existing = order_detail::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order detail {id} not found")))?;

    order_detail::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(order_detail_id = id, "removed line item");
    Ok(())
}
