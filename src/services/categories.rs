use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::{category, medicine};
use crate::errors::ServiceError;
use crate::services::DropdownItem;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithMedicines {
    #[serde(flatten)]
    pub category: category::Model,
    pub medicines: Vec<medicine::Model>,
}

#[instrument(skip(db))]
pub async fn list_categories(
    db: &DatabaseConnection,
) -> Result<Vec<CategoryWithMedicines>, ServiceError> {
    let rows = category::Entity::find()
        .find_with_related(medicine::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category, medicines)| CategoryWithMedicines {
            category,
            medicines,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn get_category(
    db: &DatabaseConnection,
    id: i32,
) -> Result<CategoryWithMedicines, ServiceError> {
    let mut rows = category::Entity::find_by_id(id)
        .find_with_related(medicine::Entity)
        .all(db)
        .await?;

    match rows.pop() {
        Some((category, medicines)) => Ok(CategoryWithMedicines {
            category,
            medicines,
        }),
        None => Err(ServiceError::NotFound(format!("Category {id} not found"))),
    }
}

#[instrument(skip(db, request))]
pub async fn create_category(
    db: &DatabaseConnection,
    request: CategoryRequest,
) -> Result<category::Model, ServiceError> {
    request.validate()?;

    let model = category::ActiveModel {
        name: Set(request.name),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(category_id = created.id, "created category");
    Ok(created)
}

#[instrument(skip(db, request))]
pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    request: CategoryRequest,
) -> Result<(), ServiceError> {
    request.validate()?;

    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Category {id} not found")))?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(request.name);
    active.update(db).await?;
    Ok(())
}

/// Deletes a category after detaching its medicines, in one transaction.
/// The medicines survive with `categoryId` cleared.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Category {id} not found")))?;

    let txn = db.begin().await?;

    medicine::Entity::update_many()
        .col_expr(medicine::Column::CategoryId, Expr::value(Value::Int(None)))
        .filter(medicine::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;

    category::Entity::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;

    info!(category_id = id, "deleted category");
    Ok(())
}

#[instrument(skip(db))]
pub async fn categories_dropdown(
    db: &DatabaseConnection,
) -> Result<Vec<DropdownItem>, ServiceError> {
    let categories = category::Entity::find().all(db).await?;

    Ok(categories
        .into_iter()
        .map(|c| DropdownItem {
            value: c.id,
            label: c.name,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn medicines_by_category(
    db: &DatabaseConnection,
    category_id: i32,
) -> Result<Vec<medicine::Model>, ServiceError> {
    let category = category::Entity::find_by_id(category_id).one(db).await?;
    if category.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Category {category_id} not found"
        )));
    }

    let medicines = medicine::Entity::find()
        .filter(medicine::Column::CategoryId.eq(category_id))
        .all(db)
        .await?;

    Ok(medicines)
}
