use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::{category, medicine, order_detail};
use crate::errors::ServiceError;
use crate::services::DropdownItem;

/// Medicines with stock at or below this count show up in the low-stock view.
const LOW_STOCK_THRESHOLD: i32 = 10;

const DEFAULT_PAGE_SIZE: u64 = 9;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub expiry_date: NaiveDate,
    pub category_id: Option<i32>,
    pub img_url: Option<String>,
}

impl MedicineRequest {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        if self.quantity_in_stock < 0 {
            return Err(ServiceError::ValidationError(
                "Quantity in stock must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineWithCategory {
    #[serde(flatten)]
    pub medicine: medicine::Model,
    pub category: Option<category::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedMedicines {
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub values: Vec<MedicineWithCategory>,
}

fn with_category(rows: Vec<(medicine::Model, Option<category::Model>)>) -> Vec<MedicineWithCategory> {
    rows.into_iter()
        .map(|(medicine, category)| MedicineWithCategory { medicine, category })
        .collect()
}

#[instrument(skip(db))]
pub async fn list_medicines(
    db: &DatabaseConnection,
) -> Result<Vec<MedicineWithCategory>, ServiceError> {
    let rows = medicine::Entity::find()
        .find_also_related(category::Entity)
        .all(db)
        .await?;
    Ok(with_category(rows))
}

/// Skip/take paging. Pages past the end return an empty `values` array with
/// the unchanged total count.
#[instrument(skip(db))]
pub async fn list_medicines_paged(
    db: &DatabaseConnection,
    page: Option<u64>,
    page_size: Option<u64>,
) -> Result<PagedMedicines, ServiceError> {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let skip = (page - 1) * page_size;

    let rows = medicine::Entity::find()
        .find_also_related(category::Entity)
        .offset(skip)
        .limit(page_size)
        .all(db)
        .await?;

    let total_count = medicine::Entity::find().count(db).await?;

    Ok(PagedMedicines {
        total_count,
        page,
        page_size,
        values: with_category(rows),
    })
}

#[instrument(skip(db))]
pub async fn get_medicine(
    db: &DatabaseConnection,
    id: i32,
) -> Result<MedicineWithCategory, ServiceError> {
    let mut rows = medicine::Entity::find_by_id(id)
        .find_also_related(category::Entity)
        .all(db)
        .await?;

    match rows.pop() {
        Some((medicine, category)) => Ok(MedicineWithCategory { medicine, category }),
        None => Err(ServiceError::NotFound(format!("Medicine {id} not found"))),
    }
}

#[instrument(skip(db, request), fields(name = %request.name))]
pub async fn create_medicine(
    db: &DatabaseConnection,
    request: MedicineRequest,
) -> Result<medicine::Model, ServiceError> {
    request.check()?;

    let model = medicine::ActiveModel {
        name: Set(request.name),
        brand: Set(request.brand),
        description: Set(request.description),
        price: Set(request.price),
        quantity_in_stock: Set(request.quantity_in_stock),
        expiry_date: Set(request.expiry_date),
        category_id: Set(request.category_id),
        img_url: Set(request.img_url),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(medicine_id = created.id, "created medicine");
    Ok(created)
}

#[instrument(skip(db, request))]
pub async fn update_medicine(
    db: &DatabaseConnection,
    id: i32,
    request: MedicineRequest,
) -> Result<(), ServiceError> {
    request.check()?;

    let existing = medicine::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Medicine {id} not found")))?;

    let mut active: medicine::ActiveModel = existing.into();
    active.name = Set(request.name);
    active.brand = Set(request.brand);
    active.description = Set(request.description);
    active.price = Set(request.price);
    active.quantity_in_stock = Set(request.quantity_in_stock);
    active.expiry_date = Set(request.expiry_date);
    active.category_id = Set(request.category_id);
    if request.img_url.is_some() {
        active.img_url = Set(request.img_url);
    }
    active.update(db).await?;
    Ok(())
}

/// Fails with a conflict (not a generic fault) when order lines still
/// reference the medicine, so the client can tell the difference.
#[instrument(skip(db))]
pub async fn delete_medicine(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let existing = medicine::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Medicine {id} not found")))?;

    let referencing = order_detail::Entity::find()
        .filter(order_detail::Column::MedicineId.eq(id))
        .count(db)
        .await?;
    if referencing > 0 {
        return Err(ServiceError::Conflict(format!(
            "Medicine {id} is referenced by existing order lines"
        )));
    }

    medicine::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(medicine_id = id, "deleted medicine");
    Ok(())
}

/// Substring search over name or brand.
#[instrument(skip(db))]
pub async fn search_medicines(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Vec<medicine::Model>, ServiceError> {
    let medicines = medicine::Entity::find()
        .filter(
            Condition::any()
                .add(medicine::Column::Name.contains(name))
                .add(medicine::Column::Brand.contains(name)),
        )
        .all(db)
        .await?;

    Ok(medicines)
}

#[instrument(skip(db))]
pub async fn low_stock_medicines(
    db: &DatabaseConnection,
) -> Result<Vec<medicine::Model>, ServiceError> {
    let medicines = medicine::Entity::find()
        .filter(medicine::Column::QuantityInStock.lte(LOW_STOCK_THRESHOLD))
        .all(db)
        .await?;

    Ok(medicines)
}

#[instrument(skip(db))]
pub async fn medicines_dropdown(db: &DatabaseConnection) -> Result<Vec<DropdownItem>, ServiceError> {
    let medicines = medicine::Entity::find().all(db).await?;

    Ok(medicines
        .into_iter()
        .map(|m| DropdownItem {
            value: m.id,
            label: m.name,
        })
        .collect())
}
