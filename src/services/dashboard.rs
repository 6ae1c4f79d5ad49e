//! Read-only dashboard aggregations. Staff roles see catalog-wide counters;
//! customers see counters scoped to their own customer record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use tracing::instrument;

use crate::auth::Role;
use crate::entities::{customer, medicine, order, payment, user};
use crate::errors::ServiceError;

/// Only payments in this status count towards revenue.
const SUCCESS_STATUS: &str = "Success";

const DEFAULT_RECENT_LIMIT: u64 = 4;

#[derive(Debug, Serialize)]
#[serde(untagged, rename_all = "camelCase")]
pub enum DashboardStats {
    #[serde(rename_all = "camelCase")]
    Staff {
        total_medicines: u64,
        total_orders: u64,
        active_customers: u64,
        total_revenue: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Customer {
        my_orders: u64,
        total_orders: u64,
        total_revenue: Decimal,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub order_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub order_date: DateTime<Utc>,
}

#[instrument(skip(db))]
pub async fn stats(
    db: &DatabaseConnection,
    role: Role,
    user_id: i32,
) -> Result<DashboardStats, ServiceError> {
    if role.is_staff() {
        let total_medicines = medicine::Entity::find().count(db).await?;
        let total_orders = order::Entity::find().count(db).await?;
        let active_customers = customer::Entity::find().count(db).await?;

        let successful = payment::Entity::find()
            .filter(payment::Column::PaymentStatus.eq(SUCCESS_STATUS))
            .all(db)
            .await?;
        let total_revenue = successful.iter().map(|p| p.amount_paid).sum();

        return Ok(DashboardStats::Staff {
            total_medicines,
            total_orders,
            active_customers,
            total_revenue,
        });
    }

    // Customer view: resolve the customer record by owning user first.
    let customer = customer::Entity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    let (my_orders, total_revenue) = match customer {
        Some(customer) => {
            let orders = order::Entity::find()
                .filter(order::Column::CustomerId.eq(customer.id))
                .all(db)
                .await?;
            let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

            let revenue = if order_ids.is_empty() {
                Decimal::ZERO
            } else {
                payment::Entity::find()
                    .filter(payment::Column::OrderId.is_in(order_ids))
                    .filter(payment::Column::PaymentStatus.eq(SUCCESS_STATUS))
                    .all(db)
                    .await?
                    .iter()
                    .map(|p| p.amount_paid)
                    .sum()
            };

            (orders.len() as u64, revenue)
        }
        None => (0, Decimal::ZERO),
    };

    Ok(DashboardStats::Customer {
        my_orders,
        total_orders: my_orders,
        total_revenue,
    })
}

/// Most recent orders by date. Scoped to the caller's own customer record
/// when the role is Customer; customer names are only exposed to staff.
#[instrument(skip(db))]
pub async fn recent_orders(
    db: &DatabaseConnection,
    role: Role,
    user_id: i32,
    limit: Option<u64>,
) -> Result<Vec<RecentOrder>, ServiceError> {
    let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);

    let mut query = order::Entity::find()
        .find_also_related(customer::Entity)
        .order_by_desc(order::Column::OrderDate)
        .limit(limit);

    if role == Role::Customer {
        let customer_id = customer::Entity::find()
            .filter(customer::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .map(|c| c.id)
            .unwrap_or_default();
        query = query.filter(order::Column::CustomerId.eq(customer_id));
    }

    let rows = query.all(db).await?;

    let names: HashMap<i32, String> = if role.is_staff() {
        let user_ids: Vec<i32> = rows
            .iter()
            .filter_map(|(_, c)| c.as_ref().and_then(|c| c.user_id))
            .collect();
        if user_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.full_name))
                .collect()
        }
    } else {
        HashMap::new()
    };

    Ok(rows
        .into_iter()
        .map(|(order, customer)| RecentOrder {
            order_id: order.id,
            customer_name: if role.is_staff() {
                customer
                    .and_then(|c| c.user_id)
                    .and_then(|uid| names.get(&uid).cloned())
            } else {
                None
            },
            total_amount: order.total_amount,
            status: order.status,
            order_date: order.order_date,
        })
        .collect())
}
