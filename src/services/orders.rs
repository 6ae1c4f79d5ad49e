//! Order lifecycle operations: placement, the flattened admin listing,
//! status changes with transition enforcement, cancellation, and CSV export.
//!
//! Placement intentionally does not reconcile `total_amount` against line
//! items (lines are added afterwards in separate calls) and never touches
//! medicine stock; both follow the documented decoupling.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::entities::{
    customer, medicine,
    order::{self, OrderStatus},
    order_detail, payment, user,
};
use crate::errors::ServiceError;

/// Fixed dropdown contract consumed by the SPA status filter.
const STATUS_DROPDOWN: [&str; 4] = ["Pending", "Processing", "Delivered", "Cancelled"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: Option<i32>,
    pub total_amount: Decimal,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<i32>,
}

/// Flattened projection for the order management list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i32,
    pub order_id: String,
    pub customer_id: Option<i32>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    pub item_count: usize,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub detail: order_detail::Model,
    pub medicine: Option<medicine::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithRelations {
    #[serde(flatten)]
    pub order: order::Model,
    pub customer: Option<customer::Model>,
    pub order_details: Vec<OrderLine>,
}

#[instrument(skip(db, request), fields(customer_id = ?request.customer_id))]
pub async fn place_order(
    db: &DatabaseConnection,
    request: CreateOrderRequest,
) -> Result<order::Model, ServiceError> {
    let status = match request.status.as_deref() {
        None | Some("") => OrderStatus::Pending,
        Some(s) => s.parse()?,
    };

    let model = order::ActiveModel {
        customer_id: Set(request.customer_id),
        order_date: Set(Utc::now()),
        total_amount: Set(request.total_amount),
        status: Set(status.to_string()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(order_id = created.id, "placed order");
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get_order(db: &DatabaseConnection, id: i32) -> Result<OrderWithRelations, ServiceError> {
    let order = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;

    let customer = match order.customer_id {
        Some(cid) => customer::Entity::find_by_id(cid).one(db).await?,
        None => None,
    };

    let lines = order_detail::Entity::find()
        .filter(order_detail::Column::OrderId.eq(id))
        .find_also_related(medicine::Entity)
        .all(db)
        .await?;

    Ok(OrderWithRelations {
        order,
        customer,
        order_details: lines
            .into_iter()
            .map(|(detail, medicine)| OrderLine { detail, medicine })
            .collect(),
    })
}

/// Lists orders newest first, flattened with customer identity, line counts
/// and the most recent payment. The search term substring-matches the order
/// id, customer name or customer email (case-insensitive); a status of "All"
/// disables the status filter.
#[instrument(skip(db))]
pub async fn list_orders(
    db: &DatabaseConnection,
    filter: OrderListFilter,
) -> Result<Vec<OrderSummary>, ServiceError> {
    let mut query = order::Entity::find()
        .find_also_related(customer::Entity)
        .order_by_desc(order::Column::OrderDate);

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(order::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.status.as_deref() {
        if !status.is_empty() && status != "All" {
            query = query.filter(order::Column::Status.eq(status));
        }
    }

    let rows = query.all(db).await?;
    let users = load_users_for(db, rows.iter().filter_map(|(_, c)| c.as_ref())).await?;

    let order_ids: Vec<i32> = rows.iter().map(|(o, _)| o.id).collect();
    let item_counts = load_item_counts(db, &order_ids).await?;
    let latest_payments = load_latest_payments(db, &order_ids).await?;

    let mut summaries: Vec<OrderSummary> = rows
        .into_iter()
        .map(|(order, customer)| {
            let user = customer
                .as_ref()
                .and_then(|c| c.user_id)
                .and_then(|uid| users.get(&uid));
            let latest = latest_payments.get(&order.id);

            OrderSummary {
                id: order.id,
                order_id: format!("ORD-{}", order.id),
                customer_id: order.customer_id,
                customer_name: user.map(|u| u.full_name.clone()),
                customer_email: user.map(|u| u.email.clone()),
                order_date: order.order_date,
                total_amount: order.total_amount,
                status: order.status,
                item_count: item_counts.get(&order.id).copied().unwrap_or(0),
                payment_method: latest.map(|p| p.payment_method.clone()),
                payment_status: latest.map(|p| p.payment_status.clone()),
                shipping_address: customer.map(|c| c.address),
            }
        })
        .collect();

    if let Some(search) = filter.search.as_deref() {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            summaries.retain(|s| {
                s.id.to_string().contains(&needle)
                    || s.customer_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                    || s.customer_email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
            });
        }
    }

    Ok(summaries)
}

/// Overwrites the order status after validating the transition. Writing the
/// current status again is legal; anything outside the transition table is
/// rejected.
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    id: i32,
    new_status: &str,
) -> Result<(), ServiceError> {
    let next: OrderStatus = new_status.parse()?;

    let order = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

    if let Ok(current) = order.status.parse::<OrderStatus>() {
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition(format!(
                "Order {id} cannot move from {current} to {next}"
            )));
        }
    }

    let mut active: order::ActiveModel = order.into();
    active.status = Set(next.to_string());
    active.update(db).await?;

    info!(order_id = id, status = %next, "updated order status");
    Ok(())
}

/// Hard-deletes an order: line items first, then the order itself, in one
/// transaction so no orphaned lines survive a crash between the deletes.
#[instrument(skip(db))]
pub async fn cancel_order(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let order = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;

    let txn = db.begin().await?;

    order_detail::Entity::delete_many()
        .filter(order_detail::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    order::Entity::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;

    info!(order_id = id, "cancelled order");
    Ok(())
}

#[instrument(skip(db))]
pub async fn orders_by_customer(
    db: &DatabaseConnection,
    customer_id: i32,
) -> Result<Vec<OrderWithRelations>, ServiceError> {
    let orders = order::Entity::find()
        .filter(order::Column::CustomerId.eq(customer_id))
        .order_by_desc(order::Column::OrderDate)
        .all(db)
        .await?;

    let customer = customer::Entity::find_by_id(customer_id).one(db).await?;
    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

    let lines = order_detail::Entity::find()
        .filter(order_detail::Column::OrderId.is_in(order_ids))
        .find_also_related(medicine::Entity)
        .all(db)
        .await?;

    let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
    for (detail, medicine) in lines {
        lines_by_order
            .entry(detail.order_id)
            .or_default()
            .push(OrderLine { detail, medicine });
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let order_details = lines_by_order.remove(&order.id).unwrap_or_default();
            OrderWithRelations {
                order,
                customer: customer.clone(),
                order_details,
            }
        })
        .collect())
}

/// Line items of an order, with their medicines. 404 when the order itself
/// does not exist (an existing order with no lines returns an empty list).
#[instrument(skip(db))]
pub async fn order_details(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<Vec<OrderLine>, ServiceError> {
    let order = order::Entity::find_by_id(order_id).one(db).await?;
    if order.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Order {order_id} not found"
        )));
    }

    let lines = order_detail::Entity::find()
        .filter(order_detail::Column::OrderId.eq(order_id))
        .find_also_related(medicine::Entity)
        .all(db)
        .await?;

    Ok(lines
        .into_iter()
        .map(|(detail, medicine)| OrderLine { detail, medicine })
        .collect())
}

pub fn order_statuses() -> Vec<String> {
    STATUS_DROPDOWN.iter().map(|s| s.to_string()).collect()
}

/// Renders the filtered orders as CSV. Fields containing the delimiter,
/// quotes or newlines are quoted per RFC 4180.
#[instrument(skip(db))]
pub async fn export_orders_csv(
    db: &DatabaseConnection,
    status: Option<&str>,
) -> Result<String, ServiceError> {
    let mut query = order::Entity::find().find_also_related(customer::Entity);
    if let Some(status) = status {
        if !status.is_empty() && status != "All" {
            query = query.filter(order::Column::Status.eq(status));
        }
    }

    let rows = query.all(db).await?;
    let users = load_users_for(db, rows.iter().filter_map(|(_, c)| c.as_ref())).await?;

    let mut out = String::from("OrderId,CustomerName,CustomerEmail,OrderDate,TotalAmount,Status\n");
    for (order, customer) in rows {
        let user = customer
            .as_ref()
            .and_then(|c| c.user_id)
            .and_then(|uid| users.get(&uid));

        let fields = [
            order.id.to_string(),
            user.map(|u| u.full_name.clone()).unwrap_or_default(),
            user.map(|u| u.email.clone()).unwrap_or_default(),
            order.order_date.format("%Y-%m-%d").to_string(),
            order.total_amount.to_string(),
            order.status,
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

async fn load_users_for<'a, I>(
    db: &DatabaseConnection,
    customers: I,
) -> Result<HashMap<i32, user::Model>, ServiceError>
where
    I: Iterator<Item = &'a customer::Model>,
{
    let user_ids: HashSet<i32> = customers.filter_map(|c| c.user_id).collect();
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?;

    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

async fn load_item_counts(
    db: &DatabaseConnection,
    order_ids: &[i32],
) -> Result<HashMap<i32, usize>, ServiceError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let lines = order_detail::Entity::find()
        .filter(order_detail::Column::OrderId.is_in(order_ids.to_vec()))
        .all(db)
        .await?;

    let mut counts: HashMap<i32, usize> = HashMap::new();
    for line in lines {
        *counts.entry(line.order_id).or_insert(0) += 1;
    }
    Ok(counts)
}

/// When an order carries several payments, the listing exposes the most
/// recent one by payment date.
async fn load_latest_payments(
    db: &DatabaseConnection,
    order_ids: &[i32],
) -> Result<HashMap<i32, payment::Model>, ServiceError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let payments = payment::Entity::find()
        .filter(payment::Column::OrderId.is_in(order_ids.to_vec()))
        .all(db)
        .await?;

    let mut latest: HashMap<i32, payment::Model> = HashMap::new();
    for p in payments {
        match latest.get(&p.order_id) {
            Some(existing) if existing.payment_date >= p.payment_date => {}
            _ => {
                latest.insert(p.order_id, p);
            }
        }
    }
    Ok(latest)
}
