use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lifecycle::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Customer snapshot attached to an order. Read-only for the admin surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    /// Image reference as stored by the catalog (URL or asset key).
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
    pub store_id: String,
    pub store_name: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// An order as returned by the remote order service.
///
/// `total` is authoritative; it is never recomputed here. See
/// [`OrderRecord::total_matches_items`] for a consistency probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Delivery fee is currently always zero, so the stored total should equal
    /// the item sum.
    pub fn total_matches_items(&self) -> bool {
        self.total == self.items_total()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.updated_at < self.created_at {
            return Err(invalid(format!(
                "order {} updated before it was created",
                self.id
            )));
        }
        if self.total < Decimal::ZERO {
            return Err(invalid(format!("order {} has a negative total", self.id)));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(invalid(format!(
                    "order {} item {} has zero quantity",
                    self.id, item.product_id
                )));
            }
            if item.price < Decimal::ZERO {
                return Err(invalid(format!(
                    "order {} item {} has a negative price",
                    self.id, item.product_id
                )));
            }
        }
        let fulfilled = !matches!(self.status, OrderStatus::Pending | OrderStatus::Cancelled);
        if fulfilled && self.items.is_empty() {
            return Err(invalid(format!(
                "order {} is {} without items",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidRecord { reason }
}
