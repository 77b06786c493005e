use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lifecycle::OrderStatus;
use crate::types::OrderRecord;

pub const DEFAULT_PAGE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFilter {
    /// Exact status match; `None` means all statuses.
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring over customer name, customer email and order id.
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Status and search are ANDed; the search fields are ORed.
    pub fn matches(&self, order: &OrderRecord) -> bool {
        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }
        match self.needle() {
            None => true,
            Some(needle) => [
                order.customer.name.as_str(),
                order.customer.email.as_str(),
                order.id.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle)),
        }
    }

    /// Reference evaluation of the list contract over an in-memory collection:
    /// newest first, ties broken by id so repeated calls page identically.
    pub fn apply(&self, orders: &[OrderRecord]) -> OrderPage {
        let mut matching: Vec<&OrderRecord> = orders.iter().filter(|o| self.matches(o)).collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total_matching = matching.len();
        let orders = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();
        OrderPage {
            orders,
            total_matching,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    /// Matches before pagination.
    pub total_matching: usize,
}

/// Remote order service boundary.
///
/// Implementations own transport, timeouts and retries, and must enforce
/// transition legality themselves; the client-side check is not the only guard.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn orders_list(&self, filter: &OrderFilter) -> Result<OrderPage, Error>;

    /// Returns the authoritative record after the change. Unknown ids yield
    /// [`Error::NotFound`].
    async fn orders_update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<OrderRecord, Error>;
}

#[async_trait]
impl<T: OrderService + ?Sized> OrderService for std::sync::Arc<T> {
    async fn orders_list(&self, filter: &OrderFilter) -> Result<OrderPage, Error> {
        (**self).orders_list(filter).await
    }

    async fn orders_update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<OrderRecord, Error> {
        (**self).orders_update_status(order_id, status).await
    }
}
