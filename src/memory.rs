use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::Error;
use crate::lifecycle::{LifecycleEngine, OrderStatus};
use crate::query::{OrderFilter, OrderPage, OrderService};
use crate::types::OrderRecord;

/// In-process stand-in for the remote order service.
///
/// Holds records in memory only. Status updates go through the same
/// [`LifecycleEngine`] rules as the client, so an illegal edge is refused here too.
#[derive(Debug, Default)]
pub struct MemoryOrderService {
    orders: RwLock<Vec<OrderRecord>>,
}

impl MemoryOrderService {
    pub fn new(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// Inserts or replaces by id.
    pub async fn upsert(&self, order: OrderRecord) -> Result<(), Error> {
        order.validate()?;
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => orders.push(order),
        }
        Ok(())
    }

    pub async fn remove(&self, order_id: &str) -> Option<OrderRecord> {
        let mut orders = self.orders.write().await;
        let idx = orders.iter().position(|o| o.id == order_id)?;
        Some(orders.remove(idx))
    }

    pub async fn get(&self, order_id: &str) -> Option<OrderRecord> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
    }

    pub async fn snapshot(&self) -> Vec<OrderRecord> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderService for MemoryOrderService {
    #[instrument(skip(self, filter), fields(status = ?filter.status, offset = filter.offset))]
    async fn orders_list(&self, filter: &OrderFilter) -> Result<OrderPage, Error> {
        let page = filter.apply(&self.orders.read().await);
        debug!(
            returned = page.orders.len(),
            total_matching = page.total_matching,
            "orders listed"
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn orders_update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<OrderRecord, Error> {
        let mut orders = self.orders.write().await;
        let Some(stored) = orders.iter_mut().find(|o| o.id == order_id) else {
            warn!("status update for unknown order");
            return Err(Error::not_found(order_id));
        };

        let updated = LifecycleEngine::apply_transition(stored, status).map_err(|e| {
            warn!(error = %e, "status update refused");
            Error::from(e)
        })?;
        *stored = updated.clone();
        info!(status = %updated.status, "order status stored");
        Ok(updated)
    }
}
