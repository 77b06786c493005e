use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::lifecycle::OrderStatus;
use crate::types::OrderRecord;

/// Dashboard summary over whatever collection the caller passes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    /// Every status is present, zero counts included.
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Sum of `total` over delivered orders only.
    pub total_revenue: Decimal,
}

impl Default for OrderStats {
    fn default() -> Self {
        Self {
            total: 0,
            by_status: OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            total_revenue: Decimal::ZERO,
        }
    }
}

impl OrderStats {
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Orders still moving through fulfillment.
    pub fn active(&self) -> usize {
        OrderStatus::ALL
            .into_iter()
            .filter(|s| !s.is_terminal())
            .map(|s| self.count(s))
            .sum()
    }

    fn record(&mut self, order: &OrderRecord) {
        self.total += 1;
        *self.by_status.entry(order.status).or_insert(0) += 1;
        if order.status == OrderStatus::Delivered {
            self.total_revenue += order.total;
        }
    }
}

pub struct StatsAggregator;

impl StatsAggregator {
    /// Pure fold; input order does not matter.
    pub fn aggregate<'a, I>(orders: I) -> OrderStats
    where
        I: IntoIterator<Item = &'a OrderRecord>,
    {
        orders
            .into_iter()
            .fold(OrderStats::default(), |mut stats, order| {
                stats.record(order);
                stats
            })
    }
}
