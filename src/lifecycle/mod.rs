pub mod mapping;

use chrono::{DateTime, Duration, Utc};

use crate::error::TransitionError;
use crate::types::OrderRecord;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Forward path first, then `Cancelled`.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Next fulfillment stage, or `None` at the end of the forward path.
    pub fn forward(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    fn requires_items(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Preparing | Self::Shipped | Self::Delivered
        )
    }
}

pub struct LifecycleEngine;

impl LifecycleEngine {
    pub fn can_transition(current: OrderStatus, next: OrderStatus) -> bool {
        if current == next {
            return true;
        }
        if current.is_terminal() {
            return false;
        }
        next == OrderStatus::Cancelled || current.forward() == Some(next)
    }

    pub fn valid_next_states(current: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|next| *next != current && Self::can_transition(current, *next))
            .collect()
    }

    /// Edge legality plus the record-level rule that an order without items
    /// never enters fulfillment.
    pub fn validate(order: &OrderRecord, next: OrderStatus) -> Result<(), TransitionError> {
        if !Self::can_transition(order.status, next) {
            return Err(TransitionError::IllegalEdge {
                from: order.status,
                to: next,
            });
        }
        if order.status != next && next.requires_items() && order.items.is_empty() {
            return Err(TransitionError::EmptyOrder {
                order_id: order.id.clone(),
            });
        }
        Ok(())
    }

    pub fn apply_transition(
        order: &OrderRecord,
        next: OrderStatus,
    ) -> Result<OrderRecord, TransitionError> {
        Self::apply_transition_at(order, next, Utc::now())
    }

    /// Returns the transitioned copy; `order` itself is never touched.
    ///
    /// A same-state request is a no-op and keeps `updated_at`. Otherwise
    /// `updated_at` strictly advances, even if `now` lags the stored stamp.
    pub fn apply_transition_at(
        order: &OrderRecord,
        next: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<OrderRecord, TransitionError> {
        Self::validate(order, next)?;

        let mut updated = order.clone();
        if order.status == next {
            return Ok(updated);
        }

        let floor = order.updated_at + Duration::milliseconds(1);
        updated.status = next;
        updated.updated_at = now.max(floor);
        tracing::debug!(
            order_id = %order.id,
            from = %order.status,
            to = %next,
            "order transition applied"
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::tests::{order_with, sample_item};

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    fn random_status(state: &mut u64) -> OrderStatus {
        OrderStatus::ALL[(lcg_next(state) % 6) as usize]
    }

    fn forward_index(status: OrderStatus) -> Option<usize> {
        OrderStatus::ALL[..5].iter().position(|s| *s == status)
    }

    #[test]
    fn status_roundtrip() {
        assert_eq!(
            "pending".parse::<OrderStatus>().ok(),
            Some(OrderStatus::Pending)
        );
        assert_eq!(
            "delivered".parse::<OrderStatus>().ok(),
            Some(OrderStatus::Delivered)
        );
        assert_eq!("completed".parse::<OrderStatus>().ok(), None);
        assert_eq!(OrderStatus::Preparing.to_string(), "preparing");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).unwrap(),
            "\"shipped\""
        );
    }

    #[test]
    fn same_state_is_always_legal() {
        for status in OrderStatus::ALL {
            assert!(LifecycleEngine::can_transition(status, status));
        }
    }

    #[test]
    fn forward_path_edges_are_legal() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(
                LifecycleEngine::can_transition(pair[0], pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
            assert!(!LifecycleEngine::can_transition(pair[1], pair[0]));
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        assert!(!LifecycleEngine::can_transition(
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ));
        for next in OrderStatus::ALL {
            if next != OrderStatus::Cancelled {
                assert!(!LifecycleEngine::can_transition(
                    OrderStatus::Cancelled,
                    next
                ));
            }
            if next != OrderStatus::Delivered {
                assert!(!LifecycleEngine::can_transition(
                    OrderStatus::Delivered,
                    next
                ));
            }
        }
        assert!(LifecycleEngine::valid_next_states(OrderStatus::Delivered).is_empty());
        assert!(LifecycleEngine::valid_next_states(OrderStatus::Cancelled).is_empty());
    }

    #[test]
    fn valid_next_states_lists_forward_then_cancel() {
        assert_eq!(
            LifecycleEngine::valid_next_states(OrderStatus::Pending),
            vec![OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert_eq!(
            LifecycleEngine::valid_next_states(OrderStatus::Shipped),
            vec![OrderStatus::Delivered, OrderStatus::Cancelled]
        );
    }

    #[test]
    fn transition_table_property_holds_for_randomized_pairs() {
        let mut seed = 0x00C0_FFEE_u64;
        for _ in 0..20_000 {
            let current = random_status(&mut seed);
            let next = random_status(&mut seed);
            let expected = if current == next {
                true
            } else if current.is_terminal() {
                false
            } else if next == OrderStatus::Cancelled {
                true
            } else {
                match (forward_index(current), forward_index(next)) {
                    (Some(a), Some(b)) => b == a + 1,
                    _ => false,
                }
            };
            assert_eq!(
                LifecycleEngine::can_transition(current, next),
                expected,
                "{current} -> {next}"
            );
        }
    }

    #[test]
    fn skipping_a_stage_is_rejected_with_the_attempted_edge() {
        let order = order_with("ord-1", OrderStatus::Pending, Decimal::from(50));
        let err = LifecycleEngine::apply_transition(&order, OrderStatus::Shipped).unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalEdge {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped
            }
        );
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn delivered_cannot_be_cancelled() {
        let order = order_with("ord-1", OrderStatus::Delivered, Decimal::from(50));
        assert!(matches!(
            LifecycleEngine::apply_transition(&order, OrderStatus::Cancelled),
            Err(TransitionError::IllegalEdge { .. })
        ));
    }

    #[test]
    fn accepted_transition_advances_updated_at() {
        let order = order_with("ord-1", OrderStatus::Shipped, Decimal::from(100));
        let now = order.updated_at + Duration::minutes(5);
        let delivered =
            LifecycleEngine::apply_transition_at(&order, OrderStatus::Delivered, now).unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.updated_at, now);
        assert_eq!(delivered.payment_status, order.payment_status);
        assert_eq!(delivered.payment_method, order.payment_method);
    }

    #[test]
    fn updated_at_advances_even_when_clock_lags() {
        let order = order_with("ord-1", OrderStatus::Pending, Decimal::from(10));
        let behind = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let confirmed =
            LifecycleEngine::apply_transition_at(&order, OrderStatus::Confirmed, behind).unwrap();
        assert!(confirmed.updated_at > order.updated_at);
    }

    #[test]
    fn same_state_transition_keeps_updated_at() {
        for status in OrderStatus::ALL {
            let order = order_with("ord-1", status, Decimal::from(10));
            let same = LifecycleEngine::apply_transition(&order, status).unwrap();
            assert_eq!(same.updated_at, order.updated_at);
            assert_eq!(same, order);
        }
    }

    #[test]
    fn empty_orders_cannot_enter_fulfillment() {
        let mut order = order_with("ord-9", OrderStatus::Pending, Decimal::ZERO);
        order.items.clear();
        assert_eq!(
            LifecycleEngine::validate(&order, OrderStatus::Confirmed),
            Err(TransitionError::EmptyOrder {
                order_id: "ord-9".to_string()
            })
        );
        assert!(LifecycleEngine::validate(&order, OrderStatus::Cancelled).is_ok());

        order.items.push(sample_item(Decimal::from(5), 2));
        assert!(LifecycleEngine::validate(&order, OrderStatus::Confirmed).is_ok());
    }

    #[test]
    fn random_walks_never_leave_a_terminal_status() {
        let mut seed = 0xDEAD_BEEF_u64;
        for _ in 0..2_000 {
            let mut order = order_with("walk", OrderStatus::Pending, Decimal::from(1));
            let mut terminal_at: Option<OrderStatus> = None;
            for _ in 0..12 {
                let next = random_status(&mut seed);
                if let Ok(updated) = LifecycleEngine::apply_transition(&order, next) {
                    assert!(updated.updated_at >= order.updated_at);
                    order = updated;
                }
                if let Some(terminal) = terminal_at {
                    assert_eq!(order.status, terminal);
                } else if order.status.is_terminal() {
                    terminal_at = Some(order.status);
                }
            }
        }
    }
}
