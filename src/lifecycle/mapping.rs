use serde::Serialize;

use crate::lifecycle::{LifecycleEngine, OrderStatus};

/// What accepting a transition implies for the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEffects {
    /// The admin must confirm before the request is sent.
    pub requires_confirmation: bool,
    /// Realized revenue changes, so stats must be recomputed before the next render.
    pub affects_revenue: bool,
}

/// Effects of moving from `current` to `next`, or `None` when the edge is illegal.
///
/// A same-state request has no effects at all.
pub fn transition_effects(current: OrderStatus, next: OrderStatus) -> Option<TransitionEffects> {
    if !LifecycleEngine::can_transition(current, next) {
        return None;
    }
    if current == next {
        return Some(TransitionEffects {
            requires_confirmation: false,
            affects_revenue: false,
        });
    }
    Some(TransitionEffects {
        requires_confirmation: next.is_terminal(),
        affects_revenue: affects_revenue(current, next),
    })
}

/// True when one side of the edge is `delivered`. Only delivered orders count
/// toward realized revenue.
pub fn affects_revenue(current: OrderStatus, next: OrderStatus) -> bool {
    current != next && (current == OrderStatus::Delivered || next == OrderStatus::Delivered)
}

/// Human-readable status label.
pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Pending",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Preparing => "Preparing",
        OrderStatus::Shipped => "Shipped",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}

/// Button label for the admin action that moves an order into `next`.
pub fn action_label(next: OrderStatus) -> &'static str {
    match next {
        OrderStatus::Pending => "Mark pending",
        OrderStatus::Confirmed => "Confirm order",
        OrderStatus::Preparing => "Start preparing",
        OrderStatus::Shipped => "Mark shipped",
        OrderStatus::Delivered => "Mark delivered",
        OrderStatus::Cancelled => "Cancel order",
    }
}
