use crate::lifecycle::OrderStatus;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot move order from {from} to {to}")]
    IllegalEdge { from: OrderStatus, to: OrderStatus },

    #[error("order {order_id} has no items and cannot be fulfilled")]
    EmptyOrder { order_id: String },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] TransitionError),

    #[error("order service unavailable: {reason}")]
    Transport { reason: String },

    #[error("order {order_id} was not found, reload the list")]
    NotFound { order_id: String },

    #[error("invalid order record: {reason}")]
    InvalidRecord { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn not_found(order_id: impl Into<String>) -> Self {
        Self::NotFound {
            order_id: order_id.into(),
        }
    }

    /// Only transport failures are worth retrying as-is; everything else needs
    /// a different request or a reload first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn requires_reload(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
