#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod query;
pub mod stats;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use controller::{AdminOrderController, ControllerConfig, LoadOutcome, OrderView};
pub use error::{Error, TransitionError};
pub use lifecycle::mapping::{
    TransitionEffects, action_label, affects_revenue, status_label, transition_effects,
};
pub use lifecycle::{LifecycleEngine, OrderStatus};
pub use memory::MemoryOrderService;
pub use query::{OrderFilter, OrderPage, OrderService};
pub use stats::{OrderStats, StatsAggregator};
pub use types::{
    Coordinates, Customer, DeliveryAddress, OrderItem, OrderRecord, PaymentMethod, PaymentStatus,
};
