use chrono::{DateTime, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::lifecycle::mapping;
use crate::lifecycle::{LifecycleEngine, OrderStatus};
use crate::query::OrderFilter;
use crate::stats::StatsAggregator;
use crate::types::OrderRecord;

/// Maps become plain JS objects rather than `Map` instances.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn parse_status(s: &str) -> Option<OrderStatus> {
    s.parse::<OrderStatus>().ok()
}

fn error_result(msg: &str) -> JsValue {
    to_js(&serde_json::json!({ "error": msg }))
}

fn parse_orders(json: &str) -> Result<Vec<OrderRecord>, JsValue> {
    serde_json::from_str(json).map_err(|e| error_result(&format!("Invalid orders JSON: {e}")))
}

/// Whether `current -> next` is a legal status change. Unknown names are never legal.
#[wasm_bindgen]
pub fn can_transition(current: &str, next: &str) -> bool {
    match (parse_status(current), parse_status(next)) {
        (Some(current), Some(next)) => LifecycleEngine::can_transition(current, next),
        _ => false,
    }
}

/// Statuses offered in the admin picker, with their labels.
#[wasm_bindgen]
pub fn valid_next_states(current: &str) -> JsValue {
    let Some(current) = parse_status(current) else {
        return error_result("Unknown status");
    };
    let options: Vec<serde_json::Value> = LifecycleEngine::valid_next_states(current)
        .into_iter()
        .map(|next| {
            serde_json::json!({
                "status": next.as_ref(),
                "label": mapping::status_label(next),
                "action": mapping::action_label(next),
            })
        })
        .collect();
    to_js(&options)
}

#[wasm_bindgen]
pub fn transition_effects(current: &str, next: &str) -> JsValue {
    let (Some(current), Some(next)) = (parse_status(current), parse_status(next)) else {
        return error_result("Unknown status");
    };
    match mapping::transition_effects(current, next) {
        Some(effects) => to_js(&effects),
        None => error_result(&format!("cannot move order from {current} to {next}")),
    }
}

/// Applies a status change to a single order JSON using `now_millis` as the clock.
#[wasm_bindgen]
pub fn apply_transition(order_json: &str, next: &str, now_millis: f64) -> JsValue {
    let Some(next) = parse_status(next) else {
        return error_result("Unknown status");
    };
    let order: OrderRecord = match serde_json::from_str(order_json) {
        Ok(order) => order,
        Err(e) => return error_result(&format!("Invalid order JSON: {e}")),
    };
    let Some(now) = DateTime::<Utc>::from_timestamp_millis(now_millis as i64) else {
        return error_result("Invalid timestamp");
    };
    match LifecycleEngine::apply_transition_at(&order, next, now) {
        Ok(updated) => to_js(&updated),
        Err(e) => error_result(&e.to_string()),
    }
}

#[wasm_bindgen]
pub fn aggregate_stats(orders_json: &str) -> JsValue {
    match parse_orders(orders_json) {
        Ok(orders) => to_js(&StatsAggregator::aggregate(&orders)),
        Err(err) => err,
    }
}

/// Evaluates a list filter locally, returning `{ orders, totalMatching }`.
#[wasm_bindgen]
pub fn filter_orders(orders_json: &str, filter_json: &str) -> JsValue {
    let orders = match parse_orders(orders_json) {
        Ok(orders) => orders,
        Err(err) => return err,
    };
    let filter: OrderFilter = match serde_json::from_str(filter_json) {
        Ok(filter) => filter,
        Err(e) => return error_result(&format!("Invalid filter JSON: {e}")),
    };
    to_js(&filter.apply(&orders))
}

#[wasm_bindgen]
pub fn status_label(status: &str) -> Option<String> {
    parse_status(status).map(|s| mapping::status_label(s).to_string())
}

/// Check if a status string is terminal.
#[wasm_bindgen]
pub fn is_terminal(status: &str) -> bool {
    parse_status(status).is_some_and(OrderStatus::is_terminal)
}
