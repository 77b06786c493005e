use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::Error;
use crate::lifecycle::mapping::{self, TransitionEffects};
use crate::lifecycle::{LifecycleEngine, OrderStatus};
use crate::query::{DEFAULT_PAGE_LIMIT, OrderFilter, OrderPage, OrderService};
use crate::stats::{OrderStats, StatsAggregator};
use crate::types::OrderRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Orders per displayed page.
    pub page_size: usize,
    /// Orders per request when walking the full collection for stats.
    pub stats_batch_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_LIMIT,
            stats_batch_size: 100,
        }
    }
}

impl ControllerConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::Config {
                reason: "pageSize must be at least 1".into(),
            });
        }
        if self.stats_batch_size == 0 {
            return Err(Error::Config {
                reason: "statsBatchSize must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued while this one was in flight; its response was dropped.
    Superseded,
}

/// What the admin screen renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub filter: OrderFilter,
    pub page: OrderPage,
    /// `None` until the first successful stats pass.
    pub stats: Option<OrderStats>,
    /// The last page load failed; `page` and `filter` are from an earlier load.
    pub page_stale: bool,
    /// The last stats pass failed; `stats` are from an earlier pass.
    pub stats_stale: bool,
    /// Cleared once both page and stats are fresh again.
    pub last_error: Option<String>,
}

impl OrderView {
    pub fn find(&self, order_id: &str) -> Option<&OrderRecord> {
        self.page.orders.iter().find(|o| o.id == order_id)
    }

    pub fn is_stale(&self) -> bool {
        self.page_stale || self.stats_stale
    }

    pub fn next_page(&self) -> Option<OrderFilter> {
        let offset = self.filter.offset.saturating_add(self.filter.limit);
        (offset < self.page.total_matching).then(|| {
            let mut filter = self.filter.clone();
            filter.offset = offset;
            filter
        })
    }

    pub fn previous_page(&self) -> Option<OrderFilter> {
        (self.filter.offset > 0).then(|| {
            let mut filter = self.filter.clone();
            filter.offset = self.filter.offset.saturating_sub(self.filter.limit);
            filter
        })
    }
}

/// Drives the admin order list: loads pages, validates status changes locally,
/// submits them, and reloads from the service after every accepted change.
///
/// The local page is never patched in place. Responses that arrive after a
/// newer request of the same kind was issued are discarded.
pub struct AdminOrderController<S> {
    service: S,
    config: ControllerConfig,
    view: Mutex<OrderView>,
    /// Filter of the newest `load_page` call, applied or not. Reloads target it.
    requested_filter: Mutex<OrderFilter>,
    page_generation: AtomicU64,
    stats_generation: AtomicU64,
}

impl<S: OrderService> AdminOrderController<S> {
    pub fn new(service: S, config: ControllerConfig) -> Self {
        let filter = OrderFilter::all().page(config.page_size, 0);
        let view = OrderView {
            filter: filter.clone(),
            ..OrderView::default()
        };
        Self {
            service,
            config,
            view: Mutex::new(view),
            requested_filter: Mutex::new(filter),
            page_generation: AtomicU64::new(0),
            stats_generation: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// First-page filter for the given status tab and search box contents.
    pub fn filter(&self, status: Option<OrderStatus>, search: Option<&str>) -> OrderFilter {
        OrderFilter {
            status,
            search: search.map(str::to_string),
            limit: self.config.page_size,
            offset: 0,
        }
    }

    pub async fn view(&self) -> OrderView {
        self.view.lock().await.clone()
    }

    #[instrument(
        skip(self, filter),
        fields(status = ?filter.status, search = ?filter.search, offset = filter.offset)
    )]
    pub async fn load_page(&self, filter: OrderFilter) -> Result<LoadOutcome, Error> {
        let generation = {
            let mut requested = self.requested_filter.lock().await;
            requested.clone_from(&filter);
            self.page_generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        let result = self.service.orders_list(&filter).await;

        let mut view = self.view.lock().await;
        if self.page_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded page response");
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(page) => {
                debug!(
                    returned = page.orders.len(),
                    total_matching = page.total_matching,
                    "page loaded"
                );
                view.filter = filter;
                view.page = page;
                view.page_stale = false;
                if !view.stats_stale {
                    view.last_error = None;
                }
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, "page load failed, keeping previous page");
                view.page_stale = true;
                view.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Recomputes dashboard stats over the whole unfiltered collection.
    #[instrument(skip(self))]
    pub async fn refresh_stats(&self) -> Result<LoadOutcome, Error> {
        let generation = self.stats_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self
            .collect_all()
            .await
            .map(|orders| StatsAggregator::aggregate(&orders));

        let mut view = self.view.lock().await;
        if self.stats_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded stats");
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(stats) => {
                debug!(
                    total = stats.total,
                    revenue = %stats.total_revenue,
                    "stats refreshed"
                );
                view.stats = Some(stats);
                view.stats_stale = false;
                if !view.page_stale {
                    view.last_error = None;
                }
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, "stats refresh failed, keeping previous stats");
                view.stats_stale = true;
                view.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reloads the most recently requested page and the stats. Both are
    /// attempted; the first error is returned.
    ///
    /// The requested filter wins over the displayed one, so a reload never
    /// supersedes a newer filter that is still in flight or that failed.
    pub async fn reload(&self) -> Result<(), Error> {
        let filter = self.requested_filter.lock().await.clone();
        let page = self.load_page(filter).await;
        let stats = self.refresh_stats().await;
        page.and(stats).map(|_| ())
    }

    /// Validates a status change against the loaded copy and reports what
    /// accepting it implies, without contacting the service.
    pub async fn preview_status_change(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> Result<TransitionEffects, Error> {
        let local = self.checked_local(order_id, next).await?;
        // `checked_local` accepted the edge, so effects are always present.
        Ok(mapping::transition_effects(local.status, next).unwrap_or_default())
    }

    /// Returns the service's record on success. The local page is refreshed
    /// from the service afterwards rather than patched.
    #[instrument(skip(self))]
    pub async fn request_status_change(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> Result<OrderRecord, Error> {
        let local = self.checked_local(order_id, next).await?;
        if local.status == next {
            debug!("status unchanged, nothing to submit");
            return Ok(local);
        }

        match self.service.orders_update_status(order_id, next).await {
            Ok(updated) => {
                info!(
                    from = %local.status,
                    to = %updated.status,
                    affects_revenue = mapping::affects_revenue(local.status, updated.status),
                    "status change accepted"
                );
                if let Err(e) = self.reload().await {
                    warn!(error = %e, "reload after status change failed");
                }
                Ok(updated)
            }
            Err(e) if e.requires_reload() => {
                warn!(error = %e, "order missing upstream, forcing reload");
                if let Err(reload_err) = self.reload().await {
                    warn!(error = %reload_err, "forced reload failed");
                }
                self.view.lock().await.last_error = Some(e.to_string());
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "status change failed");
                self.view.lock().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn checked_local(&self, order_id: &str, next: OrderStatus) -> Result<OrderRecord, Error> {
        let Some(local) = self.view.lock().await.find(order_id).cloned() else {
            warn!(order_id, "order is not in the loaded page");
            return Err(Error::not_found(order_id));
        };
        LifecycleEngine::validate(&local, next).map_err(|e| {
            warn!(order_id, error = %e, "status change rejected locally");
            Error::from(e)
        })?;
        Ok(local)
    }

    async fn collect_all(&self) -> Result<Vec<OrderRecord>, Error> {
        let mut seen = HashSet::new();
        let mut orders = Vec::new();
        let mut offset = 0;
        loop {
            let filter = OrderFilter::all().page(self.config.stats_batch_size, offset);
            let page = self.service.orders_list(&filter).await?;
            let fetched = page.orders.len();
            offset += fetched;
            // Records can shift between pages while another admin edits; count each id once.
            orders.extend(
                page.orders
                    .into_iter()
                    .filter(|o| seen.insert(o.id.clone())),
            );
            if fetched == 0 || offset >= page.total_matching {
                break;
            }
        }
        Ok(orders)
    }
}
