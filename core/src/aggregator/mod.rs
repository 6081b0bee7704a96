// smartcart/src/aggregator/mod.rs

//! Live aggregation of a basket's items.
//!
//! An [`ItemAggregator`] holds at most one store subscription. Every `Added`
//! or `Changed` child event triggers an independent detail fetch; each
//! completed fetch is folded into the published [`AggregatedItems`] with one
//! atomic update, so fetches racing each other never lose a record. Results
//! land in completion order.

pub mod handle;
pub mod items;

pub use handle::ObservationHandle;
pub use items::{AggregatedItems, FailureReason, ItemFailure, ProductRecord};

use crate::aggregator::handle::WeakObservation;
use crate::aggregator::items::FetchOutcome;
use crate::api::ProductDetailService;
use crate::error::{CartError, CartResult};
use crate::state::{StateCell, ViewState};
use crate::store::{BasketId, BasketPath, ChildEvent, ChildEvents, ItemStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinSet;
use tracing::{event, instrument, Instrument, Level};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatorConfig {
  /// Prefix above `SmartBaskets/...`; empty for the store root.
  pub store_root: String,
  /// Replace the record for a key on repeated fetches instead of appending another.
  pub dedup_by_key: bool,
  /// Drop a key's records when the store reports the child removed.
  pub remove_on_child_removed: bool,
}

pub struct ItemAggregator {
  store: Arc<dyn ItemStore>,
  details: Arc<dyn ProductDetailService>,
  config: AggregatorConfig,
  state: StateCell<ViewState<AggregatedItems>>,
  active: Mutex<Option<WeakObservation>>,
}

impl ItemAggregator {
  pub fn new(store: Arc<dyn ItemStore>, details: Arc<dyn ProductDetailService>, config: AggregatorConfig) -> Self {
    Self {
      store,
      details,
      config,
      state: StateCell::new(ViewState::Loading),
      active: Mutex::new(None),
    }
  }

  pub fn config(&self) -> &AggregatorConfig {
    &self.config
  }

  /// `Loading` until the first subscription opens, then `Success` with the
  /// live list. `Error` only if the store refused the subscription; per-item
  /// fetch failures show up in [`AggregatedItems::failures`] instead.
  pub fn items(&self) -> watch::Receiver<ViewState<AggregatedItems>> {
    self.state.subscribe()
  }

  pub fn snapshot(&self) -> ViewState<AggregatedItems> {
    self.state.get()
  }

  pub fn active_basket(&self) -> Option<BasketId> {
    self
      .active
      .lock()
      .as_ref()
      .and_then(WeakObservation::upgrade_active)
      .map(|h| h.basket_id())
  }

  /// Starts observing `basket_id`.
  ///
  /// While an observation of the same basket is live this returns a clone of
  /// its handle and opens nothing new. A live observation of another basket
  /// is a [`CartError::ObservationConflict`]. Once the store has ended the
  /// current subscription, any basket may be observed again; fetches left
  /// over from the ended subscription are discarded. The observation lasts
  /// as long as some clone of the returned handle does.
  #[instrument(name = "ItemAggregator::observe", skip(self), fields(basket_id = %basket_id))]
  pub async fn observe(&self, basket_id: BasketId) -> CartResult<ObservationHandle> {
    let (handle, cancel_rx) = {
      let mut active = self.active.lock();
      if let Some(current) = active.as_ref().and_then(WeakObservation::upgrade) {
        if current.is_active() {
          if current.basket_id() == basket_id {
            event!(Level::DEBUG, "Basket already observed; reusing the live subscription.");
            return Ok(current);
          }
          event!(Level::WARN, active = %current.basket_id(), "Refusing to observe a second basket.");
          return Err(CartError::ObservationConflict {
            active: current.basket_id().get(),
            requested: basket_id.get(),
          });
        }
        // The store ended that subscription; stop its remaining fetches from
        // publishing into the list about to be reset.
        current.cancel();
      }
      // Reserve the slot before awaiting so a concurrent call sees it.
      let (handle, cancel_rx) = ObservationHandle::new(basket_id);
      *active = Some(handle.downgrade());
      (handle, cancel_rx)
    };

    self.state.set(ViewState::Loading);
    let path = BasketPath::new(&self.config.store_root, basket_id);
    let events = match self.store.subscribe(&path).await {
      Ok(events) => events,
      Err(err) => {
        event!(Level::ERROR, %path, error = %err, "Item store subscription failed.");
        handle.cancel();
        self.state.set(ViewState::Error(err.to_string()));
        return Err(err);
      }
    };
    event!(Level::INFO, %path, "Observing basket items.");
    self.state.set(ViewState::Success(AggregatedItems::default()));

    let listener = Listener {
      details: Arc::clone(&self.details),
      config: self.config.clone(),
      state: self.state.clone(),
      live: handle.live_flag(),
      publishing: handle.publish_flag(),
      removals: Arc::new(Mutex::new(HashMap::new())),
    };
    let span = tracing::info_span!("basket_listener", %path);
    tokio::spawn(listener.run(events, cancel_rx).instrument(span));
    Ok(handle)
  }
}

struct Listener {
  details: Arc<dyn ProductDetailService>,
  config: AggregatorConfig,
  state: StateCell<ViewState<AggregatedItems>>,
  live: Arc<AtomicBool>,
  publishing: Arc<AtomicBool>,
  /// Per-key count of applied removals. A fetch only folds if its key saw no
  /// removal since the fetch was spawned.
  removals: Arc<Mutex<HashMap<String, u64>>>,
}

impl Listener {
  async fn run(self, mut events: ChildEvents, mut cancel_rx: oneshot::Receiver<()>) {
    let mut fetches = JoinSet::new();
    let mut events_open = true;

    loop {
      if !events_open && fetches.is_empty() {
        break;
      }
      tokio::select! {
        _ = &mut cancel_rx => {
          event!(Level::INFO, in_flight = fetches.len(), "Observation cancelled.");
          break;
        }
        next = events.next(), if events_open => match next {
          Some(child_event) => {
            if !self.on_child_event(child_event, &mut fetches) {
              events_open = false;
              self.live.store(false, Ordering::SeqCst);
            }
          }
          None => {
            event!(Level::DEBUG, "Item store closed the subscription.");
            events_open = false;
            self.live.store(false, Ordering::SeqCst);
          }
        },
        Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
          if let Err(err) = joined {
            if err.is_panic() {
              event!(Level::ERROR, error = %err, "Detail fetch task panicked.");
            }
          }
        }
      }
    }

    self.live.store(false, Ordering::SeqCst);
    self.publishing.store(false, Ordering::SeqCst);
    fetches.shutdown().await;
    drop(events);
    event!(Level::DEBUG, "Basket listener stopped.");
  }

  /// Returns false once the store has ended the subscription.
  fn on_child_event(&self, child_event: ChildEvent, fetches: &mut JoinSet<()>) -> bool {
    match child_event {
      ChildEvent::Added { key, .. } | ChildEvent::Changed { key, .. } => {
        if key.is_empty() {
          event!(Level::ERROR, "Child event without a product id.");
        } else {
          event!(Level::DEBUG, product_id = %key, "Product announced; fetching details.");
          self.spawn_fetch(key, fetches);
        }
        true
      }
      ChildEvent::Removed { key } => {
        if self.config.remove_on_child_removed {
          // Bumped before folding so a fetch for this key that has not landed yet is discarded.
          *self.removals.lock().entry(key.clone()).or_default() += 1;
          let publishing = &self.publishing;
          let removed = self.state.update_if(|state| {
            publishing.load(Ordering::SeqCst) && state.success_mut().is_some_and(|items| items.remove_key(&key))
          });
          event!(Level::INFO, product_id = %key, removed, "Child removed.");
        } else {
          event!(Level::INFO, product_id = %key, "Child removed; keeping its records.");
        }
        true
      }
      ChildEvent::Moved { key, previous } => {
        event!(Level::DEBUG, product_id = %key, ?previous, "Child moved.");
        true
      }
      ChildEvent::Cancelled { message } => {
        event!(Level::WARN, %message, "Item store cancelled the subscription; not resubscribing.");
        false
      }
    }
  }

  fn spawn_fetch(&self, key: String, fetches: &mut JoinSet<()>) {
    let details = Arc::clone(&self.details);
    let state = self.state.clone();
    let publishing = Arc::clone(&self.publishing);
    let removals = Arc::clone(&self.removals);
    let removals_at_spawn = removal_count(&removals, &key);
    let config = self.config.clone();
    let span = tracing::debug_span!("detail_fetch", product_id = %key);

    fetches.spawn(
      async move {
        let outcome = FetchOutcome::from_response(details.product_details(&key).await);
        match &outcome {
          FetchOutcome::Fetched(_) => event!(Level::DEBUG, "Product details fetched."),
          FetchOutcome::Failed(reason) => event!(Level::WARN, ?reason, "Product detail fetch failed; no record added."),
        }
        let mut superseded = false;
        state.update_if(|view| {
          if !publishing.load(Ordering::SeqCst) {
            return false;
          }
          if removal_count(&removals, &key) != removals_at_spawn {
            superseded = true;
            return false;
          }
          match view.success_mut() {
            Some(items) => {
              items.record_fetch(key, outcome, &config);
              true
            }
            None => false,
          }
        });
        if superseded {
          event!(Level::DEBUG, "Product removed while its details were loading; result discarded.");
        }
      }
      .instrument(span),
    );
  }
}

fn removal_count(removals: &Mutex<HashMap<String, u64>>, key: &str) -> u64 {
  removals.lock().get(key).copied().unwrap_or(0)
}
