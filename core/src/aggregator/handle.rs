// smartcart/src/aggregator/handle.rs

use crate::store::BasketId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;

struct HandleInner {
  basket_id: BasketId,
  /// Cleared once the subscription has ended, by cancellation or by the store.
  live: Arc<AtomicBool>,
  /// Cleared only by cancellation; fetches outstanding when the store ends
  /// the subscription may still publish until then.
  publishing: Arc<AtomicBool>,
  cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl HandleInner {
  fn cancel(&self) {
    // Cleared before signalling so no fetch completing in between can publish.
    self.publishing.store(false, Ordering::SeqCst);
    self.live.store(false, Ordering::SeqCst);
    if let Some(tx) = self.cancel_tx.lock().take() {
      let _ = tx.send(());
    }
  }
}

impl Drop for HandleInner {
  fn drop(&mut self) {
    self.cancel();
  }
}

/// Keeps one basket observation alive.
///
/// Clones share the observation. Calling [`ObservationHandle::cancel`], or
/// dropping the last clone, stops the listener, releases the store
/// subscription and aborts detail fetches still in flight. Owners tie this to
/// the lifetime of whatever screen shows the basket.
#[derive(Clone)]
pub struct ObservationHandle {
  inner: Arc<HandleInner>,
}

impl ObservationHandle {
  pub(crate) fn new(basket_id: BasketId) -> (Self, oneshot::Receiver<()>) {
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let handle = Self {
      inner: Arc::new(HandleInner {
        basket_id,
        live: Arc::new(AtomicBool::new(true)),
        publishing: Arc::new(AtomicBool::new(true)),
        cancel_tx: Mutex::new(Some(cancel_tx)),
      }),
    };
    (handle, cancel_rx)
  }

  pub fn basket_id(&self) -> BasketId {
    self.inner.basket_id
  }

  pub fn cancel(&self) {
    self.inner.cancel();
  }

  /// False once cancelled, or as soon as the store ends the subscription.
  pub fn is_active(&self) -> bool {
    self.inner.live.load(Ordering::SeqCst)
  }

  pub(crate) fn live_flag(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.inner.live)
  }

  pub(crate) fn publish_flag(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.inner.publishing)
  }

  pub(crate) fn downgrade(&self) -> WeakObservation {
    WeakObservation(Arc::downgrade(&self.inner))
  }
}

impl std::fmt::Debug for ObservationHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ObservationHandle")
      .field("basket_id", &self.inner.basket_id)
      .field("active", &self.is_active())
      .finish()
  }
}

/// Non-owning reference the aggregator keeps to its current observation.
pub(crate) struct WeakObservation(Weak<HandleInner>);

impl WeakObservation {
  /// The handle, if some owner still holds it.
  pub(crate) fn upgrade(&self) -> Option<ObservationHandle> {
    self.0.upgrade().map(|inner| ObservationHandle { inner })
  }

  /// The handle, if some owner still holds it and it has not ended.
  pub(crate) fn upgrade_active(&self) -> Option<ObservationHandle> {
    self.upgrade().filter(ObservationHandle::is_active)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dropping_last_clone_signals_cancel() {
    let (handle, mut cancel_rx) = ObservationHandle::new(BasketId(1));
    let clone = handle.clone();
    drop(handle);
    assert!(matches!(cancel_rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)));
    assert!(clone.is_active());
    drop(clone);
    assert!(cancel_rx.try_recv().is_ok());
  }

  #[test]
  fn weak_reference_does_not_keep_observation_alive() {
    let (handle, _cancel_rx) = ObservationHandle::new(BasketId(1));
    let weak = handle.downgrade();
    assert!(weak.upgrade_active().is_some());
    handle.cancel();
    assert!(weak.upgrade_active().is_none());
  }

  #[test]
  fn cancel_stops_publishing_but_ended_intake_does_not() {
    let (handle, _cancel_rx) = ObservationHandle::new(BasketId(1));
    let live = handle.live_flag();
    let publishing = handle.publish_flag();

    live.store(false, Ordering::SeqCst);
    assert!(!handle.is_active());
    assert!(publishing.load(Ordering::SeqCst));

    handle.cancel();
    assert!(!publishing.load(Ordering::SeqCst));
  }
}
