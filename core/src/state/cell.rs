// smartcart/src/state/cell.rs
use std::sync::Arc;
use tokio::sync::watch;

/// A shared, observable value.
///
/// Every clone points at the same value. Writers go through [`StateCell::update`]
/// or [`StateCell::set`], which serialize on the inner lock and then wake every
/// receiver handed out by [`StateCell::subscribe`]. Updates are expressed as
/// closures over the current value, so two concurrent read-modify-write
/// sequences can never append onto a stale base.
///
/// IMPORTANT: The borrow taken inside `read` / `update` is a blocking lock and
/// MUST NOT be held across `.await` suspension points.
#[derive(Debug)]
pub struct StateCell<T>(Arc<watch::Sender<T>>);

impl<T> StateCell<T> {
  pub fn new(value: T) -> Self {
    let (tx, _rx) = watch::channel(value);
    StateCell(Arc::new(tx))
  }

  /// Projects the current value without cloning all of it.
  pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.0.borrow())
  }

  /// Applies `f` to the value under the write lock and notifies subscribers.
  pub fn update<F>(&self, f: F)
  where
    F: FnOnce(&mut T),
  {
    self.0.send_modify(f);
  }

  /// Like [`StateCell::update`], but only notifies subscribers when `f` returns true.
  pub fn update_if<F>(&self, f: F) -> bool
  where
    F: FnOnce(&mut T) -> bool,
  {
    self.0.send_if_modified(f)
  }

  /// Replaces the value, returning the previous one.
  pub fn set(&self, value: T) -> T {
    self.0.send_replace(value)
  }

  /// Receivers observe the value current at subscription time as already seen.
  pub fn subscribe(&self) -> watch::Receiver<T> {
    self.0.subscribe()
  }

  pub fn subscriber_count(&self) -> usize {
    self.0.receiver_count()
  }
}

impl<T: Clone> StateCell<T> {
  pub fn get(&self) -> T {
    self.0.borrow().clone()
  }
}

impl<T> Clone for StateCell<T> {
  fn clone(&self) -> Self {
    StateCell(Arc::clone(&self.0))
  }
}

impl<T: Default> Default for StateCell<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
