// smartcart/src/store/memory.rs

//! An in-process [`ItemStore`]. It behaves like an ordered child-event store:
//! a new subscriber first receives `Added` for every existing child in
//! insertion order, then live events.

use crate::error::{CartError, CartResult};
use crate::store::{BasketPath, ChildEvent, ChildEvents, ItemStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{event, Level};

#[derive(Default)]
struct Collection {
  children: Vec<String>,
  subscribers: Vec<mpsc::UnboundedSender<ChildEvent>>,
}

impl Collection {
  fn previous_of(&self, key: &str) -> Option<String> {
    let idx = self.children.iter().position(|c| c == key)?;
    idx.checked_sub(1).map(|i| self.children[i].clone())
  }

  fn broadcast(&mut self, event: ChildEvent) {
    self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
  }
}

#[derive(Default)]
struct Inner {
  collections: HashMap<BasketPath, Collection>,
  unavailable: Option<String>,
}

/// Cheap to clone; all clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryItemStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryItemStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Writes `key` under `path`. A new key fires `Added`, an existing one `Changed`.
  pub fn insert(&self, path: &BasketPath, key: &str) {
    let mut inner = self.inner.lock();
    let collection = inner.collections.entry(path.clone()).or_default();
    let event = if collection.children.iter().any(|c| c == key) {
      ChildEvent::Changed {
        key: key.to_string(),
        previous: collection.previous_of(key),
      }
    } else {
      let previous = collection.children.last().cloned();
      collection.children.push(key.to_string());
      ChildEvent::Added {
        key: key.to_string(),
        previous,
      }
    };
    event!(Level::TRACE, %path, ?event, "Memory store write.");
    collection.broadcast(event);
  }

  /// Fires `Changed` for an existing key. Returns false if the key is absent.
  pub fn touch(&self, path: &BasketPath, key: &str) -> bool {
    let mut inner = self.inner.lock();
    let Some(collection) = inner.collections.get_mut(path) else {
      return false;
    };
    if !collection.children.iter().any(|c| c == key) {
      return false;
    }
    let previous = collection.previous_of(key);
    collection.broadcast(ChildEvent::Changed {
      key: key.to_string(),
      previous,
    });
    true
  }

  pub fn remove(&self, path: &BasketPath, key: &str) -> bool {
    let mut inner = self.inner.lock();
    let Some(collection) = inner.collections.get_mut(path) else {
      return false;
    };
    let Some(idx) = collection.children.iter().position(|c| c == key) else {
      return false;
    };
    collection.children.remove(idx);
    collection.broadcast(ChildEvent::Removed { key: key.to_string() });
    true
  }

  /// Moves `key` to sit right after `after` (or first when `None`) and fires `Moved`.
  pub fn move_after(&self, path: &BasketPath, key: &str, after: Option<&str>) -> bool {
    let mut inner = self.inner.lock();
    let Some(collection) = inner.collections.get_mut(path) else {
      return false;
    };
    let Some(idx) = collection.children.iter().position(|c| c == key) else {
      return false;
    };
    let child = collection.children.remove(idx);
    let target = match after {
      None => 0,
      Some(prev) => match collection.children.iter().position(|c| c == prev) {
        Some(p) => p + 1,
        None => {
          collection.children.insert(idx, child);
          return false;
        }
      },
    };
    collection.children.insert(target, child);
    collection.broadcast(ChildEvent::Moved {
      key: key.to_string(),
      previous: after.map(str::to_string),
    });
    true
  }

  /// Sends `Cancelled` to every subscriber of `path` and drops them.
  pub fn cancel(&self, path: &BasketPath, message: &str) {
    let mut inner = self.inner.lock();
    if let Some(collection) = inner.collections.get_mut(path) {
      collection.broadcast(ChildEvent::Cancelled {
        message: message.to_string(),
      });
      collection.subscribers.clear();
    }
  }

  /// While set, `subscribe` fails with `message`.
  pub fn set_unavailable(&self, message: Option<&str>) {
    self.inner.lock().unavailable = message.map(str::to_string);
  }

  pub fn children(&self, path: &BasketPath) -> Vec<String> {
    self
      .inner
      .lock()
      .collections
      .get(path)
      .map(|c| c.children.clone())
      .unwrap_or_default()
  }

  /// Live subscribers of `path`. Receivers dropped since the last write are
  /// discounted here as well.
  pub fn subscriber_count(&self, path: &BasketPath) -> usize {
    let mut inner = self.inner.lock();
    match inner.collections.get_mut(path) {
      Some(collection) => {
        collection.subscribers.retain(|tx| !tx.is_closed());
        collection.subscribers.len()
      }
      None => 0,
    }
  }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
  async fn subscribe(&self, path: &BasketPath) -> CartResult<ChildEvents> {
    let mut inner = self.inner.lock();
    if let Some(message) = &inner.unavailable {
      return Err(CartError::Subscription {
        path: path.to_string(),
        message: message.clone(),
      });
    }

    let (tx, events) = ChildEvents::channel();
    let collection = inner.collections.entry(path.clone()).or_default();
    let mut previous = None;
    for key in &collection.children {
      // The receiver is alive in this scope.
      let _ = tx.send(ChildEvent::Added {
        key: key.clone(),
        previous: previous.clone(),
      });
      previous = Some(key.clone());
    }
    collection.subscribers.push(tx);
    event!(Level::DEBUG, %path, replayed = collection.children.len(), "Memory store subscription opened.");
    Ok(events)
  }
}
