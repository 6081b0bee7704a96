// smartcart/src/store/mod.rs

//! The real-time item store a physical cart writes into.
//!
//! A basket owns a collection of child keys (product ids) under
//! `{root}/SmartBaskets/{basketId}/items`. The store pushes child events for
//! that collection to every subscriber; the value under a key carries no
//! meaning, its presence is the signal.

pub mod memory;

pub use memory::MemoryItemStore;

use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc;

pub const BASKETS_NODE: &str = "SmartBaskets";
pub const ITEMS_NODE: &str = "items";

/// Server-assigned id of a physical cart, learned through pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasketId(pub i64);

impl BasketId {
  pub fn get(self) -> i64 {
    self.0
  }
}

impl fmt::Display for BasketId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for BasketId {
  type Err = CartError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.trim()
      .parse::<i64>()
      .map(BasketId)
      .map_err(|e| CartError::InvalidRequest(format!("invalid basket id '{}': {}", s, e)))
  }
}

impl From<i64> for BasketId {
  fn from(id: i64) -> Self {
    BasketId(id)
  }
}

/// Location of a basket's item collection in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasketPath {
  root: String,
  basket_id: BasketId,
}

impl BasketPath {
  /// `root` may be empty; surrounding slashes are ignored.
  pub fn new(root: &str, basket_id: BasketId) -> Self {
    Self {
      root: root.trim_matches('/').to_string(),
      basket_id,
    }
  }

  pub fn basket_id(&self) -> BasketId {
    self.basket_id
  }

  pub fn item_path(&self, product_id: &str) -> String {
    format!("{}/{}", self, product_id)
  }
}

impl fmt::Display for BasketPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.root.is_empty() {
      write!(f, "{}/", self.root)?;
    }
    write!(f, "{}/{}/{}", BASKETS_NODE, self.basket_id, ITEMS_NODE)
  }
}

/// A notification about one child of a basket's item collection.
///
/// `previous` is the key of the sibling ordered immediately before the child,
/// if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEvent {
  Added { key: String, previous: Option<String> },
  Changed { key: String, previous: Option<String> },
  Removed { key: String },
  Moved { key: String, previous: Option<String> },
  /// Terminal: the store will deliver nothing further on this subscription.
  Cancelled { message: String },
}

impl ChildEvent {
  pub fn key(&self) -> Option<&str> {
    match self {
      ChildEvent::Added { key, .. }
      | ChildEvent::Changed { key, .. }
      | ChildEvent::Removed { key }
      | ChildEvent::Moved { key, .. } => Some(key),
      ChildEvent::Cancelled { .. } => None,
    }
  }
}

/// Receiving side of one store subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ChildEvents {
  rx: mpsc::UnboundedReceiver<ChildEvent>,
}

impl ChildEvents {
  /// Creates a connected pair for store implementations to feed.
  pub fn channel() -> (mpsc::UnboundedSender<ChildEvent>, ChildEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChildEvents { rx })
  }

  /// `None` once the store side has gone away.
  pub async fn next(&mut self) -> Option<ChildEvent> {
    self.rx.recv().await
  }
}

#[async_trait]
pub trait ItemStore: Send + Sync {
  /// Opens one persistent child-event subscription on `path`.
  async fn subscribe(&self, path: &BasketPath) -> CartResult<ChildEvents>;
}
