// smartcart/src/aggregator/items.rs

use crate::aggregator::AggregatorConfig;
use crate::api::{ApiResponse, ProductDetails};
use crate::error::{CartError, CartResult};

/// A fetched product variant, tagged with the store key that announced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
  pub key: String,
  pub details: ProductDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
  /// The service answered with a `reason`, e.g. `"not found"`.
  Rejected(String),
  /// The service answered with `data: null` and no reason.
  MissingData,
  /// The request never produced a usable envelope (network or decode failure).
  Transport(String),
}

/// A detail fetch that did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
  pub key: String,
  pub reason: FailureReason,
}

pub(crate) enum FetchOutcome {
  Fetched(ProductDetails),
  Failed(FailureReason),
}

impl FetchOutcome {
  pub(crate) fn from_response(response: CartResult<ApiResponse<ProductDetails>>) -> Self {
    match response.and_then(ApiResponse::into_result) {
      Ok(details) => FetchOutcome::Fetched(details),
      Err(CartError::Rejected { reason }) => FetchOutcome::Failed(FailureReason::Rejected(reason)),
      Err(CartError::MissingData) => FetchOutcome::Failed(FailureReason::MissingData),
      Err(other) => FetchOutcome::Failed(FailureReason::Transport(other.to_string())),
    }
  }
}

/// Everything observed for one basket so far.
///
/// `records` is in fetch-completion order, not event order. Without
/// `dedup_by_key` a key announced twice (added, then changed) yields two
/// records. `failures` holds the keys whose latest fetch failed; a later
/// success for the same key clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedItems {
  pub records: Vec<ProductRecord>,
  pub failures: Vec<ItemFailure>,
}

impl AggregatedItems {
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn details(&self) -> impl Iterator<Item = &ProductDetails> {
    self.records.iter().map(|r| &r.details)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.records.iter().any(|r| r.key == key)
  }

  pub fn failure_count(&self) -> usize {
    self.failures.len()
  }

  pub(crate) fn record_fetch(&mut self, key: String, outcome: FetchOutcome, config: &AggregatorConfig) {
    match outcome {
      FetchOutcome::Fetched(details) => {
        self.failures.retain(|f| f.key != key);
        let existing = if config.dedup_by_key {
          self.records.iter_mut().find(|r| r.key == key)
        } else {
          None
        };
        match existing {
          Some(record) => record.details = details,
          None => self.records.push(ProductRecord { key, details }),
        }
      }
      FetchOutcome::Failed(reason) => {
        if config.dedup_by_key {
          self.failures.retain(|f| f.key != key);
        }
        self.failures.push(ItemFailure { key, reason });
      }
    }
  }

  /// Drops every record and failure for `key`. Returns whether anything changed.
  pub(crate) fn remove_key(&mut self, key: &str) -> bool {
    let before = (self.records.len(), self.failures.len());
    self.records.retain(|r| r.key != key);
    self.failures.retain(|f| f.key != key);
    before != (self.records.len(), self.failures.len())
  }
}
