// smartcart/src/api/envelope.rs

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};

/// The `{ data, reason, stack }` envelope every backend endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
  pub data: Option<T>,
  pub reason: Option<String>,
  pub stack: Option<String>,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self {
      data: Some(data),
      reason: None,
      stack: None,
    }
  }

  pub fn rejected(reason: impl Into<String>) -> Self {
    Self {
      data: None,
      reason: Some(reason.into()),
      stack: None,
    }
  }

  /// A set `reason` wins over any payload: the server flagged the request as failed.
  pub fn into_result(self) -> CartResult<T> {
    match (self.data, self.reason) {
      (_, Some(reason)) => Err(CartError::Rejected { reason }),
      (Some(data), None) => Ok(data),
      (None, None) => Err(CartError::MissingData),
    }
  }
}
