// smartcart/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
  /// The server answered, but with a `reason` instead of a payload.
  #[error("Request rejected by server: {reason}")]
  Rejected { reason: String },

  #[error("Server response carried neither data nor a reason")]
  MissingData,

  #[error("Transport failure: {0}")]
  Transport(String),

  #[error("Failed to decode response: {0}")]
  Decode(String),

  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("Item store subscription failed for '{path}': {message}")]
  Subscription { path: String, message: String },

  #[error("Already observing basket {active}; cannot observe basket {requested} on the same aggregator")]
  ObservationConflict { active: i64, requested: i64 },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl From<reqwest::Error> for CartError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      CartError::Decode(err.to_string())
    } else {
      CartError::Transport(err.to_string())
    }
  }
}

impl From<url::ParseError> for CartError {
  fn from(err: url::ParseError) -> Self {
    CartError::Config(format!("invalid URL: {}", err))
  }
}

impl From<serde_json::Error> for CartError {
  fn from(err: serde_json::Error) -> Self {
    CartError::Decode(err.to_string())
  }
}

// Store and service implementations written against anyhow land here.
impl From<AnyhowError> for CartError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<CartError>() {
      Ok(cart_err) => cart_err,
      Err(other) => CartError::Internal(format!("{:#}", other)),
    }
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
