// smartcart/demos/cart_monitor/src/errors.rs

use smartcart::CartError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Smart Cart Error: {source}")]
  Cart {
    #[from]
    source: CartError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<CartError>() {
        Ok(source) => AppError::Cart { source },
        Err(other) => AppError::Internal(format!("{:#}", other)),
      },
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
