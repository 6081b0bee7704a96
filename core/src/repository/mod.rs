// smartcart/src/repository/mod.rs

//! Per-feature state holders. Each wraps one backend capability and publishes
//! the outcome of every call as a [`ViewState`](crate::state::ViewState).

pub mod category;
pub mod qr;
pub mod user;

pub use category::CategoryRepository;
pub use qr::QrRepository;
pub use user::UserRepository;

use crate::error::{CartError, CartResult};

fn require_token(token: &str) -> CartResult<()> {
  if token.trim().is_empty() {
    return Err(CartError::InvalidRequest("Authorization token cannot be empty".to_string()));
  }
  Ok(())
}
