// smartcart/src/state/view_state.rs

//! The Loading / Success / Error state every screen renders, and the single
//! publisher that drives it.

use crate::error::{CartError, CartResult};
use crate::state::cell::StateCell;
use std::future::Future;
use tokio::sync::watch;
use tracing::{event, Level};

/// Tri-state outcome of a fetch as seen by a screen.
///
/// Starts out as `Loading`. `Success` and `Error` are terminal until the next
/// fetch is triggered, which resets the state to `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
  Loading,
  Success(T),
  Error(String),
}

impl<T> Default for ViewState<T> {
  fn default() -> Self {
    ViewState::Loading
  }
}

impl<T> ViewState<T> {
  /// A server `reason` is shown as sent; other failures use their description.
  pub fn from_result(result: CartResult<T>) -> Self {
    match result {
      Ok(payload) => ViewState::Success(payload),
      Err(CartError::Rejected { reason }) => ViewState::Error(reason),
      Err(err) => ViewState::Error(err.to_string()),
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, ViewState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, ViewState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, ViewState::Error(_))
  }

  pub fn success(&self) -> Option<&T> {
    match self {
      ViewState::Success(payload) => Some(payload),
      _ => None,
    }
  }

  pub fn success_mut(&mut self) -> Option<&mut T> {
    match self {
      ViewState::Success(payload) => Some(payload),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      ViewState::Error(message) => Some(message),
      _ => None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
    match self {
      ViewState::Loading => ViewState::Loading,
      ViewState::Success(payload) => ViewState::Success(f(payload)),
      ViewState::Error(message) => ViewState::Error(message),
    }
  }
}

/// A [`ViewState`] publisher for one kind of payload.
///
/// Repositories own one `Loadable` per operation they expose. Screens
/// subscribe and render whatever is current; there is no retry, a new
/// [`Loadable::load`] call is the only way out of `Error`.
#[derive(Debug)]
pub struct Loadable<T> {
  label: &'static str,
  cell: StateCell<ViewState<T>>,
}

impl<T> Loadable<T> {
  pub fn new(label: &'static str) -> Self {
    Self {
      label,
      cell: StateCell::new(ViewState::Loading),
    }
  }

  /// Resets to `Loading`, awaits `fetch`, and publishes its outcome.
  pub async fn load<F>(&self, fetch: F)
  where
    F: Future<Output = CartResult<T>>,
  {
    self.cell.set(ViewState::Loading);
    let result = fetch.await;
    if let Err(err) = &result {
      event!(Level::WARN, label = self.label, error = %err, "Load failed.");
    } else {
      event!(Level::DEBUG, label = self.label, "Load succeeded.");
    }
    self.cell.set(ViewState::from_result(result));
  }

  pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
    self.cell.subscribe()
  }

  pub fn is_loading(&self) -> bool {
    self.cell.read(ViewState::is_loading)
  }
}

impl<T: Clone> Loadable<T> {
  pub fn current(&self) -> ViewState<T> {
    self.cell.get()
  }
}

impl<T> Clone for Loadable<T> {
  fn clone(&self) -> Self {
    Self {
      label: self.label,
      cell: self.cell.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_result_keeps_server_reason_verbatim() {
    let state: ViewState<u8> = ViewState::from_result(Err(CartError::Rejected {
      reason: "not found".to_string(),
    }));
    assert_eq!(state.error(), Some("not found"));
  }

  #[test]
  fn from_result_describes_other_failures() {
    let state: ViewState<u8> = ViewState::from_result(Err(CartError::Transport("timed out".to_string())));
    assert_eq!(state.error(), Some("Transport failure: timed out"));
  }

  #[test]
  fn map_keeps_loading_and_error() {
    assert_eq!(ViewState::<u8>::Loading.map(|v| v + 1), ViewState::Loading);
    assert_eq!(
      ViewState::<u8>::Error("x".into()).map(|v| v + 1),
      ViewState::Error("x".into())
    );
    assert_eq!(ViewState::Success(1u8).map(|v| v + 1), ViewState::Success(2));
  }
}
