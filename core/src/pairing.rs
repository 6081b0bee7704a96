// smartcart/src/pairing.rs

//! Cart pairing notifications.
//!
//! After the user scans a cart's QR code the backend pushes a message whose
//! data carries `code` and `smartBasketId`. [`PairingEvents`] turns accepted
//! requests into [`PairingEvent`]s for whoever owns a subscription; the latest
//! pairing is retained so a screen subscribing late still sees it.

use crate::store::BasketId;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{event, Level};

pub const CODE_KEY: &str = "code";
pub const BASKET_ID_KEY: &str = "smartBasketId";
pub const CONNECTION_ACCEPTED: &str = "CONNECTION_REQUEST_ACCEPTED";

/// The fields of a push message that matter for pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingMessage {
  pub code: Option<String>,
  pub smart_basket_id: Option<String>,
}

impl PairingMessage {
  pub fn from_data(data: &HashMap<String, String>) -> Self {
    Self {
      code: data.get(CODE_KEY).cloned(),
      smart_basket_id: data.get(BASKET_ID_KEY).cloned(),
    }
  }

  pub fn is_accepted(&self) -> bool {
    self.code.as_deref() == Some(CONNECTION_ACCEPTED)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingEvent {
  pub basket_id: BasketId,
}

/// Owned channel between the push-message handler and the pairing screen.
#[derive(Debug, Clone)]
pub struct PairingEvents {
  tx: watch::Sender<Option<PairingEvent>>,
}

impl PairingEvents {
  #[allow(clippy::new_without_default)]
  pub fn new() -> Self {
    Self {
      tx: watch::channel(None).0,
    }
  }

  /// Publishes a pairing if `data` is an accepted connection request with a
  /// numeric basket id. Anything else is logged and ignored.
  pub fn handle_message(&self, data: &HashMap<String, String>) -> Option<PairingEvent> {
    let message = PairingMessage::from_data(data);
    event!(Level::DEBUG, ?message, "Push message received.");
    if !message.is_accepted() {
      return None;
    }
    let raw_id = message.smart_basket_id.as_deref().unwrap_or_default();
    match raw_id.parse::<BasketId>() {
      Ok(basket_id) => {
        let pairing = PairingEvent { basket_id };
        event!(Level::INFO, %basket_id, "Cart pairing accepted.");
        self.tx.send_replace(Some(pairing));
        Some(pairing)
      }
      Err(err) => {
        event!(Level::WARN, error = %err, "Accepted pairing without a usable basket id.");
        None
      }
    }
  }

  pub fn latest(&self) -> Option<PairingEvent> {
    *self.tx.borrow()
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<PairingEvent>> {
    self.tx.subscribe()
  }

  /// Resolves with the current pairing, or the next one to arrive.
  pub async fn wait_for_pairing(&self) -> PairingEvent {
    let mut rx = self.subscribe();
    loop {
      if let Some(pairing) = *rx.borrow_and_update() {
        return pairing;
      }
      // `self` holds the sender, so the channel cannot close under us.
      if rx.changed().await.is_err() {
        std::future::pending::<()>().await;
      }
    }
  }

  /// Forgets the retained pairing, e.g. after the user disconnects the cart.
  pub fn clear(&self) {
    self.tx.send_replace(None);
  }
}
