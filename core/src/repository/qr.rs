// smartcart/src/repository/qr.rs

use crate::api::{ConnectionService, QrData};
use crate::repository::require_token;
use crate::state::{Loadable, ViewState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// Requests the pairing code a cart scans to connect to this user.
pub struct QrRepository {
  api: Arc<dyn ConnectionService>,
  connection: Loadable<QrData>,
}

impl QrRepository {
  pub fn new(api: Arc<dyn ConnectionService>) -> Self {
    Self {
      api,
      connection: Loadable::new("connection_request"),
    }
  }

  #[instrument(name = "QrRepository::request_connection", skip_all)]
  pub async fn request_connection(&self, token: &str) {
    let api = Arc::clone(&self.api);
    self
      .connection
      .load(async move {
        require_token(token)?;
        api.request_connection(token).await?.into_result()
      })
      .await;
  }

  pub fn connection(&self) -> watch::Receiver<ViewState<QrData>> {
    self.connection.subscribe()
  }

  /// Id encoded into the QR code, once a request has succeeded.
  pub fn qr_id(&self) -> Option<String> {
    self.connection.current().success().map(|qr| qr.id.clone())
  }
}
