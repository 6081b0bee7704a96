// smartcart/src/repository/user.rs

use crate::api::{ProfileData, RegistrationRequest, UserData, UserService};
use crate::repository::require_token;
use crate::state::{Loadable, ViewState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// Registration, login and profile lookups against the backend. The token
/// comes from the identity provider and is never inspected here beyond
/// rejecting blanks.
pub struct UserRepository {
  api: Arc<dyn UserService>,
  registration: Loadable<UserData>,
  login: Loadable<UserData>,
  profile: Loadable<ProfileData>,
}

impl UserRepository {
  pub fn new(api: Arc<dyn UserService>) -> Self {
    Self {
      api,
      registration: Loadable::new("registration"),
      login: Loadable::new("login"),
      profile: Loadable::new("profile"),
    }
  }

  #[instrument(name = "UserRepository::register", skip_all, fields(email = %request.email))]
  pub async fn register(&self, request: &RegistrationRequest, token: &str) {
    let api = Arc::clone(&self.api);
    self
      .registration
      .load(async move {
        require_token(token)?;
        api.register_user(request, token).await?.into_result()
      })
      .await;
  }

  #[instrument(name = "UserRepository::login", skip_all)]
  pub async fn login(&self, token: &str) {
    let api = Arc::clone(&self.api);
    self
      .login
      .load(async move {
        require_token(token)?;
        api.login_user(token).await?.into_result()
      })
      .await;
  }

  #[instrument(name = "UserRepository::get_user", skip(self, token))]
  pub async fn get_user(&self, user_id: &str, token: &str) {
    let api = Arc::clone(&self.api);
    self
      .profile
      .load(async move {
        require_token(token)?;
        api.get_user(user_id, token).await?.into_result()
      })
      .await;
  }

  pub fn registration(&self) -> watch::Receiver<ViewState<UserData>> {
    self.registration.subscribe()
  }

  pub fn login_state(&self) -> watch::Receiver<ViewState<UserData>> {
    self.login.subscribe()
  }

  pub fn profile(&self) -> watch::Receiver<ViewState<ProfileData>> {
    self.profile.subscribe()
  }

  /// The paired cart from the last successful profile fetch, if any.
  pub fn profile_basket_id(&self) -> Option<i64> {
    self
      .profile
      .current()
      .success()
      .and_then(|p| p.smart_basket.as_ref())
      .map(|b| b.id)
  }
}
