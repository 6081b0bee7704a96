// smartcart/src/api/client.rs

use crate::api::envelope::ApiResponse;
use crate::api::models::{CategoryResponse, ProductDetails, ProfileData, QrData, RegistrationRequest, UserData};
use crate::api::{CatalogService, ConnectionService, ProductDetailService, UserService};
use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{event, instrument, Level};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://backend-153569340026.us-central1.run.app/api/";

#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Must end with `/` so relative endpoint paths join beneath it.
  pub base_url: Url,
  /// `None` leaves requests without a deadline.
  pub request_timeout: Option<Duration>,
}

impl ApiConfig {
  pub fn new(base_url: &str) -> CartResult<Self> {
    let mut base_url = base_url.to_string();
    if !base_url.ends_with('/') {
      base_url.push('/');
    }
    Ok(Self {
      base_url: Url::parse(&base_url)?,
      request_timeout: None,
    })
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = Some(timeout);
    self
  }
}

#[derive(Clone)]
pub struct ApiClient {
  config: ApiConfig,
  session: reqwest::Client,
}

impl ApiClient {
  pub fn try_new(config: ApiConfig) -> CartResult<Self> {
    let mut builder = reqwest::ClientBuilder::new();
    if let Some(timeout) = config.request_timeout {
      builder = builder.timeout(timeout);
    }
    let session = builder
      .build()
      .map_err(|e| CartError::Config(format!("failed to build HTTP client: {}", e)))?;
    Ok(Self { config, session })
  }

  /// Uses a caller-built `reqwest::Client`; `config.request_timeout` is not applied.
  pub fn with_session(config: ApiConfig, session: reqwest::Client) -> Self {
    Self { config, session }
  }

  pub fn base_url(&self) -> &Url {
    &self.config.base_url
  }

  #[instrument(level = Level::DEBUG, skip(self, request), fields(method = %request.method, rel_url = request.rel_url))]
  async fn execute<T, R>(&self, request: Request<'_, T>) -> CartResult<ApiResponse<R>>
  where
    T: Serialize,
    R: DeserializeOwned,
  {
    let Request {
      method,
      rel_url,
      token,
      payload,
    } = request;

    let url = self.config.base_url.join(rel_url)?;
    let mut builder = self.session.request(method, url);
    if let Some(token) = token {
      builder = builder.header(AUTHORIZATION, token);
    }
    if let Some(payload) = payload {
      builder = builder.json(payload);
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?;
    event!(Level::DEBUG, %status, bytes = body.len(), "Response received.");

    // Failed requests still carry the envelope; only fall back to the status
    // line when the body is not one.
    match serde_json::from_slice::<ApiResponse<R>>(&body) {
      Ok(envelope) => Ok(envelope),
      Err(_) if !status.is_success() => Err(CartError::Transport(format!("HTTP {}", status))),
      Err(err) => Err(err.into()),
    }
  }
}

struct Request<'a, T> {
  method: Method,
  rel_url: &'a str,
  token: Option<&'a str>,
  payload: Option<&'a T>,
}

type RequestWithoutPayload<'a> = Request<'a, ()>;

#[async_trait]
impl ProductDetailService for ApiClient {
  #[instrument(level = Level::INFO, skip(self))]
  async fn product_details(&self, product_id: &str) -> CartResult<ApiResponse<ProductDetails>> {
    let request = RequestWithoutPayload {
      method: Method::GET,
      rel_url: &format!("product-variant/{product_id}"),
      token: None,
      payload: None,
    };
    self.execute(request).await
  }
}

#[async_trait]
impl CatalogService for ApiClient {
  #[instrument(level = Level::INFO, skip(self))]
  async fn categories(&self) -> CartResult<ApiResponse<CategoryResponse>> {
    let request = RequestWithoutPayload {
      method: Method::GET,
      rel_url: "dashboard",
      token: None,
      payload: None,
    };
    self.execute(request).await
  }
}

#[async_trait]
impl UserService for ApiClient {
  #[instrument(level = Level::INFO, skip(self, request, token))]
  async fn register_user(&self, request: &RegistrationRequest, token: &str) -> CartResult<ApiResponse<UserData>> {
    let request = Request {
      method: Method::POST,
      rel_url: "user/register",
      token: Some(token),
      payload: Some(request),
    };
    self.execute(request).await
  }

  #[instrument(level = Level::INFO, skip(self, token))]
  async fn login_user(&self, token: &str) -> CartResult<ApiResponse<UserData>> {
    let request = RequestWithoutPayload {
      method: Method::GET,
      rel_url: "user/login",
      token: Some(token),
      payload: None,
    };
    self.execute(request).await
  }

  #[instrument(level = Level::INFO, skip(self, token))]
  async fn get_user(&self, user_id: &str, token: &str) -> CartResult<ApiResponse<ProfileData>> {
    let request = RequestWithoutPayload {
      method: Method::GET,
      rel_url: &format!("user/{user_id}"),
      token: Some(token),
      payload: None,
    };
    self.execute(request).await
  }
}

#[async_trait]
impl ConnectionService for ApiClient {
  #[instrument(level = Level::INFO, skip(self, token))]
  async fn request_connection(&self, token: &str) -> CartResult<ApiResponse<QrData>> {
    let request = RequestWithoutPayload {
      method: Method::POST,
      rel_url: "connection-request/",
      token: Some(token),
      payload: None,
    };
    self.execute(request).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_url_gets_trailing_slash() {
    let config = ApiConfig::new("http://localhost:8080/api").unwrap();
    assert_eq!(config.base_url.as_str(), "http://localhost:8080/api/");
    assert_eq!(
      config.base_url.join("product-variant/42").unwrap().as_str(),
      "http://localhost:8080/api/product-variant/42"
    );
  }

  #[test]
  fn invalid_base_url_is_a_config_error() {
    assert!(matches!(ApiConfig::new("not a url"), Err(CartError::Config(_))));
  }
}
