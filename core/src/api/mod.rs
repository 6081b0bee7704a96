// smartcart/src/api/mod.rs

//! REST surface of the Smart Cart backend: the response envelope, wire models,
//! one trait per backend capability and the `reqwest` client implementing them.

pub mod client;
pub mod envelope;
pub mod models;

pub use client::{ApiClient, ApiConfig};
pub use envelope::ApiResponse;
pub use models::{
  Category, CategoryResponse, Product, ProductDetails, ProfileData, QrData, RegistrationRequest, SmartBasket,
  UserData,
};

use crate::error::CartResult;
use async_trait::async_trait;

/// `GET product-variant/{productId}`.
///
/// `Ok` means the server answered; an application-level failure still arrives
/// as `Ok` with `reason` set. `Err` is reserved for transport and decode failures.
#[async_trait]
pub trait ProductDetailService: Send + Sync {
  async fn product_details(&self, product_id: &str) -> CartResult<ApiResponse<ProductDetails>>;
}

/// `GET dashboard`.
#[async_trait]
pub trait CatalogService: Send + Sync {
  async fn categories(&self) -> CartResult<ApiResponse<CategoryResponse>>;
}

/// `POST user/register`, `GET user/login`, `GET user/{id}`.
///
/// `token` is the identity-provider token and is sent verbatim as `Authorization`.
#[async_trait]
pub trait UserService: Send + Sync {
  async fn register_user(&self, request: &RegistrationRequest, token: &str) -> CartResult<ApiResponse<UserData>>;

  async fn login_user(&self, token: &str) -> CartResult<ApiResponse<UserData>>;

  async fn get_user(&self, user_id: &str, token: &str) -> CartResult<ApiResponse<ProfileData>>;
}

/// `POST connection-request/`: asks the backend for a cart pairing code.
#[async_trait]
pub trait ConnectionService: Send + Sync {
  async fn request_connection(&self, token: &str) -> CartResult<ApiResponse<QrData>>;
}
