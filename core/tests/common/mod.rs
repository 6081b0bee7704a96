// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use smartcart::api::{
  ApiResponse, CatalogService, Category, CategoryResponse, ConnectionService, Product, ProductDetailService,
  ProductDetails, ProfileData, QrData, RegistrationRequest, SmartBasket, UserData, UserService,
};
use smartcart::{AggregatedItems, CartError, CartResult, ViewState};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::Level;

pub const WAIT: Duration = Duration::from_secs(2);

// --- Common Model Builders ---
pub fn product_details(product_id: i64, name: &str, price: &str) -> ProductDetails {
  ProductDetails {
    barcode: format!("890{product_id:05}"),
    color: None,
    size: Some("M".to_string()),
    weight: "0.5".to_string(),
    price: price.to_string(),
    stock: 10,
    created_at: "2024-11-02T10:00:00Z".to_string(),
    updated_at: "2024-11-02T10:00:00Z".to_string(),
    product_id,
    product: Product {
      id: product_id,
      name: name.to_string(),
      description: None,
      manufacturer: "Acme".to_string(),
      image: Some(format!("https://img.example/{product_id}.png")),
      created_at: "2024-11-01T10:00:00Z".to_string(),
      updated_at: "2024-11-01T10:00:00Z".to_string(),
      category_id: 1,
    },
  }
}

pub fn user_data(id: &str) -> UserData {
  UserData {
    id: id.to_string(),
    email: format!("{id}@example.com"),
    name: "Test User".to_string(),
    phone: "5550100".to_string(),
    fcm_token: None,
    updated_at: "2024-11-02T10:00:00Z".to_string(),
    created_at: "2024-11-02T10:00:00Z".to_string(),
  }
}

pub fn profile_data(id: &str, basket: Option<i64>) -> ProfileData {
  ProfileData {
    id: id.to_string(),
    name: "Test User".to_string(),
    email: format!("{id}@example.com"),
    phone: "5550100".to_string(),
    fcm_token: None,
    created_at: "2024-11-02T10:00:00Z".to_string(),
    updated_at: "2024-11-02T10:00:00Z".to_string(),
    smart_basket: basket.map(|id| SmartBasket {
      id,
      total_weight: "0".to_string(),
    }),
  }
}

// --- Fake Product Detail Service ---
#[derive(Clone)]
pub enum FakeReply {
  Details(ProductDetails),
  Reason(String),
  NullData,
  Transport(String),
}

/// Answers detail fetches from a table. Unknown ids answer `reason: "not found"`.
#[derive(Default)]
pub struct FakeDetailService {
  replies: Mutex<HashMap<String, FakeReply>>,
  delays: Mutex<HashMap<String, Duration>>,
  calls: AtomicUsize,
}

impl FakeDetailService {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn reply(&self, key: &str, reply: FakeReply) {
    self.replies.lock().insert(key.to_string(), reply);
  }

  pub fn priced(&self, key: &str, product_id: i64, price: &str) {
    self.reply(key, FakeReply::Details(product_details(product_id, &format!("Product {key}"), price)));
  }

  pub fn delay(&self, key: &str, delay: Duration) {
    self.delays.lock().insert(key.to_string(), delay);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ProductDetailService for FakeDetailService {
  async fn product_details(&self, product_id: &str) -> CartResult<ApiResponse<ProductDetails>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let delay = self.delays.lock().get(product_id).copied();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let reply = self.replies.lock().get(product_id).cloned();
    match reply {
      Some(FakeReply::Details(details)) => Ok(ApiResponse::ok(details)),
      Some(FakeReply::Reason(reason)) => Ok(ApiResponse::rejected(reason)),
      Some(FakeReply::NullData) => Ok(ApiResponse {
        data: None,
        reason: None,
        stack: None,
      }),
      Some(FakeReply::Transport(message)) => Err(CartError::Transport(message)),
      None => Ok(ApiResponse::rejected("not found")),
    }
  }
}

// --- Fake Backend for repositories ---
#[derive(Default)]
pub struct FakeBackend {
  pub categories: Mutex<Option<CartResult<ApiResponse<CategoryResponse>>>>,
  pub login: Mutex<Option<ApiResponse<UserData>>>,
  pub profile: Mutex<Option<ApiResponse<ProfileData>>>,
  pub qr: Mutex<Option<ApiResponse<QrData>>>,
  pub tokens_seen: Mutex<Vec<String>>,
  pub calls: AtomicUsize,
  /// When set, every call waits for a notification before answering.
  pub gate: Option<Arc<Notify>>,
}

impl FakeBackend {
  async fn enter(&self, token: Option<&str>) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(token) = token {
      self.tokens_seen.lock().push(token.to_string());
    }
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

fn take_or_missing<T>(slot: &Mutex<Option<ApiResponse<T>>>) -> ApiResponse<T> {
  slot.lock().take().unwrap_or(ApiResponse {
    data: None,
    reason: None,
    stack: None,
  })
}

#[async_trait]
impl CatalogService for FakeBackend {
  async fn categories(&self) -> CartResult<ApiResponse<CategoryResponse>> {
    self.enter(None).await;
    self
      .categories
      .lock()
      .take()
      .unwrap_or_else(|| Ok(ApiResponse::ok(CategoryResponse { categories: Vec::new() })))
  }
}

#[async_trait]
impl UserService for FakeBackend {
  async fn register_user(&self, request: &RegistrationRequest, token: &str) -> CartResult<ApiResponse<UserData>> {
    self.enter(Some(token)).await;
    let mut user = user_data("new-user");
    user.email = request.email.clone();
    user.name = request.name.clone();
    Ok(ApiResponse::ok(user))
  }

  async fn login_user(&self, token: &str) -> CartResult<ApiResponse<UserData>> {
    self.enter(Some(token)).await;
    Ok(take_or_missing(&self.login))
  }

  async fn get_user(&self, _user_id: &str, token: &str) -> CartResult<ApiResponse<ProfileData>> {
    self.enter(Some(token)).await;
    Ok(take_or_missing(&self.profile))
  }
}

#[async_trait]
impl ConnectionService for FakeBackend {
  async fn request_connection(&self, token: &str) -> CartResult<ApiResponse<QrData>> {
    self.enter(Some(token)).await;
    Ok(take_or_missing(&self.qr))
  }
}

pub fn category(id: i64, name: &str) -> Category {
  Category {
    id,
    name: name.to_string(),
    description: None,
    image: None,
  }
}

// --- Waiting helpers ---
/// Waits until the aggregator publishes a `Success` list satisfying `pred`.
pub async fn wait_for_items(
  rx: &mut watch::Receiver<ViewState<AggregatedItems>>,
  pred: impl Fn(&AggregatedItems) -> bool,
) -> AggregatedItems {
  let state = tokio::time::timeout(WAIT, rx.wait_for(|s| s.success().is_some_and(&pred)))
    .await
    .expect("timed out waiting for aggregated items")
    .expect("aggregator state channel closed");
  state.success().cloned().unwrap()
}

/// Polls `cond` until it holds or `WAIT` elapses.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
  let deadline = tokio::time::Instant::now() + WAIT;
  while tokio::time::Instant::now() < deadline {
    if cond() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
  cond()
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
