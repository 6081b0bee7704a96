// smartcart/demos/cart_monitor/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use smartcart::api::client::DEFAULT_BASE_URL;
use smartcart::{AggregatorConfig, ApiConfig, BasketId};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub api_base_url: String,
  pub request_timeout: Option<Duration>,
  pub store_root: String,
  pub dedup_by_key: bool,
  pub remove_on_child_removed: bool,

  /// Basket announced by the simulated pairing message.
  pub basket_id: BasketId,
  /// Product ids written into the in-memory store once paired.
  pub demo_items: Vec<String>,
}

fn get_env(var_name: &str) -> Option<String> {
  env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(var_name: &str) -> Result<bool> {
  get_env(var_name)
    .map(|v| v.trim().parse::<bool>())
    .transpose()
    .map(Option::unwrap_or_default)
    .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let api_base_url = get_env("SMARTCART_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let request_timeout = get_env("SMARTCART_REQUEST_TIMEOUT_SECS")
      .map(|v| v.trim().parse::<u64>())
      .transpose()
      .map_err(|e| AppError::Config(format!("Invalid SMARTCART_REQUEST_TIMEOUT_SECS: {}", e)))?
      .map(Duration::from_secs);
    let store_root = get_env("SMARTCART_STORE_ROOT").unwrap_or_default();
    let dedup_by_key = parse_flag("SMARTCART_DEDUP_BY_KEY")?;
    let remove_on_child_removed = parse_flag("SMARTCART_REMOVE_ON_CHILD_REMOVED")?;
    let basket_id = get_env("SMARTCART_BASKET_ID")
      .unwrap_or_else(|| "1".to_string())
      .parse::<BasketId>()?;
    let demo_items = get_env("SMARTCART_DEMO_ITEMS")
      .map(|v| {
        v.split(',')
          .map(str::trim)
          .filter(|id| !id.is_empty())
          .map(str::to_string)
          .collect()
      })
      .unwrap_or_default();

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      api_base_url,
      request_timeout,
      store_root,
      dedup_by_key,
      remove_on_child_removed,
      basket_id,
      demo_items,
    })
  }

  pub fn api_config(&self) -> Result<ApiConfig> {
    let config = ApiConfig::new(&self.api_base_url)?;
    Ok(match self.request_timeout {
      Some(timeout) => config.with_timeout(timeout),
      None => config,
    })
  }

  pub fn aggregator_config(&self) -> AggregatorConfig {
    AggregatorConfig {
      store_root: self.store_root.clone(),
      dedup_by_key: self.dedup_by_key,
      remove_on_child_removed: self.remove_on_child_removed,
    }
  }
}
