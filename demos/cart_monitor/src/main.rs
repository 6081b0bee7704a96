// smartcart/demos/cart_monitor/src/main.rs

// Declare modules for the application
mod config;
mod errors;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;

use smartcart::pairing::{BASKET_ID_KEY, CODE_KEY, CONNECTION_ACCEPTED};
use smartcart::{
  AggregatedItems, ApiClient, BasketPath, CartView, ItemAggregator, MemoryItemStore, PairingEvents, ViewState,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting cart monitor...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e.into());
    }
  };

  run(app_config).await?;
  tracing::info!("Cart monitor stopped.");
  Ok(())
}

async fn run(app_config: Arc<AppConfig>) -> AppResult<()> {
  let api = Arc::new(ApiClient::try_new(app_config.api_config()?)?);
  tracing::info!(base_url = %api.base_url(), "Backend client ready.");

  let store = MemoryItemStore::new();
  let aggregator = ItemAggregator::new(Arc::new(store.clone()), api, app_config.aggregator_config());
  let pairing = PairingEvents::new();

  // No push provider here: deliver the message the backend would send once
  // the cart scans this user's code.
  let push = pairing.clone();
  let basket_id = app_config.basket_id;
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(200)).await;
    let data = HashMap::from([
      (CODE_KEY.to_string(), CONNECTION_ACCEPTED.to_string()),
      (BASKET_ID_KEY.to_string(), basket_id.to_string()),
    ]);
    push.handle_message(&data);
  });

  tracing::info!("Waiting for cart pairing...");
  let paired = pairing.wait_for_pairing().await;
  let mut items = aggregator.items();
  let handle = aggregator.observe(paired.basket_id).await?;

  let path = BasketPath::new(&app_config.store_root, paired.basket_id);
  for product_id in &app_config.demo_items {
    store.insert(&path, product_id);
  }

  loop {
    tokio::select! {
      changed = items.changed() => {
        if changed.is_err() {
          break;
        }
        let state = items.borrow_and_update().clone();
        render(&state);
      }
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("Interrupt received; cancelling observation.");
        break;
      }
    }
  }

  handle.cancel();
  Ok(())
}

fn render(state: &ViewState<AggregatedItems>) {
  match state {
    ViewState::Loading => println!("Loading cart..."),
    ViewState::Error(message) => println!("Cart unavailable: {message}"),
    ViewState::Success(items) => {
      let view = CartView::from_records(items.details());
      if view.is_empty() {
        println!("Cart is empty.");
      }
      for line in view.visible_items() {
        println!("  {:<32} x{:<3} {:>10}", line.name, line.quantity, line.unit_rate.to_string());
      }
      for failure in &items.failures {
        println!("  (product {} unavailable: {:?})", failure.key, failure.reason);
      }
      let summary = view.summary();
      println!(
        "Subtotal {:.2} | Tax {:.2} | Total {:.2}",
        summary.subtotal, summary.tax, summary.total
      );
    }
  }
}
