// src/lib.rs

//! Smart Cart: the client core behind the Smart Cart app.
//!
//! A physical cart writes the product ids it detects into a real-time store.
//! This crate turns that feed into something a screen can render:
//!  - Live observation of one basket, with a detail fetch per announced product.
//!  - Per-item failures surfaced next to the records instead of being swallowed.
//!  - Explicit cancellation handles instead of listeners that outlive their screen.
//!  - A pricing view (subtotal, 18% tax, total) over the aggregated records.
//!  - Pairing notifications delivered over an owned channel.
//!  - Loading / Success / Error state for every backend call, implemented once.

pub mod aggregator;
pub mod api;
pub mod cart;
pub mod error;
pub mod pairing;
pub mod repository;
pub mod state;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::aggregator::{
  AggregatedItems, AggregatorConfig, FailureReason, ItemAggregator, ItemFailure, ObservationHandle, ProductRecord,
};
pub use crate::api::{
  ApiClient, ApiConfig, ApiResponse, CatalogService, ConnectionService, ProductDetailService, UserService,
};
pub use crate::cart::{CartLineItem, CartSummary, CartView, TAX_RATE};
pub use crate::error::{CartError, CartResult};
pub use crate::pairing::{PairingEvent, PairingEvents};
pub use crate::repository::{CategoryRepository, QrRepository, UserRepository};
pub use crate::state::{Loadable, StateCell, ViewState};
pub use crate::store::{BasketId, BasketPath, ChildEvent, ChildEvents, ItemStore, MemoryItemStore};

/*
    Typical wiring:
    1. Build an `ApiClient` from an `ApiConfig` and pick an `ItemStore`.
    2. Feed push messages into `PairingEvents::handle_message`; the pairing
       screen waits on `wait_for_pairing()` for the basket id.
    3. `ItemAggregator::observe(basket_id)` and keep the returned handle for as
       long as the cart screen is open.
    4. On every change of `aggregator.items()`, rebuild a `CartView` from the
       records and render `summary()`.
    5. Drop (or `cancel()`) the handle when the screen goes away.
*/
