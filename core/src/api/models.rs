// smartcart/src/api/models.rs

//! Wire models for the Smart Cart backend. Field names follow the backend's camelCase JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One product variant as returned by `GET product-variant/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
  pub barcode: String,
  pub color: Option<String>,
  pub size: Option<String>,
  pub weight: String,
  /// Decimal rendered as a string, e.g. `"149.50"`.
  pub price: String,
  pub stock: i64,
  pub created_at: String,
  pub updated_at: String,
  /// Id of the parent [`Product`], not of this variant.
  pub product_id: i64,
  pub product: Product,
}

impl ProductDetails {
  /// `None` when the backend sent something that is not a decimal.
  pub fn parsed_price(&self) -> Option<Decimal> {
    Decimal::from_str(self.price.trim()).ok()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub manufacturer: String,
  pub image: Option<String>,
  pub created_at: String,
  pub updated_at: String,
  pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

/// Payload of `GET dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
  pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
  pub id: String,
  pub email: String,
  pub name: String,
  pub phone: String,
  #[serde(default)]
  pub fcm_token: Option<String>,
  pub updated_at: String,
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartBasket {
  pub id: i64,
  pub total_weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
  pub id: String,
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(default)]
  pub fcm_token: Option<String>,
  pub created_at: String,
  pub updated_at: String,
  #[serde(default)]
  pub smart_basket: Option<SmartBasket>,
}

/// A pending cart connection request; its `id` is what the QR code encodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrData {
  pub id: String,
  pub is_active: bool,
  pub redundant_bit: bool,
  pub user_id: String,
  pub updated_at: String,
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fcm_token: Option<String>,
}
