// smartcart/src/cart/mod.rs

//! Pricing view over the aggregated items.
//!
//! A [`CartView`] is derived from product records and only ever mutated
//! locally: deleting a line never reaches the item store, and the next
//! [`CartView::refresh`] brings it back.

use crate::api::ProductDetails;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{event, Level};

/// 18%, applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineItem {
  /// Parent product id of the variant.
  pub id: Option<i64>,
  pub name: String,
  /// Empty when the product has no image.
  pub image_url: String,
  pub unit_rate: Decimal,
  pub quantity: u32,
}

impl CartLineItem {
  /// Every record becomes its own line with quantity 1; repeated products are not merged.
  pub fn from_details(details: &ProductDetails) -> Self {
    let unit_rate = details.parsed_price().unwrap_or_else(|| {
      event!(Level::WARN, product_id = details.product_id, price = %details.price, "Unparseable price; using 0.");
      Decimal::ZERO
    });
    Self {
      id: Some(details.product_id),
      name: details.product.name.clone(),
      image_url: details.product.image.clone().unwrap_or_default(),
      unit_rate,
      quantity: 1,
    }
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_rate * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
  pub subtotal: Decimal,
  pub tax: Decimal,
  pub total: Decimal,
}

impl CartSummary {
  pub fn for_lines<'a>(lines: impl IntoIterator<Item = &'a CartLineItem>) -> Self {
    let subtotal: Decimal = lines.into_iter().map(CartLineItem::line_total).sum();
    let tax = subtotal * TAX_RATE;
    Self {
      subtotal,
      tax,
      total: subtotal + tax,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
  lines: Vec<CartLineItem>,
}

impl CartView {
  pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProductDetails>) -> Self {
    Self {
      lines: records.into_iter().map(CartLineItem::from_details).collect(),
    }
  }

  pub fn from_line_items(lines: Vec<CartLineItem>) -> Self {
    Self { lines }
  }

  /// Re-derives every line from `records`, discarding local deletions.
  pub fn refresh<'a>(&mut self, records: impl IntoIterator<Item = &'a ProductDetails>) {
    *self = Self::from_records(records);
  }

  /// Lines with a positive quantity, in record order.
  pub fn visible_items(&self) -> impl Iterator<Item = &CartLineItem> {
    self.lines.iter().filter(|line| line.quantity > 0)
  }

  pub fn visible_len(&self) -> usize {
    self.visible_items().count()
  }

  pub fn is_empty(&self) -> bool {
    self.visible_len() == 0
  }

  /// Deletes one unit of the `index`-th visible line: a quantity above one is
  /// decremented, a single unit removes the line. Returns the line as it was
  /// before deletion, or `None` if `index` is out of range.
  pub fn delete_at(&mut self, index: usize) -> Option<CartLineItem> {
    let pos = self
      .lines
      .iter()
      .enumerate()
      .filter(|(_, line)| line.quantity > 0)
      .nth(index)
      .map(|(pos, _)| pos)?;

    let before = self.lines[pos].clone();
    if before.quantity > 1 {
      self.lines[pos].quantity -= 1;
    } else {
      self.lines.remove(pos);
    }
    Some(before)
  }

  pub fn summary(&self) -> CartSummary {
    CartSummary::for_lines(self.visible_items())
  }
}
