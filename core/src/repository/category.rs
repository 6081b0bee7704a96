// smartcart/src/repository/category.rs

use crate::api::{CatalogService, Category};
use crate::error::CartError;
use crate::state::{Loadable, ViewState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

pub struct CategoryRepository {
  api: Arc<dyn CatalogService>,
  categories: Loadable<Vec<Category>>,
}

impl CategoryRepository {
  pub fn new(api: Arc<dyn CatalogService>) -> Self {
    Self {
      api,
      categories: Loadable::new("categories"),
    }
  }

  /// A response without data and without a reason loads as an empty catalog.
  #[instrument(name = "CategoryRepository::fetch_categories", skip(self))]
  pub async fn fetch_categories(&self) {
    let api = Arc::clone(&self.api);
    self
      .categories
      .load(async move {
        match api.categories().await?.into_result() {
          Ok(response) => Ok(response.categories),
          Err(CartError::MissingData) => Ok(Vec::new()),
          Err(err) => Err(err),
        }
      })
      .await;
  }

  pub fn categories(&self) -> watch::Receiver<ViewState<Vec<Category>>> {
    self.categories.subscribe()
  }

  pub fn current(&self) -> ViewState<Vec<Category>> {
    self.categories.current()
  }
}
