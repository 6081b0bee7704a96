use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use smartcart::api::{ApiResponse, Product, ProductDetailService, ProductDetails};
use smartcart::{
  AggregatorConfig, BasketId, BasketPath, CartResult, CartView, ItemAggregator, MemoryItemStore, StateCell,
};
use std::sync::Arc;
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Helper: product records ---
fn details(product_id: i64) -> ProductDetails {
  ProductDetails {
    barcode: format!("890{product_id:05}"),
    color: None,
    size: None,
    weight: "1".to_string(),
    price: format!("{}.{:02}", product_id % 500, product_id % 100),
    stock: 10,
    created_at: String::new(),
    updated_at: String::new(),
    product_id,
    product: Product {
      id: product_id,
      name: format!("Product {product_id}"),
      description: None,
      manufacturer: "Bench".to_string(),
      image: None,
      created_at: String::new(),
      updated_at: String::new(),
      category_id: 1,
    },
  }
}

// --- Helper: detail service answering without I/O ---
struct InstantDetails;

#[async_trait]
impl ProductDetailService for InstantDetails {
  async fn product_details(&self, product_id: &str) -> CartResult<ApiResponse<ProductDetails>> {
    let id = product_id.trim_start_matches('p').parse().unwrap_or(0);
    Ok(ApiResponse::ok(details(id)))
  }
}

// --- Benchmark Functions ---
fn bench_cart_projection(c: &mut Criterion) {
  let mut group = c.benchmark_group("CartProjection");
  for num_records in [10usize, 100, 1000].iter() {
    let records: Vec<ProductDetails> = (0..*num_records as i64).map(details).collect();
    group.throughput(Throughput::Elements(*num_records as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_records), &records, |b, records| {
      b.iter(|| CartView::from_records(records).summary())
    });
  }
  group.finish();
}

fn bench_state_cell_update(c: &mut Criterion) {
  let mut group = c.benchmark_group("StateCellUpdate");
  let cell = StateCell::new(Vec::<u64>::new());
  let _rx = cell.subscribe();

  group.bench_function("update_push", |b| {
    b.iter(|| cell.update(|v| v.push(1)));
  });
  group.bench_function("update_if_noop", |b| {
    b.iter(|| cell.update_if(|_| false));
  });
  group.finish();
}

fn bench_aggregator_fill(c: &mut Criterion) {
  let mut group = c.benchmark_group("AggregatorFill");
  let rt = Runtime::new().unwrap();

  for num_items in [10usize, 100].iter() {
    group.throughput(Throughput::Elements(*num_items as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_items), num_items, |b, &n| {
      b.to_async(&rt).iter(|| async move {
        let store = MemoryItemStore::new();
        let path = BasketPath::new("", BasketId(1));
        for i in 0..n {
          store.insert(&path, &format!("p{i}"));
        }
        let aggregator = ItemAggregator::new(Arc::new(store), Arc::new(InstantDetails), AggregatorConfig::default());
        let mut rx = aggregator.items();
        let handle = aggregator.observe(BasketId(1)).await.unwrap();
        rx.wait_for(|s| s.success().is_some_and(|items| items.len() == n))
          .await
          .unwrap();
        handle.cancel();
      });
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_cart_projection,
  bench_state_cell_update,
  bench_aggregator_fill
);
criterion_main!(benches);
