use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use loadcache::{Cache, CacheBuilder};

const NUM_ITEMS: u64 = 10_000;

fn populated_cache(shards: usize) -> Cache<u64, u64> {
  let cache = CacheBuilder::new().shards(shards).build().unwrap();
  for i in 0..NUM_ITEMS {
    cache.put(i, i);
  }
  cache
}

fn bench_get_hit(c: &mut Criterion) {
  let mut group = c.benchmark_group("get_hit");
  group.throughput(Throughput::Elements(1));
  for shards in [1, 8] {
    let cache = populated_cache(shards);
    let mut key = 0u64;
    group.bench_function(format!("shards_{shards}"), |b| {
      b.iter(|| {
        key = (key + 1) % NUM_ITEMS;
        black_box(cache.get(&key).unwrap());
      })
    });
  }
  group.finish();
}

fn bench_put(c: &mut Criterion) {
  let mut group = c.benchmark_group("put");
  group.throughput(Throughput::Elements(1));
  for shards in [1, 8] {
    let cache: Cache<u64, u64> = CacheBuilder::new().shards(shards).build().unwrap();
    let mut key = 0u64;
    group.bench_function(format!("shards_{shards}"), |b| {
      b.iter(|| {
        key = key.wrapping_add(1);
        cache.put(black_box(key), key);
      })
    });
  }
  group.finish();
}

fn bench_get_loading(c: &mut Criterion) {
  let mut group = c.benchmark_group("get_loading_miss");
  group.throughput(Throughput::Elements(1));
  let cache = CacheBuilder::new()
    .loader(|key: &u64| Ok(*key))
    .build()
    .unwrap();
  let mut key = 0u64;
  group.bench_function("shards_1", |b| {
    b.iter(|| {
      key = key.wrapping_add(1);
      black_box(cache.get(&key).unwrap());
    })
  });
  group.finish();
}

criterion_group!(benches, bench_get_hit, bench_put, bench_get_loading);
criterion_main!(benches);
