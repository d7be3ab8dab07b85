use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lrucache::LruCache;

const CAPACITY: usize = 1000;

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("put");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_within_capacity", |b| {
        let mut cache = LruCache::new(CAPACITY).unwrap();
        let mut counter = 0i64;
        b.iter(|| {
            cache.put(black_box(counter % CAPACITY as i64), counter);
            counter += 1;
        });
    });

    group.bench_function("put_evicting", |b| {
        let mut cache = LruCache::new(CAPACITY).unwrap();
        let mut counter = 0i64;
        b.iter(|| {
            // Every key is new, so each put past warm-up evicts the tail
            cache.put(black_box(counter), counter);
            counter += 1;
        });
    });

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut cache = LruCache::new(CAPACITY).unwrap();
        for key in 0..CAPACITY as i64 {
            cache.put(key, key);
        }

        let mut counter = 0i64;
        b.iter(|| {
            black_box(cache.get(counter % CAPACITY as i64));
            counter += 1;
        });
    });

    group.bench_function("get_miss", |b| {
        let mut cache = LruCache::new(CAPACITY).unwrap();
        for key in 0..CAPACITY as i64 {
            cache.put(key, key);
        }

        let mut counter = CAPACITY as i64;
        b.iter(|| {
            black_box(cache.get(counter));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_get_50_put", |b| {
        let mut cache = LruCache::new(CAPACITY).unwrap();
        let mut counter = 0i64;
        b.iter(|| {
            let key = counter % CAPACITY as i64;
            if counter % 2 == 0 {
                cache.put(key, counter);
            } else {
                black_box(cache.get(key));
            }
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_mixed_50_50);
criterion_main!(benches);
