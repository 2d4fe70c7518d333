use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringlog::{
    ext::RendererRegistry, Event, EventType, LogStore, RingBuffer, StoreConfig, Target,
};
use std::{sync::Arc, thread};

fn benchmark_buffer_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("RingBuffer_Append");
    let registry = RendererRegistry::new(8);
    registry.install_builtins();

    for capacity in [16usize, 128, 1024].iter() {
        group.throughput(Throughput::Elements(*capacity as u64));
        group.bench_with_input(
            BenchmarkId::new("plain_message", capacity),
            capacity,
            |b, &capacity| {
                let buffer = RingBuffer::new(capacity).unwrap();
                let event = Event::new("benchmark message")
                    .with_thread("bench")
                    .with_function("append")
                    .with_line(42);

                b.iter(|| {
                    for _ in 0..capacity {
                        buffer.append(&event, &registry).unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_payload_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("RingBuffer_Payload");
    let registry = RendererRegistry::new(8);
    registry.install_builtins();
    let buffer = RingBuffer::new(128).unwrap();

    for size in [16usize, 256, 4096, 16384].iter() {
        let payload = vec![0xa5u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("hexdump", size), size, |b, _| {
            let event = Event::new("payload").with_payload(EventType::HEXDUMP, &payload);
            b.iter(|| buffer.append(&event, &registry).unwrap());
        });
    }

    group.finish();
}

fn benchmark_store_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("LogStore");
    let store = LogStore::with_config(StoreConfig::new().with_max_events(1024)).unwrap();
    store.init(1024).unwrap();

    group.bench_function("log_default", |b| {
        b.iter(|| store.log("store message").unwrap());
    });

    group.bench_function("log_event_explicit", |b| {
        let event = Event::new("store message").with_function("bench").with_line(7);
        b.iter(|| store.log_event(Target::Buffer(0), event).unwrap());
    });

    group.bench_function("snapshot_full", |b| {
        for _ in 0..1024 {
            store.log("fill").unwrap();
        }
        b.iter(|| store.snapshot(0).unwrap());
    });

    group.finish();
}

fn benchmark_contended_writers(c: &mut Criterion) {
    let mut group = c.benchmark_group("LogStore_Contended");
    group.sample_size(20);

    for writers in [2usize, 4].iter() {
        group.bench_with_input(
            BenchmarkId::new("writers", writers),
            writers,
            |b, &writers| {
                let store = Arc::new(LogStore::new());
                store.init(128).unwrap();

                b.iter(|| {
                    let handles: Vec<_> = (0..writers)
                        .map(|_| {
                            let store = Arc::clone(&store);
                            thread::spawn(move || {
                                for _ in 0..1000 {
                                    let _ = store.log("contended");
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_buffer_append,
    benchmark_payload_sizes,
    benchmark_store_log,
    benchmark_contended_writers
);
criterion_main!(benches);
