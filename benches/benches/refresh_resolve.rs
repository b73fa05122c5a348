// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;
use scrollstory::{Content, MemoryHost, Options, ScrollStory};
use scrollstory_items::{ElementKey, ItemDraft, ItemStore};
use scrollstory_layout::{ActivationPolicy, OffsetCache, Resolver, StaticGeometry, Viewport};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn height(&mut self) -> f64 {
        40.0 + (self.next_u64() % 400) as f64
    }
}

fn heights(n: usize) -> Vec<f64> {
    let mut rng = Rng::new(0x9e37_79b9_7f4a_7c15);
    (0..n).map(|_| rng.height()).collect()
}

fn populated(n: usize) -> (ItemStore, StaticGeometry) {
    let hs = heights(n);
    let geometry = StaticGeometry::stacked(0.0, 800.0, &hs, Size::new(800.0, 600.0));
    let mut store = ItemStore::new();
    for i in 0..n {
        let _ = store.add_item(ItemDraft::new(ElementKey(i as u64)), |_| {});
    }
    (store, geometry)
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset_refresh");
    for n in SIZES {
        group.throughput(Throughput::Elements(n as u64));
        let (store, geometry) = populated(n);
        group.bench_function(format!("n={n}"), |b| {
            b.iter_batched(
                || (store.clone(), OffsetCache::new()),
                |(mut store, mut cache)| {
                    black_box(cache.refresh(&mut store, &geometry));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for n in SIZES {
        group.throughput(Throughput::Elements(n as u64));
        let (mut store, geometry) = populated(n);
        let mut cache = OffsetCache::new();
        let _ = cache.refresh(&mut store, &geometry);
        let bottom = cache.container().top_offset + cache.container().height;
        for policy in [ActivationPolicy::Crossed, ActivationPolicy::Nearest] {
            let resolver = Resolver::new(policy);
            let mut rng = Rng::new(7);
            group.bench_function(format!("{policy:?}/n={n}"), |b| {
                b.iter(|| {
                    let top = (rng.next_u64() % bottom.max(1.0) as u64) as f64;
                    let viewport = Viewport::vertical(top, 600.0);
                    black_box(resolver.resolve(&mut store, &cache, viewport, 0.0));
                });
            });
        }
    }
    group.finish();
}

// Scroll signals through the facade: limiter, resolution, state and delivery.
fn bench_story_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("story_scroll");
    for n in SIZES {
        group.throughput(Throughput::Elements(n as u64));
        let host = MemoryHost::stacked("story", &heights(n), Size::new(800.0, 600.0));
        let bottom = host_bottom(&host);
        let mut story = match ScrollStory::new(host, Content::Default, Options::default()) {
            Ok(story) => story,
            Err(err) => panic!("bench story: {err}"),
        };
        let mut now = 0_u64;
        let mut top = 0.0;
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| {
                top = (top + 37.0) % bottom;
                now += 100;
                story.host_mut().set_scroll_top(top);
                story.scroll(now);
                black_box(story.index());
            });
        });
    }
    group.finish();
}

fn host_bottom(host: &MemoryHost) -> f64 {
    use scrollstory::GeometryProvider;
    host.container_bounds().y1.max(1.0)
}

criterion_group!(benches, bench_refresh, bench_resolve, bench_story_scroll);
criterion_main!(benches);
