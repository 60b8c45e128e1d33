//! Benchmarks for the tag write/notify path.
//!
//! Run with: `cargo bench --package proctag --bench commit_bench`

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use proctag::{IndexAllocator, TagBase, TagInt, listener};

fn tag_with_listeners(count: usize) -> (TagInt, Rc<Cell<u64>>) {
    let mut tag = TagInt::new(&mut IndexAllocator::new());
    let hits = Rc::new(Cell::new(0u64));
    for _ in 0..count {
        let h = Rc::clone(&hits);
        tag.on_change(listener(move |_: &TagBase<i32>, _: &i32, _: &i32| {
            h.set(h.get() + 1);
        }));
    }
    (tag, hits)
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_set");
    for listeners in [0usize, 1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::new("changing", listeners),
            &listeners,
            |b, &n| {
                let (mut tag, _hits) = tag_with_listeners(n);
                let mut v = 0i32;
                b.iter(|| {
                    v = v.wrapping_add(1);
                    black_box(tag.set(black_box(v)))
                });
            },
        );
        group.bench_with_input(BenchmarkId::new("unchanged", listeners), &listeners, |b, &n| {
            let (mut tag, _hits) = tag_with_listeners(n);
            b.iter(|| black_box(tag.set(black_box(0))));
        });
    }
    group.finish();
}

fn bench_compound(c: &mut Criterion) {
    c.bench_function("tag_add_assign/4_listeners", |b| {
        let (mut tag, _hits) = tag_with_listeners(4);
        b.iter(|| {
            tag += black_box(1);
        });
    });
}

criterion_group!(benches, bench_set, bench_compound);
criterion_main!(benches);
