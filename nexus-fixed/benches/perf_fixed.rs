//! Benchmarks for bounded queue and grid operations.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nexus_fixed::{BoundedGrid, BoundedQueue, DefragmentMode};

// ============================================================================
// Queue
// ============================================================================

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_queue");

    group.bench_function("add_evicting/u64", |b| {
        let mut queue = BoundedQueue::new(1024).unwrap();
        queue.extend(0..1024u64);
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            black_box(queue.add(black_box(n)))
        });
    });

    group.bench_function("remove_at_recover/mid", |b| {
        let mut queue = BoundedQueue::new(256).unwrap();
        queue.extend(0..256u64);
        b.iter(|| {
            queue.remove_at(black_box(128)).unwrap();
            black_box(queue.recover())
        });
    });

    group.bench_function("reverse/256", |b| {
        let mut queue = BoundedQueue::new(256).unwrap();
        queue.extend(0..256u64);
        b.iter(|| queue.reverse());
    });

    group.finish();
}

// ============================================================================
// Grid
// ============================================================================

fn bench_grid_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_grid_count");

    for side in [16usize, 64, 256] {
        let mut grid = BoundedGrid::new(side, side).unwrap();
        for value in 0..(side * side * 3 / 4) {
            grid.add(value as u32).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(side), &grid, |b, grid| {
            b.iter(|| black_box(grid.count()));
        });
    }

    group.finish();
}

fn bench_grid_defragment(c: &mut Criterion) {
    c.bench_function("bounded_grid_defragment/serial_64", |b| {
        b.iter_batched(
            || {
                let mut grid = BoundedGrid::new(64, 64).unwrap();
                for value in 0..4096u32 {
                    grid.add(value).unwrap();
                }
                for row in (0..64).step_by(2) {
                    grid.clear_cell(row, 0).unwrap();
                }
                grid
            },
            |mut grid| {
                grid.defragment(DefragmentMode::Serial).unwrap();
                grid
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_queue, bench_grid_count, bench_grid_defragment);
criterion_main!(benches);
