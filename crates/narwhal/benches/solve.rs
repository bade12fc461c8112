use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::{Point, Rect, Router};
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug, Clone)]
struct SceneSpec {
    obstacles: Vec<Rect>,
    paths: Vec<(Point, Point)>,
}

impl SceneSpec {
    fn build(&self) -> Router {
        let mut router = Router::new();
        for &r in &self.obstacles {
            router.add_obstacle(r);
        }
        for &(start, end) in &self.paths {
            router.add_path(start, end, ());
        }
        router
    }

    fn solved(&self) -> Router {
        let mut router = self.build();
        router.solve();
        router
    }
}

/// A `side × side` grid of boxes with paths running across it in both directions.
fn build_grid_spec(side: i32, paths_per_axis: i32) -> SceneSpec {
    let (cell, size) = (80, 40);
    let mut obstacles = Vec::new();
    for row in 0..side {
        for col in 0..side {
            obstacles.push(Rect::new(col * cell + 20, row * cell + 20, size, size));
        }
    }

    let extent = side * cell + 20;
    let mut paths = Vec::new();
    for i in 0..paths_per_axis {
        // Offset lanes so most paths have to bend around a box.
        let lane = i * extent / paths_per_axis + 35;
        paths.push((Point::new(0, lane), Point::new(extent, extent - lane)));
        paths.push((Point::new(lane, 0), Point::new(extent - lane, extent)));
    }

    SceneSpec { obstacles, paths }
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.measurement_time(Duration::from_secs(10));

    let cases = [("grid_4_p4", 4, 4), ("grid_8_p8", 8, 8), ("grid_12_p12", 12, 12)];

    for (name, side, paths) in cases {
        let spec = build_grid_spec(side, paths);
        group.bench_with_input(BenchmarkId::new("full", name), &spec, |b, spec| {
            b.iter_batched(
                || spec.build(),
                |mut router| {
                    let outcome = router.solve();
                    black_box(outcome.updated.len());
                },
                BatchSize::LargeInput,
            )
        });

        // Nudging one box only re-searches the paths that touched it.
        let moved = spec.obstacles[0];
        group.bench_with_input(BenchmarkId::new("incremental", name), &spec, |b, spec| {
            b.iter_batched(
                || spec.solved(),
                |mut router| {
                    let shifted = Rect::new(moved.x + 5, moved.y + 5, moved.width, moved.height);
                    let _ = router.update_obstacle(moved, black_box(shifted));
                    let outcome = router.solve();
                    black_box(outcome.updated.len());
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
