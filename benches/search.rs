use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridjump::{BitGrid, Pos, SearchFlag, SearchFlags, Searcher};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

fn random_map(size: u32, density: f64, seed: u64) -> BitGrid {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut grid = BitGrid::new(size, size);
    for y in 0..size {
        for x in 0..size {
            grid.set(x, y, !rng.gen_bool(density));
        }
    }
    // Keep the corners open so the benchmark queries have fixed endpoints.
    for (x, y) in [(0, 0), (size - 1, size - 1)] {
        grid.set(x, y, true);
    }
    grid
}

fn bench_search(c: &mut Criterion) {
    let size = 512;
    let map = random_map(size, 0.25, 0x5EED_CAFE);
    let start = Pos::new(0, 0);
    let end = Pos::new(size - 1, size - 1);

    let mut group = c.benchmark_group("random_512");
    group.bench_function("jps", |b| {
        let mut searcher = Searcher::new(&map);
        let mut path = Vec::new();
        b.iter(|| {
            path.clear();
            black_box(searcher.find_path(&mut path, start, end, 0, SearchFlags::new()))
        });
    });
    group.bench_function("astar", |b| {
        let mut searcher = Searcher::new(&map);
        let mut path = Vec::new();
        b.iter(|| {
            path.clear();
            black_box(searcher.find_path(&mut path, start, end, 0, SearchFlag::AStarOnly.into()))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
