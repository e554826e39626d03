use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pmgraph_pma::Pma;

fn sorted_insert(pma: &mut Pma<u32>, value: u32) {
    let at = pma.lower_bound(&value);
    pma.insert(at, value, &mut ());
}

fn scrambled(n: u64) -> impl Iterator<Item = u32> {
    // Multiplicative scramble; visits every residue once for the sizes
    // benched here.
    (0..n).map(move |i| ((i * 2_654_435_761) % n) as u32)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [1_000u64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("random_order", n), &n, |b, &n| {
            b.iter(|| {
                let mut pma = Pma::new();
                for v in scrambled(n) {
                    sorted_insert(&mut pma, v);
                }
                black_box(pma.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("push_back", n), &n, |b, &n| {
            b.iter(|| {
                let mut pma = Pma::new();
                for v in 0..n as u32 {
                    pma.push_back(v, &mut ());
                }
                black_box(pma.len())
            });
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut pma = Pma::new();
    for v in scrambled(100_000) {
        sorted_insert(&mut pma, v);
    }
    c.bench_function("iterate_100k", |b| {
        b.iter(|| black_box(pma.iter().copied().sum::<u32>()));
    });
    c.bench_function("find_100k", |b| {
        let mut probe = 0u32;
        b.iter(|| {
            probe = (probe + 7919) % 100_000;
            black_box(pma.find(&probe))
        });
    });
}

criterion_group!(benches, bench_insert, bench_iterate);
criterion_main!(benches);
