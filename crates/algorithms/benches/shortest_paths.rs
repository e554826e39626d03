use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use pmgraph_algorithms::{BidirectionalDijkstra, Dijkstra};
use pmgraph_graph::{
    DirectedGraph, GraphGenerator, PackedMemoryGraph, RandomWeightedGenerator, RoadEdge, RoadNode,
};

type Road = PackedMemoryGraph<RoadNode, RoadEdge>;

fn random_graph(nodes: usize, edges: usize) -> Road {
    let mut graph = Road::with_rng_seed(42);
    let rng = SmallRng::seed_from_u64(43);
    RandomWeightedGenerator::new(nodes, edges, 1_000, rng).generate(&mut graph);
    graph
}

fn bench_queries(c: &mut Criterion) {
    let mut graph = random_graph(10_000, 60_000);
    let endpoints: Vec<_> = (0..32)
        .filter_map(|_| {
            let s = graph.choose_node()?;
            let t = graph.choose_node()?;
            Some((s, t))
        })
        .collect();

    c.bench_function("dijkstra_10k", |b| {
        let mut engine = Dijkstra::new(&graph);
        let mut i = 0;
        b.iter(|| {
            let (s, t) = endpoints[i % endpoints.len()];
            i += 1;
            black_box(engine.run_query(s, t))
        });
    });

    c.bench_function("bidirectional_10k", |b| {
        let mut engine = BidirectionalDijkstra::new(&graph);
        let mut i = 0;
        b.iter(|| {
            let (s, t) = endpoints[i % endpoints.len()];
            i += 1;
            black_box(engine.run_query(s, t))
        });
    });
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
