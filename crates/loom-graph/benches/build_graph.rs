use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use loom_graph::{build_graph, ReaderState, StoryGraph};
use loom_types::{NodeId, StoryNode};

/// Story where every node gets `fanout` children, breadth first.
fn wide_story(total: usize, fanout: usize) -> Vec<StoryNode> {
    (0..total)
        .map(|i| {
            let parent = (i > 0).then(|| NodeId::new(format!("n{}", (i - 1) / fanout)));
            StoryNode::new(format!("n{i}"), "bench", parent, "lorem ipsum", "author")
                .with_order(i as u64)
                .with_canon(i % 7 == 0)
                .with_voters((0..i % 5).map(|v| format!("u{v}")))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    for total in [100usize, 1_000, 10_000] {
        let nodes = wide_story(total, 3);
        group.bench_with_input(BenchmarkId::from_parameter(total), &nodes, |b, nodes| {
            b.iter(|| build_graph(black_box(nodes)))
        });
    }
    group.finish();
}

fn bench_canonical_path(c: &mut Criterion) {
    let graph = StoryGraph::from_nodes(wide_story(10_000, 3));
    c.bench_function("canonical_path/10000", |b| {
        b.iter(|| black_box(&graph).canonical_path())
    });
    c.bench_function("reader_start/10000", |b| {
        b.iter(|| ReaderState::start(black_box(&graph)))
    });
}

criterion_group!(benches, bench_build, bench_canonical_path);
criterion_main!(benches);
