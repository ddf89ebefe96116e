//! Dependency-graph micro-benches: Tarjan cycle detection and coupling
//! metrics on generated module graphs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use facet_analysis::graph::coupling;
use facet_analysis::graph::cycles;
use facet_analysis::graph::dependency::{
    DependencyEdge, DependencyEdgeKind, DependencyGraph, ModuleNode, ModuleType,
};
use facet_core::config::CouplingConfig;

fn module(id: String) -> ModuleNode {
    ModuleNode {
        name: id.clone(),
        path: id.clone(),
        id,
        module_type: ModuleType::Internal,
        is_external: false,
        is_entry_point: false,
        is_leaf: false,
        exports: vec!["a".to_string(), "b".to_string()],
    }
}

/// A layered graph: `n` modules, each importing its 3 successors, plus
/// a handful of back-edges forming cycles.
fn layered_graph(n: usize) -> DependencyGraph {
    let mut g = DependencyGraph::new();
    for i in 0..n {
        g.add_module(module(format!("m{i:05}")));
    }
    let edge = || DependencyEdge {
        kind: DependencyEdgeKind::Import,
        weight: 1,
    };
    for i in 0..n {
        for d in 1..=3usize {
            if i + d < n {
                let a = g.index_of(&format!("m{i:05}")).unwrap();
                let b = g.index_of(&format!("m{:05}", i + d)).unwrap();
                g.add_dependency(a, b, edge());
            }
        }
        if i % 37 == 0 && i >= 30 {
            let a = g.index_of(&format!("m{i:05}")).unwrap();
            let b = g.index_of(&format!("m{:05}", i - 30)).unwrap();
            g.add_dependency(a, b, edge());
        }
    }
    g.recompute_flags();
    g
}

fn bench_cycles(c: &mut Criterion) {
    let graph = layered_graph(1000);
    c.bench_function("tarjan_cycles_1000_modules", |b| {
        b.iter(|| cycles::detect(black_box(&graph)))
    });
}

fn bench_coupling(c: &mut Criterion) {
    let graph = layered_graph(500);
    let config = CouplingConfig::default();
    c.bench_function("coupling_metrics_500_modules", |b| {
        b.iter(|| coupling::compute(black_box(&graph), &config))
    });
}

criterion_group!(benches, bench_cycles, bench_coupling);
criterion_main!(benches);
