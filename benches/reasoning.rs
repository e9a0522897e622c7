//! Benchmarks for rule evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata::{GraphMut, Rule, RuleEngine, RuleSet, Store, Term, Triple};

fn ex(local: &str) -> Term {
    Term::uri(format!("http://example.org/{}", local))
}

fn node(i: usize) -> Term {
    ex(&format!("n{}", i))
}

/// A chain `n0 -> n1 -> ... -> n{len}`
fn chain(len: usize) -> Store {
    let mut store = Store::new();
    for i in 0..len {
        store.add(Triple::new(node(i), ex("parent"), node(i + 1)));
    }
    store
}

fn ancestor_rules() -> RuleSet {
    RuleSet::new(vec![
        Rule::builder()
            .head(Term::var("a"), ex("anc"), Term::var("b"))
            .pattern(Term::var("a"), ex("parent"), Term::var("b"))
            .build(),
        Rule::builder()
            .head(Term::var("a"), ex("anc"), Term::var("c"))
            .pattern(Term::var("a"), ex("parent"), Term::var("b"))
            .pattern(Term::var("b"), ex("anc"), Term::var("c"))
            .build(),
    ])
}

fn transitive_closure_benchmark(c: &mut Criterion) {
    let engine = RuleEngine::prepare(ancestor_rules()).unwrap();
    let mut group = c.benchmark_group("transitive_closure");

    for len in [10, 25, 50] {
        let graph = chain(len);
        group.bench_with_input(BenchmarkId::new("chain", len), &graph, |b, graph| {
            b.iter(|| black_box(engine.evaluate(graph).unwrap().inferred().len()))
        });
    }

    group.finish();
}

fn negation_benchmark(c: &mut Criterion) {
    // Nodes with a parent but no grandparent
    let rules = RuleSet::new(vec![
        Rule::builder()
            .head(Term::var("x"), ex("grandchildOf"), Term::var("z"))
            .pattern(Term::var("x"), ex("parent"), Term::var("y"))
            .pattern(Term::var("y"), ex("parent"), Term::var("z"))
            .build(),
        Rule::builder()
            .head(Term::var("x"), ex("is"), ex("Root"))
            .pattern(Term::var("x"), ex("parent"), Term::var("y"))
            .not(|n| n.pattern(Term::var("x"), ex("grandchildOf"), Term::var("z")))
            .build(),
    ]);
    let engine = RuleEngine::prepare(rules).unwrap();
    let mut group = c.benchmark_group("negation");

    for len in [50, 200] {
        let graph = chain(len);
        group.bench_with_input(BenchmarkId::new("chain", len), &graph, |b, graph| {
            b.iter(|| black_box(engine.evaluate(graph).unwrap().inferred().len()))
        });
    }

    group.finish();
}

fn prepare_benchmark(c: &mut Criterion) {
    c.bench_function("prepare_ancestor", |b| {
        b.iter(|| black_box(RuleEngine::prepare(ancestor_rules()).unwrap().stratification().len()))
    });
}

criterion_group!(
    benches,
    transitive_closure_benchmark,
    negation_benchmark,
    prepare_benchmark,
);

criterion_main!(benches);
