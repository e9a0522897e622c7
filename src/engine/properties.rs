//! Property-based tests for the fixpoint driver
//!
//! Rule sets are drawn from a few binary-predicate shapes over a five-node
//! universe, so every generated set is well-formed and small enough to reach
//! its fixpoint quickly.

use proptest::prelude::*;

use super::RuleEngine;
use crate::core::Graph;
use crate::rules::{Rule, RuleSet, Sign};
use crate::store::Store;
use crate::term::{Term, Triple};

fn node(i: u8) -> Term {
    Term::uri(format!("http://example.org/n{}", i))
}

fn pred(i: u8) -> Term {
    Term::uri(format!("http://example.org/p{}", i))
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    /// `?x h ?y :- ?x a ?y`
    Copy,
    /// `?y h ?x :- ?x a ?y`
    Invert,
    /// `?x h ?z :- ?x a ?y, ?y b ?z`
    Join,
    /// `?x h ?y :- ?x a ?y, NOT { ?x b ?y }`
    Except,
}

#[derive(Debug, Clone, Copy)]
struct RuleShape {
    shape: Shape,
    head: u8,
    a: u8,
    b: u8,
}

impl RuleShape {
    fn build(self) -> Rule {
        let (x, y, z) = (Term::var("x"), Term::var("y"), Term::var("z"));
        let builder = Rule::builder();
        let builder = match self.shape {
            Shape::Copy => builder
                .head(x.clone(), pred(self.head), y.clone())
                .pattern(x, pred(self.a), y),
            Shape::Invert => builder
                .head(y.clone(), pred(self.head), x.clone())
                .pattern(x, pred(self.a), y),
            Shape::Join => builder
                .head(x.clone(), pred(self.head), z.clone())
                .pattern(x, pred(self.a), y.clone())
                .pattern(y, pred(self.b), z),
            Shape::Except => {
                let b = pred(self.b);
                let (nx, ny) = (x.clone(), y.clone());
                builder
                    .head(x.clone(), pred(self.head), y.clone())
                    .pattern(x, pred(self.a), y)
                    .not(move |n| n.pattern(nx, b, ny))
            }
        };
        builder.build()
    }
}

fn rule_strategy(negation: bool) -> impl Strategy<Value = RuleShape> {
    let shapes = if negation { 4 } else { 3 };
    (0..shapes, 0u8..4, 0u8..4, 0u8..4).prop_map(|(shape, head, a, b)| RuleShape {
        shape: match shape {
            0 => Shape::Copy,
            1 => Shape::Invert,
            2 => Shape::Join,
            _ => Shape::Except,
        },
        head,
        a,
        b,
    })
}

fn rules_strategy(negation: bool) -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::vec(rule_strategy(negation), 1..6)
        .prop_map(|shapes| shapes.into_iter().map(RuleShape::build).collect())
}

fn triples_strategy(max: usize) -> impl Strategy<Value = Vec<Triple>> {
    prop::collection::vec((0u8..5, 0u8..3, 0u8..5), 0..max).prop_map(|raw| {
        raw.into_iter()
            .map(|(s, p, o)| Triple::new(node(s), pred(p), node(o)))
            .collect()
    })
}

fn output(engine: &RuleEngine, base: &Store) -> Store {
    let (_, output, _) = engine
        .evaluate(base)
        .expect("generated rule sets reach a fixpoint")
        .into_parts();
    output
}

fn sorted(store: &Store) -> Vec<String> {
    let mut out: Vec<String> = store.triples().map(|t| t.to_string()).collect();
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_fixpoint_is_idempotent(rules in rules_strategy(true), base in triples_strategy(12)) {
        let engine = RuleEngine::prepare(RuleSet::new(rules));
        prop_assume!(engine.is_ok());
        let engine = engine.unwrap();

        let base: Store = base.into_iter().collect();
        let first = output(&engine, &base);
        let again = engine.evaluate(&first).unwrap();

        prop_assert!(again.inferred().is_empty());
        prop_assert_eq!(sorted(again.output()), sorted(&first));
    }

    #[test]
    fn test_positive_rules_are_monotone(
        rules in rules_strategy(false),
        base in triples_strategy(8),
        extra in triples_strategy(6),
    ) {
        let engine = RuleEngine::prepare(RuleSet::new(rules)).unwrap();

        let small: Store = base.iter().cloned().collect();
        let large: Store = base.into_iter().chain(extra).collect();
        let small_out = output(&engine, &small);
        let large_out = output(&engine, &large);

        for triple in small_out.triples() {
            prop_assert!(large_out.contains(triple), "lost {}", triple);
        }
    }

    #[test]
    fn test_every_edge_respects_strata(rules in rules_strategy(true)) {
        let engine = RuleEngine::prepare(RuleSet::new(rules));
        prop_assume!(engine.is_ok());
        let engine = engine.unwrap();

        let strata = engine.stratification();
        for edge in engine.dependencies().edges() {
            let rule = strata.stratum_of(edge.rule).unwrap();
            let provider = strata.stratum_of(edge.provider).unwrap();
            match edge.sign {
                Sign::Positive => prop_assert!(rule >= provider),
                Sign::Negative => prop_assert!(rule > provider),
            }
        }
    }

    #[test]
    fn test_rule_order_is_irrelevant(rules in rules_strategy(true), base in triples_strategy(12)) {
        let mut reversed = rules.clone();
        reversed.reverse();

        let forward = RuleEngine::prepare(RuleSet::new(rules));
        let backward = RuleEngine::prepare(RuleSet::new(reversed));
        prop_assert_eq!(forward.is_ok(), backward.is_ok());
        prop_assume!(forward.is_ok());

        let base: Store = base.into_iter().collect();
        let forward_out = output(&forward.unwrap(), &base);
        let backward_out = output(&backward.unwrap(), &base);
        prop_assert_eq!(sorted(&forward_out), sorted(&backward_out));
    }

    #[test]
    fn test_base_graph_is_preserved(rules in rules_strategy(true), base in triples_strategy(12)) {
        let engine = RuleEngine::prepare(RuleSet::new(rules));
        prop_assume!(engine.is_ok());

        let base: Store = base.into_iter().collect();
        let before = sorted(&base);
        let result = engine.unwrap().evaluate(&base).unwrap();

        prop_assert_eq!(sorted(&base), before);
        prop_assert_eq!(result.output().len(), base.len() + result.inferred().len());
        for triple in result.inferred().triples() {
            prop_assert!(!base.contains(triple));
        }
    }
}
