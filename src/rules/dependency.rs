//! Rule dependency graph
//!
//! Rule `r` depends on rule `q` when some body pattern of `r` could match a
//! triple produced by one of `q`'s head templates. Overlap is decided
//! position by position, with a variable on either side matching anything.
//! Variable identity is ignored, so the graph may contain edges no actual
//! derivation uses, but it never misses one.

use std::fmt;

use fnv::FnvHashSet;
use indexmap::{IndexMap, IndexSet};

use super::{RuleBodyElement, RuleId, RuleSet};
use crate::term::{Term, Triple};

/// Whether a dependency goes through a negation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
        }
    }
}

/// `rule` depends on `provider` with the given sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub rule: RuleId,
    pub sign: Sign,
    pub provider: RuleId,
}

/// Dependency edges of a rule set
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Every rule of the set, in rule-set order
    nodes: IndexSet<RuleId>,
    /// Outgoing edges of every rule that has at least one
    edges: IndexMap<RuleId, Vec<Edge>>,
    /// Rules that only read the base graph
    level0: IndexSet<RuleId>,
}

impl DependencyGraph {
    /// Compute the dependency graph of a rule set
    pub fn build(rules: &RuleSet) -> Self {
        let mut graph = DependencyGraph::default();

        for rule in rules {
            graph.nodes.insert(rule.id());
            let mut edges = Vec::new();
            let mut seen = FnvHashSet::default();
            collect_edges(rules, rule.id(), rule.body(), Sign::Positive, &mut edges, &mut seen);

            if edges.is_empty() {
                graph.level0.insert(rule.id());
            } else {
                graph.edges.insert(rule.id(), edges);
            }
        }
        graph
    }

    /// Every rule of the graph, in rule-set order
    pub fn rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.nodes.iter().copied()
    }

    /// Check if `rule` is a node of this graph
    pub fn contains(&self, rule: RuleId) -> bool {
        self.nodes.contains(&rule)
    }

    /// Edges out of `rule`; empty for level-0 rules
    pub fn direct_dependencies(&self, rule: RuleId) -> &[Edge] {
        self.edges.get(&rule).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if `rule` depends on nothing but the base graph
    pub fn is_level0(&self, rule: RuleId) -> bool {
        self.level0.contains(&rule)
    }

    /// Rules that depend on nothing but the base graph, in rule-set order
    pub fn level0(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.level0.iter().copied()
    }

    /// Every edge of the graph
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

fn collect_edges(
    rules: &RuleSet,
    rule: RuleId,
    body: &[RuleBodyElement],
    sign: Sign,
    edges: &mut Vec<Edge>,
    seen: &mut FnvHashSet<(Sign, RuleId)>,
) {
    for element in body {
        match element {
            RuleBodyElement::Pattern(pattern) => {
                for provider in rules {
                    if provider.head().iter().any(|template| overlaps(pattern, template))
                        && seen.insert((sign, provider.id()))
                    {
                        edges.push(Edge { rule, sign, provider: provider.id() });
                    }
                }
            }
            RuleBodyElement::Condition(_) | RuleBodyElement::Assignment(..) => {}
            RuleBodyElement::Negation(inner) => {
                collect_edges(rules, rule, inner, Sign::Negative, edges, seen);
            }
        }
    }
}

/// Could `template` produce a triple that `pattern` matches?
///
/// The predicate is compared first: it is the most selective position and
/// almost always a constant.
fn overlaps(pattern: &Triple, template: &Triple) -> bool {
    compatible(&pattern.predicate, &template.predicate)
        && compatible(&pattern.subject, &template.subject)
        && compatible(&pattern.object, &template.object)
}

fn compatible(a: &Term, b: &Term) -> bool {
    a.is_variable() || b.is_variable() || a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_transitive_closure_edges() {
        let step = Rule::builder()
            .head(Term::var("a"), ex("anc"), Term::var("c"))
            .pattern(Term::var("a"), ex("parent"), Term::var("b"))
            .pattern(Term::var("b"), ex("anc"), Term::var("c"))
            .build();
        let base = Rule::builder()
            .head(Term::var("a"), ex("anc"), Term::var("b"))
            .pattern(Term::var("a"), ex("parent"), Term::var("b"))
            .build();
        let (step_id, base_id) = (step.id(), base.id());
        let graph = DependencyGraph::build(&RuleSet::new(vec![step, base]));

        assert!(graph.is_level0(base_id));
        assert!(graph.direct_dependencies(base_id).is_empty());
        assert_eq!(graph.level0().collect::<Vec<_>>(), vec![base_id]);
        assert_eq!(graph.rules().collect::<Vec<_>>(), vec![step_id, base_id]);
        assert!(graph.contains(step_id));

        let providers: Vec<RuleId> = graph
            .direct_dependencies(step_id)
            .iter()
            .map(|e| e.provider)
            .collect();
        assert_eq!(providers, vec![step_id, base_id]);
        assert!(graph.edges().all(|e| e.sign == Sign::Positive));
    }

    #[test]
    fn test_negation_edges_are_negative() {
        let p = Rule::builder()
            .head(Term::var("x"), ex("type"), ex("P"))
            .pattern(Term::var("x"), ex("type"), ex("Q"))
            .not(|n| n.pattern(Term::var("x"), ex("type"), ex("R")))
            .build();
        let r = Rule::builder()
            .head(Term::var("x"), ex("type"), ex("R"))
            .pattern(Term::var("x"), ex("type"), ex("S"))
            .build();
        let (p_id, r_id) = (p.id(), r.id());
        let graph = DependencyGraph::build(&RuleSet::new(vec![p, r]));

        assert_eq!(
            graph.direct_dependencies(p_id),
            &[Edge { rule: p_id, sign: Sign::Negative, provider: r_id }]
        );
        assert!(graph.is_level0(r_id));
    }

    #[test]
    fn test_same_provider_under_both_signs() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("p"), Term::var("y"))
            .pattern(Term::var("x"), ex("p"), Term::var("y"))
            .pattern(Term::var("y"), ex("p"), Term::var("x"))
            .not(|n| n.pattern(Term::var("x"), ex("p"), Term::var("x")))
            .build();
        let id = rule.id();
        let graph = DependencyGraph::build(&RuleSet::new(vec![rule]));

        assert_eq!(graph.edge_count(), 2);
        let signs: Vec<Sign> = graph.direct_dependencies(id).iter().map(|e| e.sign).collect();
        assert_eq!(signs, vec![Sign::Positive, Sign::Negative]);
    }

    #[test]
    fn test_constants_must_agree() {
        let pattern = Triple::new(Term::var("x"), ex("type"), ex("A"));
        assert!(overlaps(&pattern, &Triple::new(Term::var("y"), ex("type"), Term::var("c"))));
        assert!(!overlaps(&pattern, &Triple::new(Term::var("y"), ex("type"), ex("B"))));
        assert!(!overlaps(&pattern, &Triple::new(Term::var("y"), ex("label"), ex("A"))));
        assert!(overlaps(&pattern, &Triple::new(Term::var("y"), Term::var("p"), Term::var("o"))));
    }
}
