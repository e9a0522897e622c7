//! Core trait abstractions
//!
//! This module defines the collaborator seams of the rule engine:
//! - Graph access (pattern lookup, membership, insertion)
//! - Expression evaluation for conditions and assignments
//! - Observable evaluation hooks
//!
//! The engine only ever talks to these traits; `Store`, `Overlay` and
//! `StandardEvaluator` are the in-crate implementations.

use crate::expr::{EvalError, Expr};
use crate::rules::RuleId;
use crate::term::{Binding, Term, Triple};

// ============================================================================
// Graph Abstraction
// ============================================================================

/// A read-only view of a set of concrete triples
///
/// This trait is dyn-compatible; the engine receives the base graph as
/// `&dyn Graph` and layers its own additions on top.
pub trait Graph: Send + Sync {
    /// All triples matching the given slots, `None` being a wildcard
    fn find(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<Triple>;

    /// Check if a triple exists in the graph
    fn contains(&self, triple: &Triple) -> bool;

    /// Get the number of triples
    fn len(&self) -> usize;

    /// Check if the graph is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all triples
    fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_>;

    /// Match a pattern, returning one binding per matching triple
    ///
    /// Variables in the pattern act as wildcards for the lookup and are bound
    /// by unification against each candidate.
    fn match_pattern(&self, pattern: &Triple) -> Vec<Binding> {
        let (s, p, o) = pattern.slots();
        self.find(s, p, o)
            .iter()
            .filter_map(|candidate| Binding::new().match_triple(pattern, candidate))
            .collect()
    }
}

/// A graph that accepts new triples
pub trait GraphMut: Graph {
    /// Add a concrete triple, returning `true` if it was not already present
    fn add(&mut self, triple: Triple) -> bool;

    /// Add multiple triples (boxed iterator for dyn-compatibility), returning
    /// how many were new
    fn add_all(&mut self, triples: Box<dyn Iterator<Item = Triple> + '_>) -> usize {
        let mut added = 0;
        for triple in triples {
            if self.add(triple) {
                added += 1;
            }
        }
        added
    }
}

/// Extension trait for convenience methods on `GraphMut`
pub trait GraphExt: GraphMut {
    /// Add triples from any iterator
    fn add_iter<I: IntoIterator<Item = Triple>>(&mut self, triples: I) -> usize {
        let mut added = 0;
        for triple in triples {
            if self.add(triple) {
                added += 1;
            }
        }
        added
    }
}

// Blanket implementation for all GraphMut implementors
impl<T: GraphMut + ?Sized> GraphExt for T {}

// ============================================================================
// Expression Evaluation
// ============================================================================

/// Evaluator for the expressions used by condition and assignment elements
///
/// The engine treats evaluation as opaque: it only looks at success or
/// failure and, for conditions, at the effective boolean value.
pub trait ExprEvaluator: Send + Sync {
    /// Evaluate an expression under a binding
    fn eval(&self, expr: &Expr, binding: &Binding) -> Result<Term, EvalError>;

    /// Evaluate an expression and coerce the result to a boolean
    fn eval_condition(&self, expr: &Expr, binding: &Binding) -> Result<bool, EvalError> {
        let value = self.eval(expr, binding)?;
        crate::expr::effective_boolean_value(&value)
    }
}

// ============================================================================
// Evaluation Hooks (Observer Pattern)
// ============================================================================

/// Hook for observing evaluation events
///
/// Hooks receive callbacks during evaluation for logging, debugging or
/// metrics. They have no influence on the result.
pub trait EvaluationHook: Send + Sync {
    /// Called when a rule derives a triple that was not yet in the working graph
    fn on_triple_derived(&self, _triple: &Triple, _rule: RuleId) {}

    /// Called at the end of each round
    fn on_round_complete(&self, _stratum: usize, _round: usize, _added: usize) {}

    /// Called when a stratum reaches its fixpoint
    fn on_stratum_complete(&self, _stratum: usize, _rounds: usize, _graph_size: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_default_match_pattern() {
        let mut store = Store::new();
        store.add(Triple::new(ex("a"), ex("p"), ex("b")));
        store.add(Triple::new(ex("a"), ex("q"), ex("c")));

        let pattern = Triple::new(ex("a"), Term::var("p"), Term::var("o"));
        assert_eq!(store.match_pattern(&pattern).len(), 2);
    }

    #[test]
    fn test_add_iter_counts_new_triples() {
        let mut store = Store::new();
        let t = Triple::new(ex("a"), ex("p"), ex("b"));
        let added = store.add_iter(vec![t.clone(), t.clone(), Triple::new(ex("b"), ex("p"), ex("c"))]);
        assert_eq!(added, 2);
    }
}
