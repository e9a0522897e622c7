//! Rule body interpretation
//!
//! A body is evaluated as a chain of bindings transformed left to right by
//! each element. The chain starts as the single empty binding; an element
//! that leaves it empty ends the evaluation early.

use tracing::trace;

use crate::core::{ExprEvaluator, Graph};
use crate::error::{StrataError, StrataResult};
use crate::rules::{Rule, RuleBodyElement};
use crate::term::{Binding, Triple};

/// Evaluates rule bodies against one working graph
pub struct BodyEvaluator<'a> {
    graph: &'a dyn Graph,
    exprs: &'a dyn ExprEvaluator,
}

impl<'a> BodyEvaluator<'a> {
    pub fn new(graph: &'a dyn Graph, exprs: &'a dyn ExprEvaluator) -> Self {
        BodyEvaluator { graph, exprs }
    }

    /// All solutions of a rule's body
    pub fn solve(&self, rule: &Rule) -> Vec<Binding> {
        self.solve_body(rule.body(), Binding::new())
    }

    /// All extensions of `start` that satisfy `body`
    pub fn solve_body(&self, body: &[RuleBodyElement], start: Binding) -> Vec<Binding> {
        let mut chain = vec![start];
        for element in body {
            if chain.is_empty() {
                break;
            }
            chain = self.step(chain, element);
        }
        chain
    }

    fn step(&self, chain: Vec<Binding>, element: &RuleBodyElement) -> Vec<Binding> {
        match element {
            RuleBodyElement::Pattern(pattern) => chain
                .iter()
                .flat_map(|binding| self.match_pattern(binding, pattern))
                .collect(),

            // An evaluation error counts as false
            RuleBodyElement::Condition(expr) => chain
                .into_iter()
                .filter(|binding| match self.exprs.eval_condition(expr, binding) {
                    Ok(keep) => keep,
                    Err(e) => {
                        trace!(error = %e, condition = %expr, "condition failed");
                        false
                    }
                })
                .collect(),

            // A failed evaluation drops the branch
            RuleBodyElement::Assignment(var, expr) => chain
                .into_iter()
                .filter_map(|binding| match self.exprs.eval(expr, &binding) {
                    Ok(value) => binding.extend(var, value),
                    Err(e) => {
                        trace!(error = %e, variable = %var, "assignment failed");
                        None
                    }
                })
                .collect(),

            RuleBodyElement::Negation(inner) => chain
                .into_iter()
                .filter(|binding| self.solve_body(inner, binding.clone()).is_empty())
                .collect(),
        }
    }

    fn match_pattern(&self, binding: &Binding, pattern: &Triple) -> Vec<Binding> {
        let bound = binding.substitute(pattern);
        let (s, p, o) = bound.slots();
        self.graph
            .find(s, p, o)
            .iter()
            .filter_map(|candidate| binding.match_triple(&bound, candidate))
            .collect()
    }
}

/// Substitute a solution into every head template of a rule
///
/// A template left with a variable means the rule slipped past the
/// well-formedness check; that is reported, never skipped.
pub fn instantiate_head(rule: &Rule, binding: &Binding) -> StrataResult<Vec<Triple>> {
    rule.head()
        .iter()
        .map(|template| {
            let triple = binding.substitute(template);
            if triple.is_concrete() {
                Ok(triple)
            } else {
                Err(StrataError::internal_consistency(format!(
                    "head template instantiated with unbound variables: {}",
                    triple
                ))
                .with_context("rule", rule.to_string())
                .with_context("binding", format!("{:?}", binding)))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GraphMut;
    use crate::error::ErrorCode;
    use crate::expr::{ArithOp, Expr, StandardEvaluator};
    use crate::store::Store;
    use crate::term::{Term, Variable};

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    fn people() -> Store {
        let mut store = Store::new();
        store.add(Triple::new(ex("alice"), ex("age"), Term::integer(34)));
        store.add(Triple::new(ex("bob"), ex("age"), Term::integer(15)));
        store.add(Triple::new(ex("carol"), ex("age"), Term::literal("unknown")));
        store.add(Triple::new(ex("alice"), ex("knows"), ex("bob")));
        store.add(Triple::new(ex("bob"), ex("knows"), ex("bob")));
        store.add(Triple::new(ex("bob"), ex("banned"), ex("yes")));
        store
    }

    fn solve(store: &Store, rule: &Rule) -> Vec<Binding> {
        let exprs = StandardEvaluator::new();
        BodyEvaluator::new(store, &exprs).solve(rule)
    }

    fn value<'a>(binding: &'a Binding, var: &str) -> Option<&'a Term> {
        binding.get(&Variable::from(var))
    }

    #[test]
    fn test_join_across_patterns() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("knowsAge"), Term::var("a"))
            .pattern(Term::var("x"), ex("knows"), Term::var("y"))
            .pattern(Term::var("y"), ex("age"), Term::var("a"))
            .build();

        let solutions = solve(&people(), &rule);
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|b| value(b, "a") == Some(&Term::integer(15))));
    }

    #[test]
    fn test_repeated_variable_in_pattern() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("self"), ex("yes"))
            .pattern(Term::var("x"), ex("knows"), Term::var("x"))
            .build();

        let solutions = solve(&people(), &rule);
        assert_eq!(solutions.len(), 1);
        assert_eq!(value(&solutions[0], "x"), Some(&ex("bob")));
    }

    #[test]
    fn test_condition_errors_filter_out() {
        // carol's age is a string, so the comparison is a type error
        let rule = Rule::builder()
            .head(Term::var("x"), ex("adult"), ex("yes"))
            .pattern(Term::var("x"), ex("age"), Term::var("a"))
            .filter(Expr::gt(Expr::var("a"), Expr::constant(Term::integer(17))))
            .build();

        let solutions = solve(&people(), &rule);
        assert_eq!(solutions.len(), 1);
        assert_eq!(value(&solutions[0], "x"), Some(&ex("alice")));
    }

    #[test]
    fn test_assignment_failure_drops_branch() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("nextAge"), Term::var("n"))
            .pattern(Term::var("x"), ex("age"), Term::var("a"))
            .bind("n", Expr::arith(ArithOp::Add, Expr::var("a"), Expr::constant(Term::integer(1))))
            .build();

        let mut ages: Vec<Term> = solve(&people(), &rule)
            .iter()
            .filter_map(|b| value(b, "n").cloned())
            .collect();
        ages.sort_by_key(|t| t.to_string());
        assert_eq!(ages, vec![Term::integer(16), Term::integer(35)]);
    }

    #[test]
    fn test_negation_as_failure() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("allowed"), ex("yes"))
            .pattern(Term::var("x"), ex("age"), Term::var("a"))
            .not(|n| n.pattern(Term::var("x"), ex("banned"), ex("yes")))
            .build();

        let mut names: Vec<String> = solve(&people(), &rule)
            .iter()
            .filter_map(|b| value(b, "x").map(|t| t.to_string()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["<http://example.org/alice>", "<http://example.org/carol>"]);
    }

    #[test]
    fn test_negation_bindings_stay_inside() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("lonely"), ex("yes"))
            .pattern(Term::var("x"), ex("age"), Term::var("a"))
            .not(|n| n.pattern(Term::var("x"), ex("knows"), Term::var("y")))
            .build();

        let solutions = solve(&people(), &rule);
        assert_eq!(solutions.len(), 1);
        assert!(value(&solutions[0], "y").is_none());
    }

    #[test]
    fn test_empty_body_has_one_solution() {
        let rule = Rule::new(vec![Triple::new(ex("a"), ex("b"), ex("c"))], vec![]);
        let solutions = solve(&Store::new(), &rule);
        assert_eq!(solutions, vec![Binding::new()]);
    }

    #[test]
    fn test_instantiate_head() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("p"), Term::var("y"))
            .head(Term::var("y"), ex("q"), Term::var("x"))
            .pattern(Term::var("x"), ex("r"), Term::var("y"))
            .build();
        let binding = Binding::new()
            .extend(&Variable::from("x"), ex("a"))
            .and_then(|b| b.extend(&Variable::from("y"), ex("b")))
            .unwrap();

        let triples = instantiate_head(&rule, &binding).unwrap();
        assert_eq!(
            triples,
            vec![
                Triple::new(ex("a"), ex("p"), ex("b")),
                Triple::new(ex("b"), ex("q"), ex("a")),
            ]
        );
    }

    #[test]
    fn test_instantiate_head_with_unbound_variable_is_fatal() {
        let rule = Rule::builder()
            .head(Term::var("x"), ex("p"), Term::var("y"))
            .pattern(Term::var("x"), ex("q"), Term::var("z"))
            .build();
        let binding = Binding::new().extend(&Variable::from("x"), ex("a")).unwrap();

        let err = instantiate_head(&rule, &binding).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalConsistency);
    }
}
