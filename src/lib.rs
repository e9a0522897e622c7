//! Strata - stratified forward-chaining rules over RDF graphs
//!
//! Rules have the form `RULE { head } WHERE { body }`, where the body mixes
//! triple patterns, filter conditions, variable assignments and negated
//! sub-bodies. A rule set is checked and stratified once, then evaluated to
//! its fixpoint over any number of base graphs.
//!
//! # Architecture
//!
//! The crate is organized around a few trait seams:
//!
//! - [`core::Graph`] - Read access to a set of triples
//! - [`core::GraphMut`] - Append access, implemented by [`Store`]
//! - [`core::ExprEvaluator`] - Evaluation of conditions and assignments
//! - [`core::EvaluationHook`] - Observation of a running evaluation
//!
//! # Example
//!
//! ```rust
//! use strata::{evaluate, Graph, GraphMut, Rule, RuleSet, Store, Term, Triple};
//!
//! let ex = |local: &str| Term::uri(format!("http://example.org/{}", local));
//!
//! let mut graph = Store::new();
//! graph.add(Triple::new(ex("x"), ex("parent"), ex("y")));
//! graph.add(Triple::new(ex("y"), ex("parent"), ex("z")));
//!
//! let rules = RuleSet::new(vec![
//!     Rule::builder()
//!         .head(Term::var("a"), ex("anc"), Term::var("b"))
//!         .pattern(Term::var("a"), ex("parent"), Term::var("b"))
//!         .build(),
//!     Rule::builder()
//!         .head(Term::var("a"), ex("anc"), Term::var("c"))
//!         .pattern(Term::var("a"), ex("parent"), Term::var("b"))
//!         .pattern(Term::var("b"), ex("anc"), Term::var("c"))
//!         .build(),
//! ]);
//!
//! let result = evaluate(&graph, rules).unwrap();
//! assert_eq!(result.inferred().len(), 3);
//! ```

pub mod core;
pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod logging;
pub mod rules;
pub mod store;
pub mod term;

// Re-export core traits
pub use crate::core::{EvaluationHook, ExprEvaluator, Graph, GraphExt, GraphMut, ns};

// Re-export term types
pub use term::{Binding, BlankNode, Datatype, Literal, Term, Triple, Uri, Variable};

// Re-export store types
pub use store::{Overlay, Store};

// Re-export expression types
pub use expr::{ArithOp, CompareOp, EvalError, Expr, FunctionRegistry, StandardEvaluator};

// Re-export rule types
pub use rules::{
    DependencyGraph, RecursionReport, Rule, RuleBodyElement, RuleBuilder, RuleId, RuleSet, Sign,
    Stratification,
};

// Re-export engine types
pub use engine::{evaluate, EngineConfig, EvalStats, Evaluation, RuleEngine};

// Re-export configuration types
pub use config::{ConfigError, EngineProfile, LogLevel, StrataConfig};

// Re-export error types
pub use error::{ErrorCategory, ErrorCode, ErrorContext, StrataError, StrataResult};
