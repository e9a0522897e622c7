//! Rules and their static analysis
//!
//! A rule set goes through four passes before it can be evaluated:
//! 1. Well-formedness: every variable is bound before it is read
//! 2. Dependency graph: which rules may feed which body patterns
//! 3. Recursion check: no dependency cycle passes through a negation
//! 4. Stratification: rules grouped into layers evaluated bottom-up
//!
//! Each pass is a free function over the previous pass's output so it can be
//! run and tested on its own; `RuleEngine::prepare` runs them in order.

mod rule;
pub mod dependency;
pub mod recursion;
pub mod stratify;
pub mod wellformed;

pub use dependency::{DependencyGraph, Edge, Sign};
pub use recursion::{check_recursion, RecursionReport};
pub use rule::{BodyBuilder, Rule, RuleBodyElement, RuleBuilder, RuleId, RuleSet};
pub use stratify::{stratify, Stratification};
pub use wellformed::{check_rule, check_rule_set};
