//! Static well-formedness checks
//!
//! A rule is well-formed when every variable read by a condition, an
//! assignment or a head template has been bound by an earlier body element,
//! and no assignment rebinds a variable. Patterns bind; they never require.
//! A negation is checked against a copy of the outer scope, so nothing it
//! binds is visible after it.

use fnv::FnvHashSet;

use super::{Rule, RuleBodyElement, RuleSet};
use crate::error::{StrataError, StrataResult};
use crate::term::Variable;

/// Check one rule
pub fn check_rule(rule: &Rule) -> StrataResult<()> {
    let mut defined = FnvHashSet::default();
    check_body(rule, rule.body(), &mut defined)?;

    for template in rule.head() {
        for var in template.variables() {
            if !defined.contains(var) {
                return Err(unbound(rule, var, "head template"));
            }
        }
    }
    Ok(())
}

/// Check every rule of a set, and that its data triples are concrete
pub fn check_rule_set(rules: &RuleSet) -> StrataResult<()> {
    for rule in rules {
        check_rule(rule)?;
    }

    if let Some(triple) = rules.data().iter().find(|t| !t.is_concrete()) {
        return Err(StrataError::not_well_formed("rule set data must be concrete")
            .with_context("triple", triple.to_string()));
    }
    Ok(())
}

fn check_body(
    rule: &Rule,
    body: &[RuleBodyElement],
    defined: &mut FnvHashSet<Variable>,
) -> StrataResult<()> {
    for element in body {
        match element {
            RuleBodyElement::Pattern(pattern) => {
                defined.extend(pattern.variables().cloned());
            }
            RuleBodyElement::Condition(expr) => {
                if let Some(var) = expr.variables().into_iter().find(|v| !defined.contains(*v)) {
                    return Err(unbound(rule, var, "condition"));
                }
            }
            RuleBodyElement::Assignment(target, expr) => {
                if let Some(var) = expr.variables().into_iter().find(|v| !defined.contains(*v)) {
                    return Err(unbound(rule, var, "assignment"));
                }
                if !defined.insert(target.clone()) {
                    return Err(StrataError::not_well_formed(format!(
                        "variable {} is assigned but already bound",
                        target
                    ))
                    .with_context("rule", rule.to_string())
                    .with_context("variable", target.to_string()));
                }
            }
            RuleBodyElement::Negation(inner) => {
                let mut scope = defined.clone();
                check_body(rule, inner, &mut scope)?;
            }
        }
    }
    Ok(())
}

fn unbound(rule: &Rule, var: &Variable, place: &str) -> StrataError {
    StrataError::not_well_formed(format!("variable {} in {} is not bound", var, place))
        .with_context("rule", rule.to_string())
        .with_context("variable", var.to_string())
        .with_hint("Bind the variable in a preceding triple pattern or assignment")
}
