//! Assignment of rules to strata
//!
//! Strata are found by raising levels until every edge is satisfied:
//! a positive edge `p -> q` needs `stratum(p) >= stratum(q)`, a negative edge
//! needs `stratum(p) > stratum(q)`. Rules without dependencies start at 0,
//! all others at 1. The loop is bounded by the number of rules plus one; a
//! rule set that passed the recursion check always settles before that.

use fnv::FnvHashMap;

use super::dependency::{DependencyGraph, Sign};
use super::{RuleId, RuleSet};
use crate::error::{StrataError, StrataResult};

/// Rules grouped by stratum
#[derive(Debug, Clone, Default)]
pub struct Stratification {
    /// `levels[i]` holds the rules of stratum `i`, in rule-set order
    levels: Vec<Vec<RuleId>>,
    strata: FnvHashMap<RuleId, usize>,
}

impl Stratification {
    /// The highest stratum; 0 for an empty rule set
    pub fn max_stratum(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Rules assigned exactly stratum `i`
    pub fn level(&self, i: usize) -> &[RuleId] {
        self.levels.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stratum_of(&self, rule: RuleId) -> Option<usize> {
        self.strata.get(&rule).copied()
    }

    /// Number of strata, empty ones included
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Stratify a rule set whose recursion has already been checked
pub fn stratify(rules: &RuleSet, graph: &DependencyGraph) -> StrataResult<Stratification> {
    let mut strata: FnvHashMap<RuleId, usize> = rules
        .ids()
        .map(|id| (id, if graph.is_level0(id) { 0 } else { 1 }))
        .collect();

    let bound = rules.len() + 1;
    let mut settled = false;

    for _ in 0..bound {
        let mut changed = false;
        for edge in graph.edges() {
            let provider = strata.get(&edge.provider).copied().unwrap_or(0);
            let required = match edge.sign {
                Sign::Positive => provider,
                Sign::Negative => provider + 1,
            };
            let level = strata.entry(edge.rule).or_insert(0);
            if *level < required {
                *level = required;
                changed = true;
            }
        }
        if !changed {
            settled = true;
            break;
        }
    }

    if !settled {
        tracing::warn!(bound, "stratification did not settle");
        return Err(StrataError::stratum_bound_exceeded(bound));
    }

    let max = strata.values().copied().max().unwrap_or(0);
    let mut levels = if rules.is_empty() { Vec::new() } else { vec![Vec::new(); max + 1] };
    for id in rules.ids() {
        if let Some(&level) = strata.get(&id) {
            levels[level].push(id);
        }
    }

    Ok(Stratification { levels, strata })
}
