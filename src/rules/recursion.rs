//! Detection of recursion through negation
//!
//! Rules are grouped into strongly connected components of the dependency
//! graph (Tarjan). Every cycle lies inside one component, so a cycle through
//! a negative edge exists exactly when some negative edge joins two rules of
//! the same component. Only then is a concrete cycle traced, for the error.
//! A negative edge that leads into a positive cycle from outside is legal.
//! Rules on positive cycles, including self-loops, are reported as recursive.

use std::collections::VecDeque;

use fnv::FnvHashMap;
use indexmap::IndexSet;

use super::dependency::{DependencyGraph, Sign};
use super::{RuleId, RuleSet};
use crate::error::{StrataError, StrataResult};

/// Rules found on legal (positive) cycles
#[derive(Debug, Clone, Default)]
pub struct RecursionReport {
    recursive: IndexSet<RuleId>,
}

impl RecursionReport {
    /// Check if `rule` lies on a positive dependency cycle
    pub fn is_recursive(&self, rule: RuleId) -> bool {
        self.recursive.contains(&rule)
    }

    pub fn recursive_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.recursive.iter().copied()
    }

    pub fn has_recursion(&self) -> bool {
        !self.recursive.is_empty()
    }
}

/// Reject rule sets with a dependency cycle through negation
pub fn check_recursion(graph: &DependencyGraph, rules: &RuleSet) -> StrataResult<RecursionReport> {
    let components = Components::of(graph, rules);

    for id in rules.ids() {
        for edge in graph.direct_dependencies(id) {
            if edge.sign == Sign::Negative && components.same(id, edge.provider) {
                let cycle = components.cycle_through(graph, rules, id, edge.provider);
                let names: Vec<String> = cycle.iter().map(|&r| rules.label(r)).collect();
                tracing::debug!(path = %names.join(" -> "), "recursion through negation");
                return Err(StrataError::illegal_recursion(&names));
            }
        }
    }

    let mut report = RecursionReport::default();
    for id in rules.ids() {
        let cyclic = components.size(id) > 1
            || graph.direct_dependencies(id).iter().any(|e| e.provider == id);
        if cyclic {
            report.recursive.insert(id);
        }
    }
    Ok(report)
}

/// Strongly connected components, numbered in the order Tarjan closes them
struct Components {
    component: FnvHashMap<RuleId, usize>,
    sizes: Vec<usize>,
}

impl Components {
    fn of(graph: &DependencyGraph, rules: &RuleSet) -> Self {
        let mut tarjan = Tarjan {
            graph,
            next_index: 0,
            index: FnvHashMap::default(),
            low: FnvHashMap::default(),
            stack: Vec::new(),
            on_stack: FnvHashMap::default(),
            components: Components { component: FnvHashMap::default(), sizes: Vec::new() },
        };
        for id in rules.ids() {
            if !tarjan.index.contains_key(&id) {
                tarjan.visit(id);
            }
        }
        tarjan.components
    }

    fn same(&self, a: RuleId, b: RuleId) -> bool {
        match (self.component.get(&a), self.component.get(&b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    fn size(&self, rule: RuleId) -> usize {
        self.component.get(&rule).map_or(0, |&c| self.sizes[c])
    }

    /// A cycle taking the edge `from -> to`, both in one component
    ///
    /// The shortest way back from `to` to `from` is found breadth-first
    /// inside the component. The cycle is rotated to start at the rule
    /// defined first, and its first rule is repeated at the end.
    fn cycle_through(
        &self,
        graph: &DependencyGraph,
        rules: &RuleSet,
        from: RuleId,
        to: RuleId,
    ) -> Vec<RuleId> {
        let mut came_from: FnvHashMap<RuleId, RuleId> = FnvHashMap::default();
        let mut queue = VecDeque::from([to]);
        while let Some(rule) = queue.pop_front() {
            if rule == from {
                break;
            }
            for edge in graph.direct_dependencies(rule) {
                let next = edge.provider;
                if next != to && self.same(next, from) && !came_from.contains_key(&next) {
                    came_from.insert(next, rule);
                    queue.push_back(next);
                }
            }
        }

        // Walk back from `from` to `to`
        let mut back = vec![from];
        let mut rule = from;
        while rule != to {
            match came_from.get(&rule) {
                Some(&prev) => {
                    back.push(prev);
                    rule = prev;
                }
                None => break,
            }
        }
        back.reverse();
        // `back` runs to ... from; the cycle is from -> to -> ... -> from
        let mut cycle = vec![from];
        if from != to {
            cycle.extend(back.into_iter().take_while(|&r| r != from));
        }

        let order: FnvHashMap<RuleId, usize> =
            rules.ids().enumerate().map(|(i, id)| (id, i)).collect();
        let start = cycle
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| order.get(r).copied().unwrap_or(usize::MAX))
            .map_or(0, |(i, _)| i);
        cycle.rotate_left(start);
        cycle.push(cycle[0]);
        cycle
    }
}

struct Tarjan<'g> {
    graph: &'g DependencyGraph,
    next_index: usize,
    index: FnvHashMap<RuleId, usize>,
    low: FnvHashMap<RuleId, usize>,
    stack: Vec<RuleId>,
    on_stack: FnvHashMap<RuleId, bool>,
    components: Components,
}

impl Tarjan<'_> {
    fn visit(&mut self, rule: RuleId) {
        let graph = self.graph;
        self.index.insert(rule, self.next_index);
        self.low.insert(rule, self.next_index);
        self.next_index += 1;
        self.stack.push(rule);
        self.on_stack.insert(rule, true);

        for edge in graph.direct_dependencies(rule) {
            let next = edge.provider;
            if !self.index.contains_key(&next) {
                self.visit(next);
                let low = self.low[&rule].min(self.low[&next]);
                self.low.insert(rule, low);
            } else if self.on_stack.get(&next).copied().unwrap_or(false) {
                let low = self.low[&rule].min(self.index[&next]);
                self.low.insert(rule, low);
            }
        }

        if self.low[&rule] == self.index[&rule] {
            let component = self.components.sizes.len();
            let mut size = 0;
            while let Some(member) = self.stack.pop() {
                self.on_stack.insert(member, false);
                self.components.component.insert(member, component);
                size += 1;
                if member == rule {
                    break;
                }
            }
            self.components.sizes.push(size);
        }
    }
}
