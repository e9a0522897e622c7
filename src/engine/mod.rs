//! Stratified forward-chaining evaluation
//!
//! `RuleEngine::prepare` runs the static passes over a rule set once; the
//! prepared engine can then evaluate any number of base graphs. Evaluation
//! runs strata in increasing order. Within a stratum every rule is evaluated
//! against the whole working graph, round after round, until a round derives
//! nothing new. The base graph is only ever read.

mod eval;

#[cfg(test)]
mod properties;

pub use eval::{instantiate_head, BodyEvaluator};

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, trace};

use crate::core::{EvaluationHook, ExprEvaluator, Graph, GraphExt};
use crate::error::{StrataError, StrataResult};
use crate::expr::StandardEvaluator;
use crate::rules::{
    check_recursion, check_rule_set, stratify, DependencyGraph, RecursionReport, RuleId, RuleSet,
    Stratification,
};
use crate::store::{Overlay, Store};
use crate::term::{Term, Triple};

/// Runtime settings of a rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Report triple counts after every round and stratum at `info` level
    pub trace: bool,
    /// Fail a stratum still deriving after this many rounds (0 = unlimited)
    pub max_rounds_per_stratum: usize,
}

/// Counters collected during one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Number of strata evaluated
    pub strata: usize,
    /// Rounds taken by each stratum, the final empty round included
    pub rounds: Vec<usize>,
    /// Body solutions found, summed over all rounds
    pub rules_fired: usize,
    /// Triples derived by rules that were not already known
    pub triples_derived: usize,
    /// Rule-set data triples that were not already in the base graph
    pub data_added: usize,
}

impl EvalStats {
    pub fn total_rounds(&self) -> usize {
        self.rounds.iter().sum()
    }
}

/// Result of an evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    inferred: Store,
    output: Store,
    stats: EvalStats,
}

impl Evaluation {
    /// Triples added beyond the base graph, rule-set data included
    pub fn inferred(&self) -> &Store {
        &self.inferred
    }

    /// The base graph plus every inferred triple
    pub fn output(&self) -> &Store {
        &self.output
    }

    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    pub fn into_parts(self) -> (Store, Store, EvalStats) {
        (self.inferred, self.output, self.stats)
    }
}

/// A prepared, reusable rule engine
pub struct RuleEngine {
    rules: RuleSet,
    dependencies: DependencyGraph,
    recursion: RecursionReport,
    strata: Stratification,
    config: EngineConfig,
    evaluator: Arc<dyn ExprEvaluator>,
    hooks: Vec<Arc<dyn EvaluationHook>>,
}

impl RuleEngine {
    /// Check and stratify a rule set
    ///
    /// Fails on ill-formed rules and on recursion through negation; no graph
    /// is touched in either case.
    pub fn prepare(rules: RuleSet) -> StrataResult<Self> {
        let span = tracing::debug_span!("prepare", rules = rules.len());
        let _enter = span.enter();

        check_rule_set(&rules)?;
        let dependencies = DependencyGraph::build(&rules);
        let recursion = check_recursion(&dependencies, &rules)?;
        let strata = stratify(&rules, &dependencies)?;

        debug!(
            edges = dependencies.edge_count(),
            recursive = recursion.recursive_rules().count(),
            strata = strata.len(),
            "rule set prepared"
        );

        Ok(RuleEngine {
            rules,
            dependencies,
            recursion,
            strata,
            config: EngineConfig::default(),
            evaluator: Arc::new(StandardEvaluator::new()),
            hooks: Vec::new(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a different expression evaluator for conditions and assignments
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExprEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Add an evaluation hook
    pub fn with_hook(mut self, hook: Arc<dyn EvaluationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    pub fn recursion(&self) -> &RecursionReport {
        &self.recursion
    }

    pub fn stratification(&self) -> &Stratification {
        &self.strata
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the fixpoint of the rule set over `graph`
    pub fn evaluate(&self, graph: &dyn Graph) -> StrataResult<Evaluation> {
        let span = tracing::debug_span!("evaluate", rules = self.rules.len(), base = graph.len());
        let _enter = span.enter();

        let mut stats = EvalStats::default();
        let (mut working, seeded) = Overlay::new(graph).extended(self.rules.data().iter().cloned());
        stats.data_added = seeded;

        for stratum in 0..self.strata.len() {
            let (next, rounds) = self.run_stratum(stratum, working, &mut stats)?;
            working = next;
            stats.strata += 1;
            stats.rounds.push(rounds);

            if self.config.trace {
                info!(stratum, rounds, graph_size = working.len(), "stratum complete");
            }
            for hook in &self.hooks {
                hook.on_stratum_complete(stratum, rounds, working.len());
            }
        }

        let inferred = working.into_added();
        let mut output = Store::from_graph(graph);
        output.add_iter(inferred.triples().cloned());

        debug!(
            inferred = inferred.len(),
            rounds = stats.total_rounds(),
            fired = stats.rules_fired,
            "evaluation complete"
        );

        Ok(Evaluation { inferred, output, stats })
    }

    /// Evaluate, then match the output graph against a pattern
    pub fn solve(
        &self,
        graph: &dyn Graph,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> StrataResult<Vec<Triple>> {
        let evaluation = self.evaluate(graph)?;
        Ok(evaluation.output().find(subject, predicate, object))
    }

    /// Run one stratum to its fixpoint, returning the grown graph and the round count
    fn run_stratum<'g>(
        &self,
        stratum: usize,
        mut working: Overlay<'g>,
        stats: &mut EvalStats,
    ) -> StrataResult<(Overlay<'g>, usize)> {
        let level = self.strata.level(stratum);
        if level.is_empty() {
            return Ok((working, 0));
        }

        let limit = self.config.max_rounds_per_stratum;
        let mut round = 0;
        loop {
            round += 1;
            let fresh = self.run_round(&working, level, stats)?;
            let added = fresh.len();

            for (triple, rule) in &fresh {
                for hook in &self.hooks {
                    hook.on_triple_derived(triple, *rule);
                }
            }
            let (next, _) = working.extended(fresh.into_keys());
            working = next;
            stats.triples_derived += added;

            if self.config.trace {
                info!(stratum, round, added, graph_size = working.len(), "round complete");
            } else {
                trace!(stratum, round, added, "round complete");
            }
            for hook in &self.hooks {
                hook.on_round_complete(stratum, round, added);
            }

            if added == 0 {
                return Ok((working, round));
            }
            if limit > 0 && round >= limit {
                return Err(StrataError::round_limit_exceeded(stratum, limit));
            }
        }
    }

    /// Evaluate every rule of a level once against the same graph
    ///
    /// Returns the derived triples not yet in the graph, each with the first
    /// rule that produced it.
    fn run_round(
        &self,
        working: &Overlay<'_>,
        level: &[RuleId],
        stats: &mut EvalStats,
    ) -> StrataResult<IndexMap<Triple, RuleId>> {
        let bodies = BodyEvaluator::new(working, self.evaluator.as_ref());
        let mut fresh = IndexMap::new();

        for &id in level {
            let rule = self.rules.get(id).ok_or_else(|| {
                StrataError::internal(format!("stratum refers to unknown rule {}", id))
            })?;

            let solutions = bodies.solve(rule);
            stats.rules_fired += solutions.len();

            for binding in &solutions {
                for triple in instantiate_head(rule, binding)? {
                    if !working.contains(&triple) {
                        fresh.entry(triple).or_insert(id);
                    }
                }
            }
        }
        Ok(fresh)
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rules.len())
            .field("strata", &self.strata.len())
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Prepare a rule set and evaluate it over `graph` in one step
pub fn evaluate(graph: &dyn Graph, rules: RuleSet) -> StrataResult<Evaluation> {
    RuleEngine::prepare(rules)?.evaluate(graph)
}
