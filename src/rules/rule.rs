//! Rule and rule-set data model

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use fnv::{FnvHashMap, FnvHashSet};

use crate::expr::Expr;
use crate::term::{Term, Triple, Variable};

/// Global counter for rule identities
static RULE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-local identity of a rule
///
/// Assigned once at construction. Dependency and stratification maps are keyed
/// by it; it carries no meaning for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    fn next() -> Self {
        RuleId(RULE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// One conjunct of a rule body
#[derive(Debug, Clone, PartialEq)]
pub enum RuleBodyElement {
    /// Unify a triple pattern against the graph
    Pattern(Triple),
    /// Keep bindings whose expression has a true effective boolean value
    Condition(Expr),
    /// Bind a fresh variable to the value of an expression
    Assignment(Variable, Expr),
    /// Keep bindings for which the inner body has no solution
    Negation(Vec<RuleBodyElement>),
}

impl RuleBodyElement {
    /// Equality up to reordering of conjuncts inside negations
    fn equivalent(&self, other: &RuleBodyElement) -> bool {
        match (self, other) {
            (RuleBodyElement::Negation(a), RuleBodyElement::Negation(b)) => {
                same_multiset(a, b, RuleBodyElement::equivalent)
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for RuleBodyElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleBodyElement::Pattern(t) => write!(f, "{}", t),
            RuleBodyElement::Condition(e) => write!(f, "FILTER({})", e),
            RuleBodyElement::Assignment(v, e) => write!(f, "BIND({} AS {})", e, v),
            RuleBodyElement::Negation(inner) => {
                write!(f, "NOT {{")?;
                for element in inner {
                    write!(f, " {}", element)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// Compare two sequences as multisets under `eq`
fn same_multiset<T>(a: &[T], b: &[T], eq: fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for x in a {
        for (i, y) in b.iter().enumerate() {
            if !used[i] && eq(x, y) {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// A rule: when the body has a solution, instantiate every head template
///
/// Rules are immutable once built. Cloning keeps the identity; a `RuleSet`
/// given two rules with the same identity renumbers the later one.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    name: Option<String>,
    head: Vec<Triple>,
    body: Vec<RuleBodyElement>,
}

impl Rule {
    /// Create a rule with a fresh identity
    pub fn new(head: Vec<Triple>, body: Vec<RuleBodyElement>) -> Self {
        Rule {
            id: RuleId::next(),
            name: None,
            head,
            body,
        }
    }

    /// Start building a rule
    pub fn builder() -> RuleBuilder {
        RuleBuilder::new()
    }

    /// Attach a human-readable name used in diagnostics
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name if there is one, otherwise the identity
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    pub fn head(&self) -> &[Triple] {
        &self.head
    }

    pub fn body(&self) -> &[RuleBodyElement] {
        &self.body
    }

    /// Same head and body up to the order of conjuncts
    pub fn equivalent(&self, other: &Rule) -> bool {
        same_multiset(&self.head, &other.head, |a, b| a == b)
            && same_multiset(&self.body, &other.body, RuleBodyElement::equivalent)
    }

    /// Same head and body in the same order
    pub fn same_form(&self, other: &Rule) -> bool {
        self.head == other.head && self.body == other.body
    }

    fn renumbered(mut self) -> Self {
        self.id = RuleId::next();
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RULE {{")?;
        for template in &self.head {
            write!(f, " {}", template)?;
        }
        write!(f, " }} WHERE {{")?;
        for element in &self.body {
            write!(f, " {}", element)?;
        }
        write!(f, " }}")
    }
}

/// An ordered collection of rules plus axiomatic data
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    data: Vec<Triple>,
    positions: FnvHashMap<RuleId, usize>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self::with_data(rules, Vec::new())
    }

    /// A rule set whose `data` triples are added to the working graph before
    /// the first stratum runs
    pub fn with_data(rules: Vec<Rule>, data: Vec<Triple>) -> Self {
        let mut seen = FnvHashSet::default();
        let rules: Vec<Rule> = rules
            .into_iter()
            .map(|rule| if seen.insert(rule.id) { rule } else { rule.renumbered() })
            .collect();

        let positions = rules.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        RuleSet { rules, data, positions }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn data(&self) -> &[Triple] {
        &self.data
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.positions.get(&id).map(|&i| &self.rules[i])
    }

    /// Position of a rule in declaration order
    pub fn position(&self, id: RuleId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Rule identities in declaration order
    pub fn ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().map(Rule::id)
    }

    /// Diagnostic label of a rule, falling back to the bare identity
    pub fn label(&self, id: RuleId) -> String {
        self.get(id).map(Rule::label).unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builds a sequence of body elements
#[derive(Debug, Clone, Default)]
pub struct BodyBuilder {
    elements: Vec<RuleBodyElement>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple pattern
    pub fn pattern(mut self, subject: Term, predicate: Term, object: Term) -> Self {
        self.elements
            .push(RuleBodyElement::Pattern(Triple::new(subject, predicate, object)));
        self
    }

    /// Add a condition
    pub fn filter(mut self, expr: Expr) -> Self {
        self.elements.push(RuleBodyElement::Condition(expr));
        self
    }

    /// Add an assignment to `var`
    pub fn bind(mut self, var: impl Into<String>, expr: Expr) -> Self {
        self.elements
            .push(RuleBodyElement::Assignment(Variable::new(var.into()), expr));
        self
    }

    /// Add a negation whose inner body is built by `inner`
    pub fn not<F>(mut self, inner: F) -> Self
    where
        F: FnOnce(BodyBuilder) -> BodyBuilder,
    {
        let inner = inner(BodyBuilder::new());
        self.elements.push(RuleBodyElement::Negation(inner.elements));
        self
    }

    pub fn build(self) -> Vec<RuleBodyElement> {
        self.elements
    }
}

/// Fluent construction of a `Rule`
///
/// ```rust,ignore
/// let rule = Rule::builder()
///     .head(Term::var("a"), ex("anc"), Term::var("b"))
///     .pattern(Term::var("a"), ex("parent"), Term::var("b"))
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    name: Option<String>,
    head: Vec<Triple>,
    body: BodyBuilder,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a head template
    pub fn head(mut self, subject: Term, predicate: Term, object: Term) -> Self {
        self.head.push(Triple::new(subject, predicate, object));
        self
    }

    pub fn pattern(mut self, subject: Term, predicate: Term, object: Term) -> Self {
        self.body = self.body.pattern(subject, predicate, object);
        self
    }

    pub fn filter(mut self, expr: Expr) -> Self {
        self.body = self.body.filter(expr);
        self
    }

    pub fn bind(mut self, var: impl Into<String>, expr: Expr) -> Self {
        self.body = self.body.bind(var, expr);
        self
    }

    pub fn not<F>(mut self, inner: F) -> Self
    where
        F: FnOnce(BodyBuilder) -> BodyBuilder,
    {
        self.body = self.body.not(inner);
        self
    }

    /// Finish the rule; well-formedness is checked when the rule set is prepared
    pub fn build(self) -> Rule {
        let rule = Rule::new(self.head, self.body.build());
        match self.name {
            Some(name) => rule.with_name(name),
            None => rule,
        }
    }
}
