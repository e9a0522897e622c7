//! Variable bindings
//!
//! A `Binding` is an immutable partial map from variables to concrete terms.
//! Extending a binding never mutates it; a new binding sharing nothing but the
//! cloned entries is returned instead, so bindings can be held by several
//! branches of a binding chain at once.

use std::fmt;
use std::sync::Arc;

use fnv::FnvHashMap;

use super::{Term, Triple, Variable};

/// Bindings from variables to terms
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Binding {
    vars: Arc<FnvHashMap<Variable, Term>>,
}

impl Binding {
    /// The empty binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the term bound to a variable
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.vars.get(var)
    }

    /// Check whether a variable is bound
    pub fn contains(&self, var: &Variable) -> bool {
        self.vars.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(variable, term)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.vars.iter()
    }

    /// Extend with `var -> term`
    ///
    /// Returns `None` when `var` is already bound to a different term. Binding
    /// a variable to the term it already has returns an equal binding.
    pub fn extend(&self, var: &Variable, term: Term) -> Option<Binding> {
        match self.vars.get(var) {
            Some(existing) if *existing == term => Some(self.clone()),
            Some(_) => None,
            None => {
                let mut vars = (*self.vars).clone();
                vars.insert(var.clone(), term);
                Some(Binding { vars: Arc::new(vars) })
            }
        }
    }

    /// Apply this binding to a term, substituting a bound variable
    pub fn resolve(&self, term: &Term) -> Term {
        match term {
            Term::Variable(v) => self.vars.get(v).cloned().unwrap_or_else(|| term.clone()),
            _ => term.clone(),
        }
    }

    /// Apply this binding to a triple
    pub fn substitute(&self, triple: &Triple) -> Triple {
        Triple {
            subject: self.resolve(&triple.subject),
            predicate: self.resolve(&triple.predicate),
            object: self.resolve(&triple.object),
        }
    }

    /// Unify a pattern with a concrete triple, extending this binding
    ///
    /// A variable repeated inside the pattern (`?x :p ?x`) only matches when the
    /// corresponding positions of `candidate` are equal.
    pub fn match_triple(&self, pattern: &Triple, candidate: &Triple) -> Option<Binding> {
        let mut current = self.clone();
        for (p, c) in [
            (&pattern.subject, &candidate.subject),
            (&pattern.predicate, &candidate.predicate),
            (&pattern.object, &candidate.object),
        ] {
            current = match p {
                Term::Variable(var) => current.extend(var, c.clone())?,
                _ if p == c => current,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.vars.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        write!(f, "{{")?;
        for (i, (var, term)) in entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {:?}", var, term)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_extend_is_persistent() {
        let x = Variable::from("x");
        let empty = Binding::new();
        let bound = empty.extend(&x, ex("a")).unwrap();

        assert!(empty.is_empty());
        assert_eq!(bound.get(&x), Some(&ex("a")));
    }

    #[test]
    fn test_extend_conflict_is_a_failed_match() {
        let x = Variable::from("x");
        let bound = Binding::new().extend(&x, ex("a")).unwrap();

        assert!(bound.extend(&x, ex("b")).is_none());
        assert_eq!(bound.extend(&x, ex("a")), Some(bound.clone()));
    }

    #[test]
    fn test_substitute() {
        let x = Variable::from("x");
        let binding = Binding::new().extend(&x, ex("a")).unwrap();
        let pattern = Triple::new(Term::var("x"), ex("p"), Term::var("y"));

        let result = binding.substitute(&pattern);
        assert_eq!(result.subject, ex("a"));
        assert_eq!(result.object, Term::var("y"));
    }

    #[test]
    fn test_match_triple_enforces_repeated_variables() {
        let pattern = Triple::new(Term::var("x"), ex("p"), Term::var("x"));

        let same = Triple::new(ex("a"), ex("p"), ex("a"));
        let different = Triple::new(ex("a"), ex("p"), ex("b"));

        assert!(Binding::new().match_triple(&pattern, &same).is_some());
        assert!(Binding::new().match_triple(&pattern, &different).is_none());
    }

    #[test]
    fn test_match_triple_respects_existing_binding() {
        let x = Variable::from("x");
        let binding = Binding::new().extend(&x, ex("a")).unwrap();
        let pattern = Triple::new(Term::var("x"), ex("p"), Term::var("y"));

        let hit = Triple::new(ex("a"), ex("p"), ex("b"));
        let miss = Triple::new(ex("c"), ex("p"), ex("b"));

        let extended = binding.match_triple(&pattern, &hit).unwrap();
        assert_eq!(extended.get(&Variable::from("y")), Some(&ex("b")));
        assert!(binding.match_triple(&pattern, &miss).is_none());
    }
}
