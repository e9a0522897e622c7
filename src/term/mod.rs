//! RDF term representations
//!
//! This module defines the core data types for representing RDF terms and
//! the rule-level constructs built on them:
//! - URIs (named nodes)
//! - Literals (with optional datatype or language tag)
//! - Blank nodes (anonymous nodes)
//! - Variables (rule-scoped placeholders in patterns and templates)
//! - Triples, used both as concrete facts and as patterns/templates
//! - Bindings (immutable variable to term maps)

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub mod uri;
mod literal;
mod blank;
mod variable;
mod binding;

pub use uri::Uri;
pub use literal::{Literal, Datatype};
pub use blank::BlankNode;
pub use variable::Variable;
pub use binding::Binding;

use crate::core::ns;

/// A term in RDF, or a variable standing in for one
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A URI reference (named node)
    Uri(Arc<Uri>),
    /// A literal value
    Literal(Arc<Literal>),
    /// A blank node (anonymous)
    BlankNode(BlankNode),
    /// A variable (for patterns and templates)
    Variable(Variable),
}

impl Term {
    /// Create a URI term
    pub fn uri(s: impl Into<String>) -> Self {
        Term::Uri(Arc::new(Uri::new(s.into())))
    }

    /// Create a plain literal
    pub fn literal(s: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::plain(s.into())))
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::typed(value.into(), datatype.into())))
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::with_language(value.into(), lang.into())))
    }

    /// Create an `xsd:integer` literal
    pub fn integer(value: i64) -> Self {
        Term::typed_literal(value.to_string(), ns::uri(ns::XSD, "integer"))
    }

    /// Create an `xsd:decimal` literal
    pub fn decimal(value: f64) -> Self {
        let mut lexical = value.to_string();
        if value.is_finite() && !lexical.contains('.') {
            lexical.push_str(".0");
        }
        Term::typed_literal(lexical, ns::uri(ns::XSD, "decimal"))
    }

    /// Create an `xsd:boolean` literal
    pub fn boolean(value: bool) -> Self {
        Term::typed_literal(value.to_string(), ns::uri(ns::XSD, "boolean"))
    }

    /// Create a blank node with a label
    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(BlankNode::labeled(label.into()))
    }

    /// Create a fresh blank node
    pub fn fresh_blank() -> Self {
        Term::BlankNode(BlankNode::fresh())
    }

    /// Create a variable
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(Variable::new(name.into()))
    }

    /// Check if this term is a variable
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Check if this term is concrete (not a variable)
    pub fn is_concrete(&self) -> bool {
        !self.is_variable()
    }

    /// Get the variable if this is a variable term
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Get the URI if this is a URI term
    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Term::Uri(u) => Some(u),
            _ => None,
        }
    }

    /// Get the literal if this is a literal term
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The term with any variable replaced by `None`, as used by wildcard lookups
    pub fn as_slot(&self) -> Option<&Term> {
        if self.is_variable() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Uri(u) => write!(f, "<{}>", u.as_str()),
            Term::Literal(l) => write!(f, "{:?}", l),
            Term::BlankNode(b) => write!(f, "{:?}", b),
            Term::Variable(v) => write!(f, "{:?}", v),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Uri(u) => write!(f, "<{}>", u.as_str()),
            Term::Literal(l) => write!(f, "{}", l),
            Term::BlankNode(b) => write!(f, "{}", b),
            Term::Variable(v) => write!(f, "{}", v),
        }
    }
}

/// A triple (statement) in RDF
///
/// The same type serves as a concrete fact, as a body pattern and as a head
/// template; only concrete triples may be stored in a graph.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple { subject, predicate, object }
    }

    /// Check if this triple contains any variables
    pub fn has_variables(&self) -> bool {
        self.subject.is_variable() || self.predicate.is_variable() || self.object.is_variable()
    }

    /// Check if this triple is concrete (no variables)
    pub fn is_concrete(&self) -> bool {
        !self.has_variables()
    }

    /// The variables of this triple, in subject/predicate/object order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Term::as_variable)
    }

    /// Lookup slots for this triple, with variables as wildcards
    pub fn slots(&self) -> (Option<&Term>, Option<&Term>, Option<&Term>) {
        (self.subject.as_slot(), self.predicate.as_slot(), self.object.as_slot())
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} .", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
