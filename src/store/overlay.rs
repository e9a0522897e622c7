//! Append-only overlay over a read-only base graph
//!
//! The working graph of an evaluation is the caller's base graph plus every
//! triple derived so far. The base is only ever read; additions live in a
//! private `Store`. Each round hands the overlay back by value with its new
//! triples appended, so a round is a function from overlay to overlay.

use crate::core::{Graph, GraphMut};
use crate::term::{Term, Triple};

use super::Store;

/// A base graph with accumulated additions, exposed as one logical graph
pub struct Overlay<'a> {
    base: &'a dyn Graph,
    added: Store,
}

impl<'a> Overlay<'a> {
    /// An overlay with no additions
    pub fn new(base: &'a dyn Graph) -> Self {
        Overlay { base, added: Store::new() }
    }

    /// Append triples, returning the extended overlay and how many were new
    ///
    /// Triples already present in the base or in the additions are skipped.
    pub fn extended(mut self, triples: impl IntoIterator<Item = Triple>) -> (Self, usize) {
        let mut count = 0;
        for triple in triples {
            if !self.base.contains(&triple) && self.added.add(triple) {
                count += 1;
            }
        }
        (self, count)
    }

    /// The base graph
    pub fn base(&self) -> &'a dyn Graph {
        self.base
    }

    /// Triples added on top of the base
    pub fn added(&self) -> &Store {
        &self.added
    }

    /// Consume the overlay, keeping only the additions
    pub fn into_added(self) -> Store {
        self.added
    }
}

impl Graph for Overlay<'_> {
    fn find(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<Triple> {
        let mut found = self.base.find(subject, predicate, object);
        found.extend(self.added.find(subject, predicate, object));
        found
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.added.contains(triple) || self.base.contains(triple)
    }

    fn len(&self) -> usize {
        self.base.len() + self.added.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_> {
        Box::new(self.base.iter().chain(self.added.iter()))
    }
}
