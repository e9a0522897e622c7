//! In-memory RDF graph
//!
//! A store holds a set of concrete triples and supports wildcard lookups
//! through per-position indexes. Triples are append-only: the engine never
//! removes facts while evaluating, so index positions stay valid.

mod overlay;

pub use overlay::Overlay;

use fnv::FnvHashMap;
use indexmap::IndexSet;

use crate::core::{Graph, GraphMut};
use crate::term::{Term, Triple};

/// A store of RDF triples (also called a graph)
#[derive(Clone, Default)]
pub struct Store {
    /// The triples in this store, in insertion order
    triples: IndexSet<Triple>,
    /// Index by subject
    by_subject: FnvHashMap<Term, Vec<usize>>,
    /// Index by predicate
    by_predicate: FnvHashMap<Term, Vec<usize>>,
    /// Index by object
    by_object: FnvHashMap<Term, Vec<usize>>,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every triple of another graph into a new store
    pub fn from_graph(graph: &dyn Graph) -> Self {
        let mut store = Store::new();
        for triple in graph.iter() {
            store.add(triple.clone());
        }
        store
    }

    /// Get all triples, in insertion order
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Candidate positions for a lookup, taken from the most selective bound slot
    fn candidates(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Option<&[usize]> {
        const EMPTY: &[usize] = &[];
        let lookups = [
            subject.map(|s| self.by_subject.get(s)),
            predicate.map(|p| self.by_predicate.get(p)),
            object.map(|o| self.by_object.get(o)),
        ];

        let mut best: Option<&[usize]> = None;
        for lookup in lookups.into_iter().flatten() {
            let positions = lookup.map(Vec::as_slice).unwrap_or(EMPTY);
            if best.map_or(true, |b| positions.len() < b.len()) {
                best = Some(positions);
            }
        }
        best
    }
}

fn slot_matches(slot: Option<&Term>, term: &Term) -> bool {
    slot.map_or(true, |s| s == term)
}

impl Graph for Store {
    fn find(&self, subject: Option<&Term>, predicate: Option<&Term>, object: Option<&Term>) -> Vec<Triple> {
        let accept = |t: &Triple| {
            slot_matches(subject, &t.subject)
                && slot_matches(predicate, &t.predicate)
                && slot_matches(object, &t.object)
        };

        match self.candidates(subject, predicate, object) {
            Some(positions) => positions
                .iter()
                .filter_map(|&i| self.triples.get_index(i))
                .filter(|t| accept(t))
                .cloned()
                .collect(),
            None => self.triples.iter().cloned().collect(),
        }
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    fn len(&self) -> usize {
        self.triples.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Triple> + '_> {
        Box::new(self.triples.iter())
    }
}

impl GraphMut for Store {
    fn add(&mut self, triple: Triple) -> bool {
        debug_assert!(triple.is_concrete(), "only concrete triples can be stored: {}", triple);

        let (index, inserted) = self.triples.insert_full(triple);
        if !inserted {
            return false;
        }

        if let Some(triple) = self.triples.get_index(index) {
            self.by_subject.entry(triple.subject.clone()).or_default().push(index);
            self.by_predicate.entry(triple.predicate.clone()).or_default().push(index);
            self.by_object.entry(triple.object.clone()).or_default().push(index);
        }
        true
    }
}

impl FromIterator<Triple> for Store {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = Store::new();
        for triple in iter {
            store.add(triple);
        }
        store
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store {{")?;
        for triple in &self.triples {
            writeln!(f, "  {:?}", triple)?;
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
    fn test_add_and_contains() {
        let mut store = Store::new();
        let triple = Triple::new(ex("s"), ex("p"), Term::literal("o"));

        assert!(store.add(triple.clone()));
        assert!(store.contains(&triple));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_no_duplicates() {
        let mut store = Store::new();
        let triple = Triple::new(ex("s"), ex("p"), Term::literal("o"));

        assert!(store.add(triple.clone()));
        assert!(!store.add(triple));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_with_wildcards() {
        let mut store = Store::new();
        store.add(Triple::new(ex("alice"), ex("knows"), ex("bob")));
        store.add(Triple::new(ex("alice"), ex("knows"), ex("charlie")));
        store.add(Triple::new(ex("bob"), ex("knows"), ex("charlie")));
        store.add(Triple::new(ex("bob"), ex("age"), Term::integer(30)));

        assert_eq!(store.find(Some(&ex("alice")), None, None).len(), 2);
        assert_eq!(store.find(None, Some(&ex("knows")), Some(&ex("charlie"))).len(), 2);
        assert_eq!(store.find(None, None, None).len(), 4);
        assert!(store.find(Some(&ex("nobody")), Some(&ex("knows")), None).is_empty());
    }

    #[test]
    fn test_match_pattern() {
        let mut store = Store::new();
        store.add(Triple::new(ex("alice"), ex("knows"), ex("bob")));
        store.add(Triple::new(ex("alice"), ex("knows"), ex("charlie")));

        // Match all things alice knows
        let pattern = Triple::new(ex("alice"), ex("knows"), Term::var("x"));

        let results = store.match_pattern(&pattern);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_collect_preserves_insertion_order() {
        let triples = vec![
            Triple::new(ex("c"), ex("p"), ex("d")),
            Triple::new(ex("a"), ex("p"), ex("b")),
        ];
        let store: Store = triples.clone().into_iter().collect();
        let back: Vec<Triple> = store.triples().cloned().collect();
        assert_eq!(back, triples);
    }
}
