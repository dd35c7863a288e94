//! In-memory atom storage and dependency graph queries.
//!
//! # Responsibility
//! - Own the atom map and its insertion order for one engine session.
//! - Answer reverse-edge, conflict and depth queries over stored atoms.
//!
//! # Invariants
//! - Every id in `order` has an entry in `atoms` and appears exactly once.
//! - Overwriting an existing id keeps its original position in `order`.

use crate::model::atom::{Atom, AtomId};
use std::collections::HashMap;

const CONCLUSION_ID_PREFIX: char = 'C';

/// Insertion-ordered atom map for one reasoning session.
#[derive(Debug, Clone, Default)]
pub struct AtomStore {
    atoms: HashMap<AtomId, Atom>,
    order: Vec<AtomId>,
}

impl AtomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom_id: &str) -> bool {
        self.atoms.contains_key(atom_id)
    }

    pub fn get(&self, atom_id: &str) -> Option<&Atom> {
        self.atoms.get(atom_id)
    }

    pub fn get_mut(&mut self, atom_id: &str) -> Option<&mut Atom> {
        self.atoms.get_mut(atom_id)
    }

    /// Stores `atom`, replacing any atom with the same id.
    ///
    /// Returns `true` when the id was not stored before.
    pub fn upsert(&mut self, atom: Atom) -> bool {
        let atom_id = atom.atom_id.clone();
        let inserted = self.atoms.insert(atom_id.clone(), atom).is_none();
        if inserted {
            self.order.push(atom_id);
        }
        inserted
    }

    /// Atom ids in first-insertion order.
    pub fn ids(&self) -> &[AtomId] {
        &self.order
    }

    /// Atoms in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.order.iter().filter_map(|id| self.atoms.get(id))
    }

    /// Returns the dependency ids that are not stored, in input order.
    pub fn missing_dependencies(&self, dependencies: &[AtomId]) -> Vec<AtomId> {
        dependencies
            .iter()
            .filter(|id| !self.contains(id))
            .cloned()
            .collect()
    }

    /// Depth one below the deepest dependency, or the root level without any.
    ///
    /// Unknown dependencies and dependencies without a depth count as root.
    pub fn derive_depth(&self, dependencies: &[AtomId]) -> u32 {
        dependencies
            .iter()
            .map(|id| self.get(id).map_or(0, Atom::depth_or_root))
            .max()
            .map_or(0, |deepest| deepest.saturating_add(1))
    }

    /// Ids of all atoms that list `atom_id` as a dependency.
    pub fn dependents(&self, atom_id: &str) -> Vec<AtomId> {
        self.iter()
            .filter(|atom| atom.depends_on(atom_id))
            .map(|atom| atom.atom_id.clone())
            .collect()
    }

    /// Claims that may contradict `atom`.
    ///
    /// Only hypotheses and conclusions are compared. Two claims conflict when
    /// their contents differ and they share at least one dependency; this is a
    /// provenance heuristic, not a semantic check.
    pub fn conflicts(&self, atom: &Atom) -> Vec<AtomId> {
        if !atom.atom_type.is_claim() {
            return Vec::new();
        }

        self.iter()
            .filter(|other| other.atom_id != atom.atom_id)
            .filter(|other| other.atom_type.is_claim())
            .filter(|other| other.content != atom.content)
            .filter(|other| atom.shares_dependency_with(other))
            .map(|other| other.atom_id.clone())
            .collect()
    }

    /// Whether any stored atom has reached `max_depth`.
    pub fn reaches_depth(&self, max_depth: f64) -> bool {
        self.atoms
            .values()
            .any(|atom| atom.depth.is_some_and(|depth| f64::from(depth) >= max_depth))
    }

    /// Next free `C<n>` id for a synthesized conclusion.
    pub fn next_conclusion_id(&self) -> AtomId {
        let taken = self
            .order
            .iter()
            .filter(|id| id.starts_with(CONCLUSION_ID_PREFIX))
            .count();
        let mut candidate = taken + 1;
        loop {
            let atom_id = format!("{CONCLUSION_ID_PREFIX}{candidate}");
            if !self.contains(&atom_id) {
                return atom_id;
            }
            candidate += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AtomStore;
    use crate::model::atom::{Atom, AtomType};

    fn atom(id: &str, atom_type: AtomType, content: &str, deps: &[&str]) -> Atom {
        Atom {
            atom_id: id.to_string(),
            content: content.to_string(),
            atom_type,
            dependencies: deps.iter().map(|dep| dep.to_string()).collect(),
            confidence: 0.5,
            created: 1,
            is_verified: false,
            depth: Some(0),
        }
    }

    #[test]
    fn upsert_keeps_first_insertion_position() {
        let mut store = AtomStore::new();
        assert!(store.upsert(atom("P1", AtomType::Premise, "a", &[])));
        assert!(store.upsert(atom("P2", AtomType::Premise, "b", &[])));
        assert!(!store.upsert(atom("P1", AtomType::Premise, "a2", &[])));

        assert_eq!(store.ids(), ["P1".to_string(), "P2".to_string()]);
        assert_eq!(store.get("P1").map(|a| a.content.as_str()), Some("a2"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn dependents_scans_reverse_edges_in_order() {
        let mut store = AtomStore::new();
        store.upsert(atom("P1", AtomType::Premise, "p", &[]));
        store.upsert(atom("R1", AtomType::Reasoning, "r", &["P1"]));
        store.upsert(atom("H1", AtomType::Hypothesis, "h", &["R1", "P1"]));

        assert_eq!(store.dependents("P1"), vec!["R1", "H1"]);
        assert_eq!(store.dependents("H1"), Vec::<String>::new());
    }

    #[test]
    fn conflicts_require_shared_dependency_and_different_content() {
        let mut store = AtomStore::new();
        store.upsert(atom("P1", AtomType::Premise, "p", &[]));
        store.upsert(atom("P2", AtomType::Premise, "q", &[]));
        let h1 = atom("H1", AtomType::Hypothesis, "yes", &["P1"]);
        store.upsert(h1.clone());
        store.upsert(atom("H2", AtomType::Hypothesis, "no", &["P1", "P2"]));
        store.upsert(atom("H3", AtomType::Hypothesis, "yes", &["P1"]));
        store.upsert(atom("H4", AtomType::Hypothesis, "other", &["P2"]));
        store.upsert(atom("R1", AtomType::Reasoning, "why", &["P1"]));

        assert_eq!(store.conflicts(&h1), vec!["H2"]);
        let reasoning = store.get("R1").cloned().expect("R1 stored");
        assert!(store.conflicts(&reasoning).is_empty());
    }

    #[test]
    fn derive_depth_uses_deepest_dependency() {
        let mut store = AtomStore::new();
        store.upsert(atom("P1", AtomType::Premise, "p", &[]));
        let mut deep = atom("R1", AtomType::Reasoning, "r", &["P1"]);
        deep.depth = Some(3);
        store.upsert(deep);

        assert_eq!(store.derive_depth(&[]), 0);
        assert_eq!(store.derive_depth(&["P1".to_string()]), 1);
        assert_eq!(store.derive_depth(&["P1".to_string(), "R1".to_string()]), 4);
    }

    #[test]
    fn reaches_depth_compares_against_fractional_ceiling() {
        let mut store = AtomStore::new();
        assert!(!store.reaches_depth(0.5));

        let mut deep = atom("R1", AtomType::Reasoning, "r", &[]);
        deep.depth = Some(4);
        store.upsert(deep);

        assert!(!store.reaches_depth(4.7));
        assert!(store.reaches_depth(4.0));
        assert!(store.reaches_depth(3.5));
    }

    #[test]
    fn next_conclusion_id_skips_taken_ids() {
        let mut store = AtomStore::new();
        assert_eq!(store.next_conclusion_id(), "C1");

        store.upsert(atom("C2", AtomType::Conclusion, "c", &[]));
        assert_eq!(store.next_conclusion_id(), "C3");

        store.upsert(atom("C1", AtomType::Conclusion, "c", &[]));
        assert_eq!(store.next_conclusion_id(), "C3");
    }
}
