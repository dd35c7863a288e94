//! Verification flags and confidence propagation.
//!
//! # Invariants
//! - Only `verify` adds or removes verified-conclusion entries; the list
//!   holds no duplicates.
//! - A verified verification atom verifies the hypotheses it depends on and
//!   then gives completed decompositions a chance to contract.

use crate::model::atom::{AtomId, AtomType};
use crate::service::engine::ReasoningEngine;
use log::debug;

impl ReasoningEngine {
    /// Sets the verification flag of `atom_id` and propagates its effects.
    ///
    /// Returns `false` when the atom is unknown.
    pub fn verify(&mut self, atom_id: &str, verified: bool) -> bool {
        let Some(atom) = self.store.get_mut(atom_id) else {
            return false;
        };
        atom.is_verified = verified;
        let atom_type = atom.atom_type;

        match atom_type {
            AtomType::Conclusion => self.track_conclusion(atom_id, verified),
            AtomType::Verification if verified => self.verify_hypothesis_dependencies(atom_id),
            _ => {}
        }
        true
    }

    /// Overwrites the confidence of `atom_id`, clamped into `[0, 1]`.
    ///
    /// Returns `false` when the atom is unknown or `confidence` is not finite.
    pub fn update_confidence(&mut self, atom_id: &str, confidence: f64) -> bool {
        if !confidence.is_finite() {
            return false;
        }
        let Some(atom) = self.store.get_mut(atom_id) else {
            return false;
        };
        atom.confidence = confidence.clamp(0.0, 1.0);
        true
    }

    pub(crate) fn track_conclusion(&mut self, atom_id: &str, verified: bool) {
        let listed = self.verified_conclusions.iter().any(|id| id == atom_id);
        if verified && !listed {
            self.verified_conclusions.push(atom_id.to_string());
        } else if !verified && listed {
            self.verified_conclusions.retain(|id| id != atom_id);
        }
    }

    fn verify_hypothesis_dependencies(&mut self, verification_id: &str) {
        let hypotheses: Vec<AtomId> = self
            .store
            .get(verification_id)
            .map(|verification| {
                verification
                    .dependencies
                    .iter()
                    .filter(|dep| {
                        self.store
                            .get(dep)
                            .is_some_and(|atom| atom.atom_type == AtomType::Hypothesis)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if hypotheses.is_empty() {
            return;
        }

        for hypothesis_id in &hypotheses {
            if let Some(hypothesis) = self.store.get_mut(hypothesis_id) {
                hypothesis.is_verified = true;
            }
        }
        debug!(
            "event=hypotheses_verified module=verification status=ok by={verification_id} count={}",
            hypotheses.len()
        );
        self.check_for_contraction(&hypotheses);
    }
}

#[cfg(test)]
mod tests {
    use crate::service::engine::ReasoningEngine;
    use serde_json::json;

    fn seeded_engine() -> ReasoningEngine {
        let mut engine = ReasoningEngine::full(None);
        engine
            .ingest(&json!({
                "atomId": "P1", "content": "premise", "atomType": "premise",
                "dependencies": [], "confidence": 0.9
            }))
            .expect("premise ingests");
        engine
    }

    #[test]
    fn update_confidence_clamps_into_unit_range() {
        let mut engine = seeded_engine();

        assert!(engine.update_confidence("P1", 1.7));
        assert_eq!(engine.atom("P1").map(|atom| atom.confidence), Some(1.0));

        assert!(engine.update_confidence("P1", -0.3));
        assert_eq!(engine.atom("P1").map(|atom| atom.confidence), Some(0.0));
    }

    #[test]
    fn update_confidence_ignores_unknown_atoms_and_non_finite_values() {
        let mut engine = seeded_engine();
        assert!(!engine.update_confidence("missing", 0.5));
        assert!(!engine.update_confidence("P1", f64::NAN));
        assert!(!engine.update_confidence("P1", f64::INFINITY));
        assert_eq!(engine.atom("P1").map(|atom| atom.confidence), Some(0.9));
    }

    #[test]
    fn verify_unknown_atom_is_noop() {
        let mut engine = seeded_engine();
        assert!(!engine.verify("nope", true));
    }
}
