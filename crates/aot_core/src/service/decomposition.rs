//! Decomposition / contraction state machine.
//!
//! # Responsibility
//! - Open, extend and complete decompositions of stored atoms.
//! - Fold fully verified, completed decompositions back into their original
//!   atom and synthesize conclusions from strong hypotheses.
//!
//! # Invariants
//! - Only open decompositions accept sub-atoms.
//! - A sub-atom's depth is its original atom's depth plus one.
//! - Each decomposition contracts at most once.

use crate::model::atom::{now_epoch_ms, Atom, AtomId, AtomType};
use crate::model::decomposition::{Decomposition, DecompositionId};
use crate::service::engine::{ReasoningEngine, DERIVED_CONCLUSION_FACTOR, PROMOTION_THRESHOLD};
use crate::service::error::{EngineResult, EngineWarning, ReferenceError, StateError};
use log::info;

impl ReasoningEngine {
    /// Opens a decomposition of `atom_id` and makes it the current one.
    pub fn start_decomposition(&mut self, atom_id: &str) -> EngineResult<DecompositionId> {
        if !self.store.contains(atom_id) {
            return Err(ReferenceError::AtomNotFound(atom_id.to_string()).into());
        }

        let decomposition = Decomposition::open(atom_id);
        let decomposition_id = decomposition.decomposition_id.clone();
        self.decompositions.push(decomposition);
        self.current_decomposition = Some(decomposition_id.clone());
        info!(
            "event=decomposition_started module=decomposition status=ok atom_id={atom_id} decomposition_id={decomposition_id}"
        );
        Ok(decomposition_id)
    }

    /// Attaches `atom_id` to an open decomposition.
    ///
    /// Returns the depth assigned to the sub-atom. Reaching the depth ceiling
    /// only records a warning.
    ///
    /// # Errors
    /// - `Reference` when the decomposition or the atom does not exist.
    /// - `State` when the decomposition is already completed.
    pub fn add_to_decomposition(
        &mut self,
        decomposition_id: &str,
        atom_id: &str,
    ) -> EngineResult<u32> {
        let decomposition = self
            .decomposition(decomposition_id)
            .ok_or_else(|| ReferenceError::DecompositionNotFound(decomposition_id.to_string()))?;
        if !decomposition.is_open() {
            return Err(StateError::DecompositionCompleted(decomposition_id.to_string()).into());
        }
        let parent_depth = self
            .store
            .get(&decomposition.original_atom_id)
            .map_or(0, Atom::depth_or_root);

        let Some(atom) = self.store.get_mut(atom_id) else {
            return Err(ReferenceError::AtomNotFound(atom_id.to_string()).into());
        };
        let depth = parent_depth.saturating_add(1);
        atom.depth = Some(depth);

        if let Some(decomposition) = self.decomposition_mut(decomposition_id) {
            decomposition.sub_atoms.push(atom_id.to_string());
        }
        if f64::from(depth) >= self.policy.max_depth {
            self.push_warning(EngineWarning::DepthCeilingReached {
                atom_id: atom_id.to_string(),
                depth,
                max_depth: self.policy.max_depth,
            });
        }
        info!(
            "event=decomposition_extended module=decomposition status=ok atom_id={atom_id} decomposition_id={decomposition_id} depth={depth}"
        );
        Ok(depth)
    }

    /// Marks a decomposition completed and clears it as the current one.
    ///
    /// Completing an already completed decomposition is a no-op.
    pub fn complete_decomposition(&mut self, decomposition_id: &str) -> EngineResult<()> {
        let decomposition = self
            .decomposition_mut(decomposition_id)
            .ok_or_else(|| ReferenceError::DecompositionNotFound(decomposition_id.to_string()))?;
        decomposition.is_completed = true;

        if self.current_decomposition.as_deref() == Some(decomposition_id) {
            self.current_decomposition = None;
        }
        info!(
            "event=decomposition_completed module=decomposition status=ok decomposition_id={decomposition_id}"
        );
        Ok(())
    }

    pub fn decomposition(&self, decomposition_id: &str) -> Option<&Decomposition> {
        self.decompositions
            .iter()
            .find(|decomposition| decomposition.decomposition_id == decomposition_id)
    }

    /// Decompositions in the order they were started.
    pub fn decompositions(&self) -> &[Decomposition] {
        &self.decompositions
    }

    pub fn current_decomposition(&self) -> Option<&str> {
        self.current_decomposition.as_deref()
    }

    fn decomposition_mut(&mut self, decomposition_id: &str) -> Option<&mut Decomposition> {
        self.decompositions
            .iter_mut()
            .find(|decomposition| decomposition.decomposition_id == decomposition_id)
    }

    /// Contracts every completed decomposition touched by `verified_ids` whose
    /// sub-atoms are now all verified.
    pub(crate) fn check_for_contraction(&mut self, verified_ids: &[AtomId]) {
        let ready: Vec<DecompositionId> = self
            .decompositions
            .iter()
            .filter(|decomposition| decomposition.is_completed)
            .filter(|decomposition| !self.contracted.contains(&decomposition.decomposition_id))
            .filter(|decomposition| !decomposition.sub_atoms.is_empty())
            .filter(|decomposition| verified_ids.iter().any(|id| decomposition.contains(id)))
            .filter(|decomposition| {
                decomposition
                    .sub_atoms
                    .iter()
                    .all(|id| self.store.get(id).is_some_and(|atom| atom.is_verified))
            })
            .map(|decomposition| decomposition.decomposition_id.clone())
            .collect();

        for decomposition_id in ready {
            self.perform_contraction(&decomposition_id);
        }
    }

    fn perform_contraction(&mut self, decomposition_id: &str) {
        let Some(decomposition) = self.decomposition(decomposition_id) else {
            return;
        };
        let original_id = decomposition.original_atom_id.clone();
        let confidences: Vec<f64> = decomposition
            .sub_atoms
            .iter()
            .map(|id| self.store.get(id).map_or(0.0, |atom| atom.confidence))
            .collect();
        if confidences.is_empty() {
            return;
        }
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        self.contracted.insert(decomposition_id.to_string());

        let Some(original) = self.store.get_mut(&original_id) else {
            return;
        };
        original.confidence = mean.clamp(0.0, 1.0);
        original.is_verified = true;
        let atom_type = original.atom_type;
        let confidence = original.confidence;
        info!(
            "event=decomposition_contracted module=decomposition status=ok decomposition_id={decomposition_id} atom_id={original_id} confidence={confidence:.2}"
        );

        if atom_type == AtomType::Hypothesis {
            if confidence >= PROMOTION_THRESHOLD {
                self.synthesize_conclusion(&original_id);
            }
            self.check_for_contraction(std::slice::from_ref(&original_id));
        }
    }

    /// Stores a new unverified conclusion derived from `hypothesis_id`.
    ///
    /// The conclusion depends only on the hypothesis, shares its depth and
    /// carries a discounted confidence.
    pub(crate) fn synthesize_conclusion(&mut self, hypothesis_id: &str) -> Option<AtomId> {
        let hypothesis = self.store.get(hypothesis_id)?;
        let conclusion = Atom {
            atom_id: self.store.next_conclusion_id(),
            content: format!("Based on verified hypothesis: {}", hypothesis.content),
            atom_type: AtomType::Conclusion,
            dependencies: vec![hypothesis.atom_id.clone()],
            confidence: (hypothesis.confidence * DERIVED_CONCLUSION_FACTOR).clamp(0.0, 1.0),
            created: now_epoch_ms(),
            is_verified: false,
            depth: hypothesis.depth,
        };
        let conclusion_id = conclusion.atom_id.clone();
        self.store.upsert(conclusion);
        info!(
            "event=conclusion_synthesized module=decomposition status=ok atom_id={conclusion_id} hypothesis_id={hypothesis_id}"
        );
        Some(conclusion_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::engine::ReasoningEngine;
    use crate::service::error::{EngineError, ReferenceError};
    use serde_json::json;

    #[test]
    fn start_decomposition_requires_existing_atom() {
        let mut engine = ReasoningEngine::full(None);
        let err = engine
            .start_decomposition("H404")
            .expect_err("unknown atom must fail");
        assert_eq!(
            err,
            EngineError::Reference(ReferenceError::AtomNotFound("H404".to_string()))
        );
        assert!(engine.current_decomposition().is_none());
    }

    #[test]
    fn complete_unknown_decomposition_fails() {
        let mut engine = ReasoningEngine::full(None);
        let err = engine
            .complete_decomposition("decomp_missing")
            .expect_err("unknown decomposition must fail");
        assert!(matches!(
            err,
            EngineError::Reference(ReferenceError::DecompositionNotFound(_))
        ));
    }

    #[test]
    fn synthesize_conclusion_discounts_confidence() {
        let mut engine = ReasoningEngine::full(None);
        engine
            .ingest(&json!({
                "atomId": "H1", "content": "guess", "atomType": "hypothesis",
                "dependencies": [], "confidence": 0.8, "depth": 2
            }))
            .expect("hypothesis ingests");

        let conclusion_id = engine
            .synthesize_conclusion("H1")
            .expect("hypothesis exists");
        let conclusion = engine.atom(&conclusion_id).expect("conclusion stored");
        assert_eq!(conclusion_id, "C1");
        assert!((conclusion.confidence - 0.72).abs() < 1e-9);
        assert_eq!(conclusion.dependencies, vec!["H1"]);
        assert_eq!(conclusion.depth, Some(2));
        assert!(!conclusion.is_verified);
        assert_eq!(conclusion.content, "Based on verified hypothesis: guess");
    }
}
