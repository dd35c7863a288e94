//! Reasoning engine and per-atom ingestion pipeline.
//!
//! # Responsibility
//! - Own one session: atoms, decompositions and verified conclusions.
//! - Run validation, reference checks, depth derivation, storage and
//!   propagation for every submitted atom.
//!
//! # Invariants
//! - Validation and dependency checks complete before the store is touched.
//! - The full and light variants differ only by `EnginePolicy`.
//! - Depth above the ceiling is reported, never rejected.

use crate::model::atom::{now_epoch_ms, Atom, AtomId, AtomType};
use crate::model::decomposition::{Decomposition, DecompositionId};
use crate::repo::atom_store::AtomStore;
use crate::service::command::CommandError;
use crate::service::error::{EngineResult, EngineWarning, ReferenceError};
use crate::service::termination::TerminationStatus;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Hypotheses at or above this confidence are promoted to conclusions.
pub const PROMOTION_THRESHOLD: f64 = 0.8;
/// Derived conclusions carry this fraction of their hypothesis' confidence.
pub const DERIVED_CONCLUSION_FACTOR: f64 = 0.9;

/// Capability switches that distinguish the full and light engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnginePolicy {
    /// Depth ceiling; any finite value above zero, fractions included.
    pub max_depth: f64,
    /// Promote high-confidence hypotheses to conclusions on ingestion.
    pub promote_hypotheses: bool,
    /// Compute dependents and conflicts for every ingestion report.
    pub detailed_report: bool,
    /// Attach ingested atoms to the open decomposition.
    pub track_decompositions: bool,
}

impl EnginePolicy {
    pub const DEFAULT_MAX_DEPTH: f64 = 5.0;
    pub const LIGHT_MAX_DEPTH: f64 = 3.0;

    /// Full engine; a missing or non-positive ceiling falls back to the default.
    pub fn full(max_depth: Option<f64>) -> Self {
        Self {
            max_depth: max_depth
                .filter(|depth| is_valid_max_depth(*depth))
                .unwrap_or(Self::DEFAULT_MAX_DEPTH),
            promote_hypotheses: false,
            detailed_report: true,
            track_decompositions: true,
        }
    }

    pub fn light() -> Self {
        Self {
            max_depth: Self::LIGHT_MAX_DEPTH,
            promote_hypotheses: true,
            detailed_report: false,
            track_decompositions: false,
        }
    }
}

/// Whether `max_depth` can serve as a depth ceiling.
pub fn is_valid_max_depth(max_depth: f64) -> bool {
    max_depth.is_finite() && max_depth > 0.0
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self::full(None)
    }
}

/// Outcome of one successful ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Final stored state of the submitted atom, after all cascades.
    pub atom: Atom,
    pub atoms_count: usize,
    /// Empty unless the policy asks for a detailed report.
    pub dependent_atoms: Vec<AtomId>,
    /// Empty unless the policy asks for a detailed report.
    pub conflicting_atoms: Vec<AtomId>,
    pub verified_conclusions: Vec<AtomId>,
    pub termination: TerminationStatus,
    /// Set only when the termination status is terminal.
    pub best_conclusion: Option<Atom>,
    pub current_decomposition: Option<DecompositionId>,
    /// Conclusion synthesized directly from this atom, if any.
    pub promoted_conclusion: Option<AtomId>,
    pub warnings: Vec<EngineWarning>,
}

/// One reasoning session plus the policy that shapes its pipeline.
#[derive(Debug, Clone)]
pub struct ReasoningEngine {
    pub(crate) policy: EnginePolicy,
    pub(crate) store: AtomStore,
    pub(crate) verified_conclusions: Vec<AtomId>,
    pub(crate) decompositions: Vec<Decomposition>,
    pub(crate) current_decomposition: Option<DecompositionId>,
    pub(crate) contracted: HashSet<DecompositionId>,
    pub(crate) pending_warnings: Vec<EngineWarning>,
}

impl ReasoningEngine {
    pub fn new(policy: EnginePolicy) -> Self {
        Self {
            policy,
            store: AtomStore::new(),
            verified_conclusions: Vec::new(),
            decompositions: Vec::new(),
            current_decomposition: None,
            contracted: HashSet::new(),
            pending_warnings: Vec::new(),
        }
    }

    /// Full engine with an optional construction-time depth ceiling.
    pub fn full(max_depth: Option<f64>) -> Self {
        Self::new(EnginePolicy::full(max_depth))
    }

    pub fn light() -> Self {
        Self::new(EnginePolicy::light())
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }

    pub fn max_depth(&self) -> f64 {
        self.policy.max_depth
    }

    /// Changes the depth ceiling; zero, negative and non-finite values are rejected.
    pub fn set_max_depth(&mut self, max_depth: f64) -> EngineResult<f64> {
        if !is_valid_max_depth(max_depth) {
            return Err(CommandError::InvalidMaxDepth.into());
        }
        self.policy.max_depth = max_depth;
        Ok(max_depth)
    }

    pub fn atom(&self, atom_id: &str) -> Option<&Atom> {
        self.store.get(atom_id)
    }

    pub fn atoms(&self) -> &AtomStore {
        &self.store
    }

    pub fn atoms_count(&self) -> usize {
        self.store.len()
    }

    /// Verified conclusion ids in the order they were verified.
    pub fn verified_conclusions(&self) -> &[AtomId] {
        &self.verified_conclusions
    }

    pub fn dependents(&self, atom_id: &str) -> Vec<AtomId> {
        self.store.dependents(atom_id)
    }

    pub fn conflicts(&self, atom_id: &str) -> Vec<AtomId> {
        self.store
            .get(atom_id)
            .map(|atom| self.store.conflicts(atom))
            .unwrap_or_default()
    }

    /// Drains warnings produced since the last drain.
    pub fn take_warnings(&mut self) -> Vec<EngineWarning> {
        std::mem::take(&mut self.pending_warnings)
    }

    pub(crate) fn push_warning(&mut self, warning: EngineWarning) {
        warn!("event=engine_warning module=engine status=warn detail={warning}");
        self.pending_warnings.push(warning);
    }

    /// Validates, stores and propagates one raw atom record.
    ///
    /// # Errors
    /// - `Validation` when a required field is missing or malformed.
    /// - `Reference` when a dependency id is not stored.
    pub fn ingest(&mut self, input: &Value) -> EngineResult<IngestReport> {
        self.pending_warnings.clear();

        let mut atom = Atom::from_value(input, now_epoch_ms())?;
        if !atom.dependencies.is_empty() {
            let missing = self.store.missing_dependencies(&atom.dependencies);
            if !missing.is_empty() {
                return Err(ReferenceError::MissingDependencies(missing).into());
            }
        }

        let depth = match atom.depth {
            Some(depth) => depth,
            None => self.store.derive_depth(&atom.dependencies),
        };
        atom.depth = Some(depth);
        if f64::from(depth) > self.policy.max_depth {
            self.push_warning(EngineWarning::DepthExceedsCeiling {
                atom_id: atom.atom_id.clone(),
                depth,
                max_depth: self.policy.max_depth,
            });
        }

        let atom_id = atom.atom_id.clone();
        let atom_type = atom.atom_type;
        let is_verified = atom.is_verified;
        let confidence = atom.confidence;
        let dependencies = atom.dependencies.clone();
        let inserted = self.store.upsert(atom);
        debug!(
            "event=atom_stored module=engine status=ok atom_id={atom_id} type={atom_type} depth={depth} new={inserted}"
        );

        if self.policy.track_decompositions {
            self.attach_to_current_decomposition(&atom_id);
        }

        if atom_type == AtomType::Verification && is_verified {
            let hypotheses: Vec<AtomId> = dependencies
                .iter()
                .filter(|dependency| {
                    self.store
                        .get(dependency)
                        .is_some_and(|atom| atom.atom_type == AtomType::Hypothesis)
                })
                .cloned()
                .collect();
            for dependency in &dependencies {
                self.verify(dependency, true);
            }
            if !hypotheses.is_empty() {
                self.check_for_contraction(&hypotheses);
            }
        }

        let promoted_conclusion = if self.policy.promote_hypotheses
            && atom_type == AtomType::Hypothesis
            && confidence >= PROMOTION_THRESHOLD
        {
            self.synthesize_conclusion(&atom_id)
        } else {
            None
        };

        let termination = self.termination_status();
        let best_conclusion = if termination.should_terminate {
            self.best_conclusion().cloned()
        } else {
            None
        };

        let atom = self
            .store
            .get(&atom_id)
            .cloned()
            .ok_or_else(|| ReferenceError::AtomNotFound(atom_id.clone()))?;
        let (dependent_atoms, conflicting_atoms) = if self.policy.detailed_report {
            (self.store.dependents(&atom_id), self.store.conflicts(&atom))
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(IngestReport {
            atom,
            atoms_count: self.store.len(),
            dependent_atoms,
            conflicting_atoms,
            verified_conclusions: self.verified_conclusions.clone(),
            termination,
            best_conclusion,
            current_decomposition: self.current_decomposition.clone(),
            promoted_conclusion,
            warnings: self.take_warnings(),
        })
    }

    fn attach_to_current_decomposition(&mut self, atom_id: &str) {
        let Some(decomposition_id) = self.current_decomposition.clone() else {
            return;
        };

        let is_target = self
            .decomposition(&decomposition_id)
            .is_some_and(|decomposition| decomposition.original_atom_id == atom_id);
        let result = if is_target {
            Err("atom is the target of this decomposition".to_string())
        } else {
            self.add_to_decomposition(&decomposition_id, atom_id)
                .map(|_| ())
                .map_err(|err| err.to_string())
        };

        if let Err(reason) = result {
            self.push_warning(EngineWarning::DecompositionAttachFailed {
                atom_id: atom_id.to_string(),
                decomposition_id,
                reason,
            });
        }
    }
}
