//! Decomposition session record.
//!
//! # Responsibility
//! - Track one refinement of an atom into sub-atoms.
//!
//! # Invariants
//! - `decomposition_id` is unique and time-ordered.
//! - Once `is_completed` is set, `sub_atoms` never changes.

use crate::model::atom::AtomId;
use serde::Serialize;
use uuid::Uuid;

/// Generated decomposition identifier, e.g. `decomp_0190f7...`.
pub type DecompositionId = String;

const DECOMPOSITION_ID_PREFIX: &str = "decomp_";

/// One in-progress or completed refinement of `original_atom_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    pub decomposition_id: DecompositionId,
    pub original_atom_id: AtomId,
    /// Sub-atom ids in the order they were attached.
    pub sub_atoms: Vec<AtomId>,
    pub is_completed: bool,
}

impl Decomposition {
    /// Opens a new decomposition of `original_atom_id` with a fresh id.
    pub fn open(original_atom_id: impl Into<AtomId>) -> Self {
        Self {
            decomposition_id: new_decomposition_id(),
            original_atom_id: original_atom_id.into(),
            sub_atoms: Vec::new(),
            is_completed: false,
        }
    }

    /// Whether sub-atoms can still be attached.
    pub fn is_open(&self) -> bool {
        !self.is_completed
    }

    pub fn contains(&self, atom_id: &str) -> bool {
        self.sub_atoms.iter().any(|id| id == atom_id)
    }
}

/// Generates a time-ordered decomposition id.
pub fn new_decomposition_id() -> DecompositionId {
    format!("{DECOMPOSITION_ID_PREFIX}{}", Uuid::now_v7().simple())
}
