//! Reasoning graph domain model.
//!
//! # Responsibility
//! - Define the atom record and the decomposition session record.
//! - Validate untyped tool input into closed, typed records.
//!
//! # Invariants
//! - Every atom is identified by a caller-chosen `AtomId`.
//! - Atoms and decompositions are never deleted during a session.

pub mod atom;
pub mod decomposition;
