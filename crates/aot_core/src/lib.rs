//! Core reasoning graph for Atom of Thoughts.
//! This crate is the single source of truth for graph and workflow invariants.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::atom::{
    now_epoch_ms, Atom, AtomId, AtomType, AtomValidationError, SUPPORTED_ATOM_TYPES,
};
pub use model::decomposition::{Decomposition, DecompositionId};
pub use repo::atom_store::AtomStore;
pub use service::command::{
    AtomCommand, CommandError, CommandOutcome, CommandReport, SUPPORTED_COMMANDS,
};
pub use service::engine::{is_valid_max_depth, EnginePolicy, IngestReport, ReasoningEngine};
pub use service::error::{EngineError, EngineResult, EngineWarning, ReferenceError, StateError};
pub use service::termination::{TerminationReason, TerminationStatus};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
