//! Engine error taxonomy and non-fatal warnings.
//!
//! # Invariants
//! - Errors never leave a half-written atom behind; every failing check runs
//!   before the store write.
//! - Warnings never abort the operation that produced them.

use crate::model::atom::{AtomId, AtomValidationError};
use crate::model::decomposition::DecompositionId;
use crate::service::command::CommandError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of one public engine operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Validation(AtomValidationError),
    Reference(ReferenceError),
    State(StateError),
    Command(CommandError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Reference(err) => write!(f, "{err}"),
            Self::State(err) => write!(f, "{err}"),
            Self::Command(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Reference(err) => Some(err),
            Self::State(err) => Some(err),
            Self::Command(err) => Some(err),
        }
    }
}

impl From<AtomValidationError> for EngineError {
    fn from(value: AtomValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReferenceError> for EngineError {
    fn from(value: ReferenceError) -> Self {
        Self::Reference(value)
    }
}

impl From<StateError> for EngineError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<CommandError> for EngineError {
    fn from(value: CommandError) -> Self {
        Self::Command(value)
    }
}

/// An id that should resolve does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    MissingDependencies(Vec<AtomId>),
    AtomNotFound(AtomId),
    DecompositionNotFound(DecompositionId),
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDependencies(ids) => write!(
                f,
                "Invalid dependencies: one or more dependency atoms do not exist (missing: {})",
                ids.join(", ")
            ),
            Self::AtomNotFound(id) => write!(f, "Atom with ID {id} not found"),
            Self::DecompositionNotFound(id) => write!(f, "Decomposition with ID {id} not found"),
        }
    }
}

impl Error for ReferenceError {}

/// Operation is not allowed in the target's current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    DecompositionCompleted(DecompositionId),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecompositionCompleted(id) => {
                write!(f, "Decomposition {id} is already completed")
            }
        }
    }
}

impl Error for StateError {}

/// Informational diagnostic attached to a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineWarning {
    /// A submitted atom is deeper than the configured ceiling.
    DepthExceedsCeiling {
        atom_id: AtomId,
        depth: u32,
        max_depth: f64,
    },
    /// A decomposition sub-atom landed on or past the ceiling.
    DepthCeilingReached {
        atom_id: AtomId,
        depth: u32,
        max_depth: f64,
    },
    /// Best-effort attachment to the open decomposition did not happen.
    DecompositionAttachFailed {
        atom_id: AtomId,
        decomposition_id: DecompositionId,
        reason: String,
    },
}

impl Display for EngineWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepthExceedsCeiling {
                atom_id,
                depth,
                max_depth,
            } => write!(
                f,
                "Atom {atom_id} at depth {depth} exceeds maximum depth {max_depth}"
            ),
            Self::DepthCeilingReached {
                atom_id,
                depth,
                max_depth,
            } => write!(
                f,
                "Maximum depth {max_depth} reached with atom {atom_id} (depth {depth})"
            ),
            Self::DecompositionAttachFailed {
                atom_id,
                decomposition_id,
                reason,
            } => write!(
                f,
                "Could not add atom {atom_id} to decomposition {decomposition_id}: {reason}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineError, EngineWarning, ReferenceError, StateError};
    use crate::model::atom::AtomValidationError;

    #[test]
    fn engine_error_displays_inner_message() {
        let err = EngineError::from(ReferenceError::AtomNotFound("H9".to_string()));
        assert_eq!(err.to_string(), "Atom with ID H9 not found");

        let err = EngineError::from(StateError::DecompositionCompleted("decomp_1".to_string()));
        assert!(err.to_string().contains("already completed"));

        let err = EngineError::from(AtomValidationError::InvalidConfidence);
        assert!(err.to_string().starts_with("Invalid confidence"));
    }

    #[test]
    fn missing_dependencies_lists_ids() {
        let err = ReferenceError::MissingDependencies(vec!["X1".to_string(), "X2".to_string()]);
        assert!(err.to_string().contains("missing: X1, X2"));
    }

    #[test]
    fn warnings_render_atom_and_ceiling() {
        let warning = EngineWarning::DepthExceedsCeiling {
            atom_id: "R7".to_string(),
            depth: 6,
            max_depth: 5.0,
        };
        assert_eq!(
            warning.to_string(),
            "Atom R7 at depth 6 exceeds maximum depth 5"
        );
        let warning = EngineWarning::DepthCeilingReached {
            atom_id: "S3".to_string(),
            depth: 5,
            max_depth: 4.7,
        };
        assert_eq!(
            warning.to_string(),
            "Maximum depth 4.7 reached with atom S3 (depth 5)"
        );
    }
}
