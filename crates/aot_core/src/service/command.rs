//! Out-of-band control commands for the full engine.
//!
//! # Responsibility
//! - Parse untyped command records into `AtomCommand`.
//! - Dispatch commands to decomposition, termination and config operations.
//!
//! # Invariants
//! - Each command checks its own companion argument before touching state.

use crate::model::atom::{Atom, AtomId};
use crate::model::decomposition::DecompositionId;
use crate::service::engine::ReasoningEngine;
use crate::service::error::{EngineResult, EngineWarning};
use crate::service::termination::TerminationStatus;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Command names accepted by `AtomCommand::from_value`.
pub const SUPPORTED_COMMANDS: &[&str] = &[
    COMMAND_DECOMPOSE,
    COMMAND_COMPLETE_DECOMPOSITION,
    COMMAND_TERMINATION_STATUS,
    COMMAND_BEST_CONCLUSION,
    COMMAND_SET_MAX_DEPTH,
];

pub const COMMAND_DECOMPOSE: &str = "decompose";
pub const COMMAND_COMPLETE_DECOMPOSITION: &str = "complete_decomposition";
pub const COMMAND_TERMINATION_STATUS: &str = "termination_status";
pub const COMMAND_BEST_CONCLUSION: &str = "best_conclusion";
pub const COMMAND_SET_MAX_DEPTH: &str = "set_max_depth";

#[derive(Debug, Clone, PartialEq)]
pub enum AtomCommand {
    Decompose { atom_id: AtomId },
    CompleteDecomposition { decomposition_id: DecompositionId },
    TerminationStatus,
    BestConclusion,
    SetMaxDepth { max_depth: f64 },
}

/// Malformed or unknown command input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    MissingCommand,
    UnknownCommand(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    InvalidMaxDepth,
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "command is required"),
            Self::UnknownCommand(value) => write!(
                f,
                "Unknown command: {value}; expected one of {}",
                SUPPORTED_COMMANDS.join(", ")
            ),
            Self::MissingArgument { command, argument } => {
                write!(f, "{argument} is required for {command} command")
            }
            Self::InvalidMaxDepth => write!(f, "maxDepth must be a positive number"),
        }
    }
}

impl Error for CommandError {}

impl AtomCommand {
    /// Parses `{command, atomId?, decompositionId?, maxDepth?}`.
    ///
    /// `maxDepth` is kept as given and must be a finite number above zero.
    pub fn from_value(input: &Value) -> Result<Self, CommandError> {
        let fields = input.as_object();
        let field = |name: &str| fields.and_then(|map| map.get(name));
        let text = |name: &str| {
            field(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let command = text("command").ok_or(CommandError::MissingCommand)?;
        match command.as_str() {
            COMMAND_DECOMPOSE => {
                let atom_id = text("atomId").ok_or(CommandError::MissingArgument {
                    command: COMMAND_DECOMPOSE,
                    argument: "atomId",
                })?;
                Ok(Self::Decompose { atom_id })
            }
            COMMAND_COMPLETE_DECOMPOSITION => {
                let decomposition_id =
                    text("decompositionId").ok_or(CommandError::MissingArgument {
                        command: COMMAND_COMPLETE_DECOMPOSITION,
                        argument: "decompositionId",
                    })?;
                Ok(Self::CompleteDecomposition { decomposition_id })
            }
            COMMAND_TERMINATION_STATUS => Ok(Self::TerminationStatus),
            COMMAND_BEST_CONCLUSION => Ok(Self::BestConclusion),
            COMMAND_SET_MAX_DEPTH => {
                let max_depth = field("maxDepth")
                    .and_then(Value::as_f64)
                    .filter(|depth| depth.is_finite() && *depth > 0.0)
                    .ok_or(CommandError::InvalidMaxDepth)?;
                Ok(Self::SetMaxDepth { max_depth })
            }
            _ => Err(CommandError::UnknownCommand(command)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Decompose { .. } => COMMAND_DECOMPOSE,
            Self::CompleteDecomposition { .. } => COMMAND_COMPLETE_DECOMPOSITION,
            Self::TerminationStatus => COMMAND_TERMINATION_STATUS,
            Self::BestConclusion => COMMAND_BEST_CONCLUSION,
            Self::SetMaxDepth { .. } => COMMAND_SET_MAX_DEPTH,
        }
    }
}

/// Result payload of one executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Decomposed {
        atom_id: AtomId,
        decomposition_id: DecompositionId,
    },
    DecompositionCompleted {
        decomposition_id: DecompositionId,
    },
    Termination(TerminationStatus),
    BestConclusion(Option<Atom>),
    MaxDepthSet {
        max_depth: f64,
    },
}

/// Executed command plus any warnings it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub command: &'static str,
    pub outcome: CommandOutcome,
    pub warnings: Vec<EngineWarning>,
}

impl ReasoningEngine {
    /// Runs one control command against this engine's session.
    pub fn execute(&mut self, command: AtomCommand) -> EngineResult<CommandReport> {
        self.pending_warnings.clear();
        let name = command.name();

        let outcome = match command {
            AtomCommand::Decompose { atom_id } => {
                let decomposition_id = self.start_decomposition(&atom_id)?;
                CommandOutcome::Decomposed {
                    atom_id,
                    decomposition_id,
                }
            }
            AtomCommand::CompleteDecomposition { decomposition_id } => {
                self.complete_decomposition(&decomposition_id)?;
                CommandOutcome::DecompositionCompleted { decomposition_id }
            }
            AtomCommand::TerminationStatus => {
                CommandOutcome::Termination(self.termination_status())
            }
            AtomCommand::BestConclusion => {
                CommandOutcome::BestConclusion(self.best_conclusion().cloned())
            }
            AtomCommand::SetMaxDepth { max_depth } => CommandOutcome::MaxDepthSet {
                max_depth: self.set_max_depth(max_depth)?,
            },
        };

        Ok(CommandReport {
            command: name,
            outcome,
            warnings: self.take_warnings(),
        })
    }

    /// Parses and runs an untyped command record.
    pub fn execute_value(&mut self, input: &Value) -> EngineResult<CommandReport> {
        let command = AtomCommand::from_value(input)?;
        self.execute(command)
    }
}
