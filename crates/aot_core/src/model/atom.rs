//! Atom domain model.
//!
//! # Responsibility
//! - Define the canonical reasoning unit shared by the full and light engines.
//! - Validate raw tool-call records into well-formed atoms.
//!
//! # Invariants
//! - `atom_id` and `content` are never empty.
//! - `confidence` stays inside `[0, 1]`.
//! - `depth` is always set once an atom has been stored by an engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Caller-chosen atom identifier, e.g. `P1` or `H2`.
pub type AtomId = String;

/// Closed set of reasoning roles an atom can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    /// Given information or basic assumption.
    Premise,
    /// Logical step derived from other atoms.
    Reasoning,
    /// Proposed solution or intermediate conclusion.
    Hypothesis,
    /// Evaluation of other atoms, usually hypotheses.
    Verification,
    /// Verified hypothesis or final answer.
    Conclusion,
}

/// Wire values accepted for `atomType`, in declaration order.
pub const SUPPORTED_ATOM_TYPES: &[&str] = &[
    "premise",
    "reasoning",
    "hypothesis",
    "verification",
    "conclusion",
];

impl AtomType {
    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Premise => "premise",
            Self::Reasoning => "reasoning",
            Self::Hypothesis => "hypothesis",
            Self::Verification => "verification",
            Self::Conclusion => "conclusion",
        }
    }

    /// Parses an exact lowercase wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "premise" => Some(Self::Premise),
            "reasoning" => Some(Self::Reasoning),
            "hypothesis" => Some(Self::Hypothesis),
            "verification" => Some(Self::Verification),
            "conclusion" => Some(Self::Conclusion),
            _ => None,
        }
    }

    /// Hypotheses and conclusions are the only atoms that can conflict.
    pub fn is_claim(self) -> bool {
        matches!(self, Self::Hypothesis | Self::Conclusion)
    }
}

impl Display for AtomType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of reasoning in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    pub atom_id: AtomId,
    pub content: String,
    pub atom_type: AtomType,
    /// Ids this atom builds on. All of them exist before this atom is stored.
    pub dependencies: Vec<AtomId>,
    pub confidence: f64,
    /// Unix epoch milliseconds.
    pub created: i64,
    #[serde(default)]
    pub is_verified: bool,
    /// `None` only between validation and storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// Field-level validation failure, reported for the first offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomValidationError {
    InvalidAtomId,
    InvalidContent,
    InvalidAtomType,
    InvalidDependencies,
    InvalidConfidence,
}

impl Display for AtomValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAtomId => write!(f, "Invalid atomId: must be a non-empty string"),
            Self::InvalidContent => write!(f, "Invalid content: must be a non-empty string"),
            Self::InvalidAtomType => write!(
                f,
                "Invalid atomType: must be one of {}",
                SUPPORTED_ATOM_TYPES.join(", ")
            ),
            Self::InvalidDependencies => {
                write!(f, "Invalid dependencies: must be an array of atom IDs")
            }
            Self::InvalidConfidence => {
                write!(f, "Invalid confidence: must be a number between 0 and 1")
            }
        }
    }
}

impl Error for AtomValidationError {}

impl Atom {
    /// Validates an arbitrary input record into an atom.
    ///
    /// Required fields are checked in order `atomId`, `content`, `atomType`,
    /// `dependencies`, `confidence`; the first failure is returned.
    /// `created` falls back to `now_ms`, `isVerified` to `false`, and a
    /// missing or non-integral `depth` is left unset for the engine to derive.
    pub fn from_value(input: &Value, now_ms: i64) -> Result<Self, AtomValidationError> {
        let fields = input.as_object();
        let field = |name: &str| fields.and_then(|map| map.get(name));

        let atom_id = non_empty_str(field("atomId")).ok_or(AtomValidationError::InvalidAtomId)?;
        let content =
            non_empty_str(field("content")).ok_or(AtomValidationError::InvalidContent)?;
        let atom_type = field("atomType")
            .and_then(Value::as_str)
            .and_then(AtomType::parse)
            .ok_or(AtomValidationError::InvalidAtomType)?;
        let dependencies = field("dependencies")
            .and_then(Value::as_array)
            .ok_or(AtomValidationError::InvalidDependencies)?
            .iter()
            .map(|dep| dep.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or(AtomValidationError::InvalidDependencies)?;
        let confidence = field("confidence")
            .and_then(Value::as_f64)
            .filter(|value| (0.0..=1.0).contains(value))
            .ok_or(AtomValidationError::InvalidConfidence)?;

        let created = field("created")
            .and_then(Value::as_f64)
            .filter(|ms| ms.is_finite() && *ms != 0.0)
            .map(|ms| ms as i64)
            .unwrap_or(now_ms);
        let is_verified = field("isVerified").is_some_and(is_truthy);
        let depth = field("depth").and_then(parse_depth);

        Ok(Self {
            atom_id,
            content,
            atom_type,
            dependencies,
            confidence,
            created,
            is_verified,
            depth,
        })
    }

    /// Depth with an unset value read as the root level.
    pub fn depth_or_root(&self) -> u32 {
        self.depth.unwrap_or(0)
    }

    /// Whether this atom lists `atom_id` as a dependency.
    pub fn depends_on(&self, atom_id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == atom_id)
    }

    /// Whether this atom and `other` have at least one dependency in common.
    pub fn shares_dependency_with(&self, other: &Atom) -> bool {
        self.dependencies.iter().any(|dep| other.depends_on(dep))
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Loose flag reading: non-zero numbers, non-empty strings, arrays and
/// objects count as set; `null`, `false`, `0` and `""` do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_depth(value: &Value) -> Option<u32> {
    if let Some(depth) = value.as_u64() {
        return u32::try_from(depth).ok();
    }
    value
        .as_f64()
        .filter(|depth| depth.is_finite() && *depth >= 0.0 && depth.fract() == 0.0)
        .filter(|depth| *depth <= f64::from(u32::MAX))
        .map(|depth| depth as u32)
}
