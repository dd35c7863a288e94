//! Advisory termination policy.
//!
//! The engine never stops accepting atoms on its own; callers read the
//! status and decide whether to keep reasoning.

use crate::model::atom::Atom;
use crate::service::engine::ReasoningEngine;
use serde::Serialize;

/// Verified conclusions at or above this confidence end the reasoning.
pub const STRONG_CONCLUSION_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
    #[serde(rename = "Maximum depth reached and strong conclusion found")]
    MaxDepthAndStrongConclusion,
    #[serde(rename = "Maximum depth reached")]
    MaxDepthReached,
    #[serde(rename = "Strong conclusion found")]
    StrongConclusionFound,
    #[serde(rename = "Continue reasoning")]
    ContinueReasoning,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaxDepthAndStrongConclusion => {
                "Maximum depth reached and strong conclusion found"
            }
            Self::MaxDepthReached => "Maximum depth reached",
            Self::StrongConclusionFound => "Strong conclusion found",
            Self::ContinueReasoning => "Continue reasoning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationStatus {
    pub should_terminate: bool,
    pub reason: TerminationReason,
}

impl TerminationStatus {
    fn from_predicates(at_max_depth: bool, has_strong_conclusion: bool) -> Self {
        let reason = match (at_max_depth, has_strong_conclusion) {
            (true, true) => TerminationReason::MaxDepthAndStrongConclusion,
            (true, false) => TerminationReason::MaxDepthReached,
            (false, true) => TerminationReason::StrongConclusionFound,
            (false, false) => TerminationReason::ContinueReasoning,
        };
        Self {
            should_terminate: at_max_depth || has_strong_conclusion,
            reason,
        }
    }
}

impl ReasoningEngine {
    pub fn termination_status(&self) -> TerminationStatus {
        let at_max_depth = self.store.reaches_depth(self.policy.max_depth);
        let has_strong_conclusion = self
            .verified_conclusion_atoms()
            .any(|atom| atom.confidence >= STRONG_CONCLUSION_THRESHOLD);
        TerminationStatus::from_predicates(at_max_depth, has_strong_conclusion)
    }

    /// Highest-confidence verified conclusion; the earliest verified wins ties.
    pub fn best_conclusion(&self) -> Option<&Atom> {
        self.verified_conclusion_atoms()
            .fold(None, |best: Option<&Atom>, candidate| match best {
                Some(current) if current.confidence >= candidate.confidence => Some(current),
                _ => Some(candidate),
            })
    }

    fn verified_conclusion_atoms(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.verified_conclusions
            .iter()
            .filter_map(|id| self.store.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::{TerminationReason, TerminationStatus};

    #[test]
    fn predicates_map_to_reasons() {
        let both = TerminationStatus::from_predicates(true, true);
        assert!(both.should_terminate);
        assert_eq!(both.reason, TerminationReason::MaxDepthAndStrongConclusion);

        let depth = TerminationStatus::from_predicates(true, false);
        assert_eq!(depth.reason.as_str(), "Maximum depth reached");

        let strong = TerminationStatus::from_predicates(false, true);
        assert_eq!(strong.reason, TerminationReason::StrongConclusionFound);

        let neither = TerminationStatus::from_predicates(false, false);
        assert!(!neither.should_terminate);
        assert_eq!(neither.reason.as_str(), "Continue reasoning");
    }

    #[test]
    fn status_serializes_with_wire_reason() {
        let status = TerminationStatus::from_predicates(false, true);
        let json = serde_json::to_value(status).expect("status serializes");
        assert_eq!(json["shouldTerminate"], true);
        assert_eq!(json["reason"], "Strong conclusion found");
    }
}
