//! Tool-call API over the full and lightweight reasoning engines.
//!
//! # Responsibility
//! - Route `AoT`, `AoT-light` and `atomcommands` calls to the right engine.
//! - Turn engine reports and errors into stable JSON text envelopes.
//!
//! # Invariants
//! - Tool calls never panic; every failure becomes an `is_error` result.
//! - Each result carries exactly one text content item.
//! - The two engines never share session state.

use crate::descriptors::{
    tool_descriptors, AOT_LIGHT_TOOL_NAME, AOT_TOOL_NAME, ATOM_COMMANDS_TOOL_NAME,
};
use crate::render::format_atom;
use aot_core::{
    Atom, AtomId, AtomType, CommandOutcome, CommandReport, EngineWarning, IngestReport,
    ReasoningEngine, TerminationStatus,
};
use log::{debug, info, warn};
use rmcp::model::{CallToolResult, Content, RawContent, Tool};
use serde::Serialize;
use serde_json::{json, Value};
use std::ops::Deref;

const STATUS_FAILED: &str = "failed";
const STATUS_ERROR: &str = "error";
const STATUS_SUCCESS: &str = "success";

/// Joins the text content items of a tool result.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|item| match item.deref() {
            RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn success(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

fn failure(text: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text)])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConclusionSummary {
    atom_id: AtomId,
    content: String,
    confidence: f64,
}

impl From<&Atom> for ConclusionSummary {
    fn from(atom: &Atom) -> Self {
        Self {
            atom_id: atom.atom_id.clone(),
            content: atom.content.clone(),
            confidence: atom.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AtomPayload {
    atom_id: AtomId,
    atom_type: AtomType,
    is_verified: bool,
    confidence: f64,
    depth: Option<u32>,
    atoms_count: usize,
    dependent_atoms: Vec<AtomId>,
    conflicting_atoms: Vec<AtomId>,
    verified_conclusions: Vec<AtomId>,
    termination_status: TerminationStatus,
    best_conclusion: Option<ConclusionSummary>,
    current_decomposition: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl From<IngestReport> for AtomPayload {
    fn from(report: IngestReport) -> Self {
        Self {
            best_conclusion: report.best_conclusion.as_ref().map(ConclusionSummary::from),
            atom_id: report.atom.atom_id,
            atom_type: report.atom.atom_type,
            is_verified: report.atom.is_verified,
            confidence: report.atom.confidence,
            depth: report.atom.depth,
            atoms_count: report.atoms_count,
            dependent_atoms: report.dependent_atoms,
            conflicting_atoms: report.conflicting_atoms,
            verified_conclusions: report.verified_conclusions,
            termination_status: report.termination,
            current_decomposition: report.current_decomposition,
            warnings: warning_texts(&report.warnings),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LightAtomPayload {
    atom_id: AtomId,
    atom_type: AtomType,
    is_verified: bool,
    confidence: f64,
    atoms_count: usize,
    best_conclusion: Option<ConclusionSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl From<IngestReport> for LightAtomPayload {
    fn from(report: IngestReport) -> Self {
        Self {
            best_conclusion: report.best_conclusion.as_ref().map(ConclusionSummary::from),
            atom_id: report.atom.atom_id,
            atom_type: report.atom.atom_type,
            is_verified: report.atom.is_verified,
            confidence: report.atom.confidence,
            atoms_count: report.atoms_count,
            warnings: warning_texts(&report.warnings),
        }
    }
}

/// Holds one full and one lightweight session for the server lifetime.
#[derive(Debug)]
pub struct ToolServer {
    full: ReasoningEngine,
    light: ReasoningEngine,
}

impl Default for ToolServer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ToolServer {
    /// `max_depth` configures the full engine only; the light ceiling is fixed.
    pub fn new(max_depth: Option<f64>) -> Self {
        Self {
            full: ReasoningEngine::full(max_depth),
            light: ReasoningEngine::light(),
        }
    }

    pub fn full_engine(&self) -> &ReasoningEngine {
        &self.full
    }

    pub fn light_engine(&self) -> &ReasoningEngine {
        &self.light
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        tool_descriptors()
    }

    /// Dispatches one tool call by name.
    ///
    /// # Tool contract
    /// - Synchronous; runs to completion before the next call.
    /// - Never panics; unknown tools and engine errors return `is_error`.
    /// - Success text is pretty-printed JSON.
    pub fn call_tool(&mut self, name: &str, arguments: &Value) -> CallToolResult {
        let response = match name {
            AOT_TOOL_NAME => self.ingest_full(arguments),
            AOT_LIGHT_TOOL_NAME => self.ingest_light(arguments),
            ATOM_COMMANDS_TOOL_NAME => self.run_command(arguments),
            _ => failure(format!("Unknown tool: {name}")),
        };

        let status = if response.is_error == Some(true) {
            "error"
        } else {
            "ok"
        };
        info!("event=tool_call module=api status={status} tool={name}");
        response
    }

    fn ingest_full(&mut self, arguments: &Value) -> CallToolResult {
        match self.full.ingest(arguments) {
            Ok(report) => {
                debug!("{}", format_atom(&report.atom, self.full.max_depth()));
                to_response(&AtomPayload::from(report))
            }
            Err(err) => ingest_failure(AOT_TOOL_NAME, &err.to_string()),
        }
    }

    fn ingest_light(&mut self, arguments: &Value) -> CallToolResult {
        match self.light.ingest(arguments) {
            Ok(report) => {
                debug!("{}", format_atom(&report.atom, self.light.max_depth()));
                if let Some(conclusion_id) = &report.promoted_conclusion {
                    info!(
                        "event=conclusion_suggested module=api status=ok atom_id={conclusion_id} hypothesis_id={}",
                        report.atom.atom_id
                    );
                }
                to_response(&LightAtomPayload::from(report))
            }
            Err(err) => ingest_failure(AOT_LIGHT_TOOL_NAME, &err.to_string()),
        }
    }

    fn run_command(&mut self, arguments: &Value) -> CallToolResult {
        match self.full.execute_value(arguments) {
            Ok(report) => to_response(&command_payload(&report)),
            Err(err) => {
                warn!(
                    "event=command_failed module=api status=error error={}",
                    err.to_string().replace(['\n', '\r'], " ")
                );
                failure(command_failure(&err.to_string()))
            }
        }
    }
}

fn warning_texts(warnings: &[EngineWarning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}

fn command_payload(report: &CommandReport) -> Value {
    let command = report.command;
    match &report.outcome {
        CommandOutcome::Decomposed {
            atom_id,
            decomposition_id,
        } => json!({
            "status": STATUS_SUCCESS,
            "command": command,
            "decompositionId": decomposition_id,
            "message": format!("Started decomposition of atom {atom_id}"),
        }),
        CommandOutcome::DecompositionCompleted { decomposition_id } => json!({
            "status": STATUS_SUCCESS,
            "command": command,
            "completed": true,
            "message": format!("Completed decomposition {decomposition_id}"),
        }),
        CommandOutcome::Termination(status) => json!({
            "status": STATUS_SUCCESS,
            "command": command,
            "shouldTerminate": status.should_terminate,
            "reason": status.reason.as_str(),
        }),
        CommandOutcome::BestConclusion(conclusion) => json!({
            "status": STATUS_SUCCESS,
            "command": command,
            "conclusion": conclusion.as_ref().map(ConclusionSummary::from),
        }),
        CommandOutcome::MaxDepthSet { max_depth } => json!({
            "status": STATUS_SUCCESS,
            "command": command,
            "maxDepth": depth_number(*max_depth),
            "message": format!("Maximum depth set to {max_depth}"),
        }),
    }
}

/// Whole ceilings go out as integers so `7` echoes back as `7`, not `7.0`.
fn depth_number(max_depth: f64) -> Value {
    if max_depth.fract() == 0.0 && max_depth <= u32::MAX as f64 {
        json!(max_depth as u32)
    } else {
        json!(max_depth)
    }
}

fn ingest_failure(tool: &str, message: &str) -> CallToolResult {
    warn!(
        "event=ingest_failed module=api status=error tool={tool} error={}",
        message.replace(['\n', '\r'], " ")
    );
    let text = pretty(&json!({ "error": message, "status": STATUS_FAILED }))
        .unwrap_or_else(|_| message.to_string());
    failure(text)
}

fn command_failure(message: &str) -> String {
    pretty(&json!({ "status": STATUS_ERROR, "error": message }))
        .unwrap_or_else(|_| message.to_string())
}

fn to_response<T: Serialize>(payload: &T) -> CallToolResult {
    match pretty(payload) {
        Ok(text) => success(text),
        Err(err) => failure(format!("failed to encode tool response: {err}")),
    }
}

fn pretty<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

#[cfg(test)]
mod tests {
    use super::{depth_number, failure, result_text, success, ToolServer};
    use serde_json::json;

    #[test]
    fn results_carry_one_text_item_and_error_flag() {
        let ok = success("{}".to_string());
        assert_eq!(ok.content.len(), 1);
        assert_eq!(result_text(&ok), "{}");
        assert_ne!(ok.is_error, Some(true));

        let failed = failure("boom".to_string());
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(result_text(&failed), "boom");

        let json = serde_json::to_value(&failed).expect("result serializes");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "boom");
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn unknown_tool_is_plain_text_error() {
        let mut server = ToolServer::default();
        let response = server.call_tool("AoT-heavy", &json!({}));
        assert_eq!(response.is_error, Some(true));
        assert_eq!(result_text(&response), "Unknown tool: AoT-heavy");
    }

    #[test]
    fn server_uses_configured_full_ceiling() {
        let server = ToolServer::new(Some(9.0));
        assert_eq!(server.full_engine().max_depth(), 9.0);
        assert_eq!(server.light_engine().max_depth(), 3.0);
        assert_eq!(server.list_tools().len(), 3);
    }

    #[test]
    fn whole_ceilings_echo_as_integers() {
        assert_eq!(depth_number(7.0), json!(7));
        assert_eq!(depth_number(4.7), json!(4.7));
        assert_eq!(depth_number(0.5), json!(0.5));
    }
}
