//! MCP server handler over the tool server.
//!
//! # Responsibility
//! - Advertise the three tools and route `tools/call` to `ToolServer`.
//! - Leave framing, the initialize handshake and protocol errors to `rmcp`.
//!
//! # Invariants
//! - Tool failures come back as `isError` results, never as protocol errors.
//! - Calls run one at a time against the shared sessions.

use aot_tools::ToolServer;
use log::debug;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SERVER_NAME: &str = "atom-of-thoughts";

/// Shared handle to the process-wide reasoning sessions.
#[derive(Debug, Clone)]
pub struct AotServer {
    tools: Arc<Mutex<ToolServer>>,
}

impl AotServer {
    pub fn new(tools: ToolServer) -> Self {
        Self {
            tools: Arc::new(Mutex::new(tools)),
        }
    }

    pub async fn max_depth(&self) -> f64 {
        self.tools.lock().await.full_engine().max_depth()
    }

    pub async fn list(&self) -> ListToolsResult {
        ListToolsResult::with_all_items(self.tools.lock().await.list_tools())
    }

    /// Runs one tool call; absent arguments read as an empty object.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let arguments = Value::Object(arguments.unwrap_or_default());
        debug!("event=tool_request module=server status=ok tool={name}");
        self.tools.lock().await.call_tool(name, &arguments)
    }
}

impl ServerHandler for AotServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = server_info;
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(self.list().await)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::{AotServer, SERVER_NAME};
    use aot_tools::{result_text, ToolServer};
    use rmcp::ServerHandler;
    use serde_json::{json, Value};

    fn arguments(value: Value) -> Option<rmcp::model::JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[test]
    fn info_names_server_and_enables_tools() {
        let info = AotServer::new(ToolServer::default()).get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn list_advertises_three_tools() {
        let server = AotServer::new(ToolServer::default());
        let listed = server.list().await;
        let names: Vec<&str> = listed.tools.iter().map(|tool| tool.name.as_ref()).collect();
        assert_eq!(names, vec!["AoT", "AoT-light", "atomcommands"]);
        assert!(listed.next_cursor.is_none());
    }

    #[tokio::test]
    async fn calls_share_one_session_across_clones() {
        let server = AotServer::new(ToolServer::new(Some(4.5)));
        let clone = server.clone();

        let stored = server
            .call(
                "AoT",
                arguments(json!({
                    "atomId": "P1", "content": "given", "atomType": "premise",
                    "dependencies": [], "confidence": 0.9
                })),
            )
            .await;
        assert_ne!(stored.is_error, Some(true));
        let payload: Value =
            serde_json::from_str(&result_text(&stored)).expect("payload is JSON");
        assert_eq!(payload["atomId"], "P1");

        let status = clone
            .call("atomcommands", arguments(json!({"command": "termination_status"})))
            .await;
        let status: Value = serde_json::from_str(&result_text(&status)).expect("status JSON");
        assert_eq!(status["reason"], "Continue reasoning");
        assert_eq!(clone.max_depth().await, 4.5);
    }

    #[tokio::test]
    async fn tool_failures_stay_inside_the_result() {
        let server = AotServer::new(ToolServer::default());

        let unknown = server.call("nope", None).await;
        assert_eq!(unknown.is_error, Some(true));
        assert_eq!(result_text(&unknown), "Unknown tool: nope");

        let empty = server.call("AoT", None).await;
        assert_eq!(empty.is_error, Some(true));
        let body: Value = serde_json::from_str(&result_text(&empty)).expect("failure JSON");
        assert_eq!(body["status"], "failed");
        assert!(body["error"]
            .as_str()
            .is_some_and(|error| error.starts_with("Invalid atomId")));
    }
}
