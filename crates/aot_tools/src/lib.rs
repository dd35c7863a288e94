//! Tool surface for the Atom of Thoughts engines.
//!
//! Maps named tool calls with untyped JSON arguments onto `aot_core` and
//! encodes results as MCP `CallToolResult` text items.

pub mod api;
pub mod descriptors;
pub mod render;

pub use api::{result_text, ToolServer};
pub use descriptors::{
    tool_descriptors, AOT_LIGHT_TOOL_NAME, AOT_TOOL_NAME, ATOM_COMMANDS_TOOL_NAME,
};
pub use rmcp::model::{CallToolResult, Tool};
pub use render::format_atom;
