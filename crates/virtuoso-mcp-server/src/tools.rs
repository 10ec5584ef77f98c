//! The tools exposed to MCP clients

pub mod query;

use rmcp::model::{JsonObject, Tool};
use serde_json::json;

use crate::sparql::ResultFormat;
use query::{ENDPOINT_URL, QUERY, QUERY_TOOL_NAME, RESULT_FORMAT};

const QUERY_TOOL_DESCRIPTION: &str = "Execute a SPARQL query on a Virtuoso endpoint";

/// The descriptor for the SPARQL query tool.
///
/// The schema lists exactly the arguments accepted by
/// [`QueryRequest::from_arguments`](crate::sparql::QueryRequest::from_arguments).
pub fn query_tool() -> Tool {
    Tool::new(QUERY_TOOL_NAME, QUERY_TOOL_DESCRIPTION, input_schema())
}

/// Every tool this server offers, in a stable order
pub fn list_tools() -> Vec<Tool> {
    vec![query_tool()]
}

fn input_schema() -> JsonObject {
    let formats: Vec<&str> = ResultFormat::ALL.iter().map(ResultFormat::as_str).collect();

    let mut schema = JsonObject::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("required".into(), json!([ENDPOINT_URL, QUERY]));
    schema.insert(
        "properties".into(),
        json!({
            ENDPOINT_URL: {
                "type": "string",
                "description": "URL of the Virtuoso SPARQL endpoint"
            },
            QUERY: {
                "type": "string",
                "description": "SPARQL query to execute"
            },
            RESULT_FORMAT: {
                "type": "string",
                "description": "Format of the result (json, xml, csv, tsv)",
                "enum": formats,
                "default": ResultFormat::default().as_str()
            }
        }),
    );
    schema
}
