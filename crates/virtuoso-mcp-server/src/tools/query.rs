use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;

use crate::diagnostic_log::DiagnosticLog;
use crate::errors::{QueryError, ValidationError};
use crate::sparql::{QueryOutcome, QueryRequest, ResultFormat, SparqlClient};

/// The name of the tool that runs a SPARQL query
pub const QUERY_TOOL_NAME: &str = "query_virtuoso";

pub(crate) const ENDPOINT_URL: &str = "endpoint_url";
pub(crate) const QUERY: &str = "query";
pub(crate) const RESULT_FORMAT: &str = "result_format";

impl QueryRequest {
    /// Build a request from raw tool arguments.
    ///
    /// `null` counts as missing. An unrecognized or non-string `result_format`
    /// falls back to JSON rather than failing.
    pub fn from_arguments(arguments: Option<&JsonObject>) -> Result<Self, ValidationError> {
        let endpoint_url = string_argument(arguments, ENDPOINT_URL)?
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingEndpoint)?;
        let query = string_argument(arguments, QUERY)?
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingQuery)?;
        let result_format = arguments
            .and_then(|args| args.get(RESULT_FORMAT))
            .and_then(Value::as_str)
            .map(ResultFormat::lenient)
            .unwrap_or_default();

        Ok(Self {
            endpoint_url: endpoint_url.to_string(),
            query: query.to_string(),
            result_format,
        })
    }
}

fn string_argument<'a>(
    arguments: Option<&'a JsonObject>,
    name: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match arguments.and_then(|args| args.get(name)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::InvalidArgument(name)),
    }
}

/// Runs SPARQL queries on behalf of MCP clients.
///
/// Every outcome, including failures, is turned into a single text item so the
/// caller always gets a well-formed tool result.
#[derive(Clone)]
pub struct Query<C> {
    pub tool: Tool,
    client: C,
    log: DiagnosticLog,
}

impl<C: SparqlClient> Query<C> {
    pub fn new(client: C, log: DiagnosticLog) -> Self {
        Self {
            tool: super::query_tool(),
            client,
            log,
        }
    }

    #[tracing::instrument(skip_all, fields(tool = name))]
    pub async fn execute(&self, name: &str, arguments: Option<&JsonObject>) -> CallToolResult {
        self.log.log("FUNCTION CALLED: execute_sparql");
        self.log.log(format!(
            "Raw input - name: {name:?}, arguments: {}",
            arguments
                .map(|args| Value::Object(args.clone()).to_string())
                .unwrap_or_else(|| "None".to_string())
        ));

        let text = match self.run(name, arguments).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!("Query failed: {error}");
                self.log.log(format!("Error in execute_sparql: {}", error.to_report()));
                error.to_text()
            }
        };

        CallToolResult::success(vec![Content::text(text)])
    }

    async fn run(&self, name: &str, arguments: Option<&JsonObject>) -> Result<String, QueryError> {
        if name != QUERY_TOOL_NAME {
            return Err(QueryError::UnknownTool(name.to_string()));
        }

        let request = QueryRequest::from_arguments(arguments)?;
        self.log_format_fallback(arguments, request.result_format);

        self.log.log(format!(
            "Executing SPARQL query on endpoint: {}",
            request.endpoint_url
        ));
        let outcome = self.client.query(&request).await?;

        let text = match outcome {
            QueryOutcome::Json(value) => {
                serde_json::to_string_pretty(&value).map_err(crate::errors::EndpointError::from)?
            }
            QueryOutcome::Text(text) => text,
        };

        self.log.log(format!(
            "Query executed successfully. Result format: {}",
            request.result_format
        ));
        tracing::debug!(format = %request.result_format, bytes = text.len(), "Query executed");

        Ok(text)
    }

    fn log_format_fallback(&self, arguments: Option<&JsonObject>, format: ResultFormat) {
        let Some(requested) = arguments.and_then(|args| args.get(RESULT_FORMAT)) else {
            return;
        };
        let recognized = requested
            .as_str()
            .is_some_and(|s| s.parse::<ResultFormat>().is_ok());
        if !recognized {
            let shown = match requested.as_str() {
                Some(s) => s.to_string(),
                None => requested.to_string(),
            };
            tracing::debug!(requested = %shown, "Unrecognized result format, using {format}");
            self.log.log(format!(
                "Invalid result format: {shown}, using default: {format}"
            ));
        }
    }
}
