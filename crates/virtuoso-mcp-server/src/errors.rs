use reqwest::StatusCode;

use crate::tools::query::QUERY_TOOL_NAME;

/// An invalid or missing tool argument, detected before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No endpoint URL provided")]
    MissingEndpoint,

    #[error("No SPARQL query provided")]
    MissingQuery,

    #[error("Invalid input: {0} must be a string")]
    InvalidArgument(&'static str),
}

/// A failure while talking to the SPARQL endpoint
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("{}", chain(.0))]
    Request(reqwest::Error),

    #[error("Endpoint responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Could not parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for EndpointError {
    fn from(e: reqwest::Error) -> Self {
        EndpointError::Request(e)
    }
}

/// reqwest keeps the interesting part (connection refused, DNS failure, ...)
/// in the source chain rather than in its own message.
fn chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

/// Every way a single tool invocation can fail.
///
/// The display text is what the calling agent sees, prefixed with `Error: `
/// (see [`QueryError::to_text`]).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown tool name '{0}'. Available tool is: {tool}", tool = QUERY_TOOL_NAME)]
    UnknownTool(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

impl QueryError {
    /// Render the error as the text content returned to the client
    pub fn to_text(&self) -> String {
        format!("Error: {self}")
    }

    /// Render the error along with its full source chain, for diagnostics only
    pub fn to_report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            report.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        report
    }
}

/// An error in server initialization
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Could not build SPARQL client: {0}")]
    Client(reqwest::Error),

    #[error("Failed to initialize MCP server: {0}")]
    McpInitializeError(#[from] Box<rmcp::service::ServerInitializeError>),

    #[error("Failed to start server: {0}")]
    StartupError(#[from] tokio::task::JoinError),
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;
