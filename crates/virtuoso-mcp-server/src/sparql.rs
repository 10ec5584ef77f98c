//! SPARQL protocol client
//!
//! Sends a query to a SPARQL endpoint over HTTP and returns the response in
//! the requested serialization.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::errors::{EndpointError, ServerError};

/// Serialization requested from the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResultFormat {
    #[default]
    Json,
    Xml,
    Csv,
    Tsv,
}

impl ResultFormat {
    pub const ALL: [ResultFormat; 4] = [Self::Json, Self::Xml, Self::Csv, Self::Tsv];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Parse a user-supplied format name, case-insensitively.
    ///
    /// Anything unrecognized falls back to [`ResultFormat::Json`].
    pub fn lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// The `Accept` header sent for this format
    pub fn accept(&self) -> &'static str {
        match self {
            Self::Json => {
                "application/sparql-results+json,application/json,text/javascript,application/javascript"
            }
            Self::Xml => "application/sparql-results+xml,application/xml",
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
        }
    }

    /// The value of the `format` query parameter understood by Virtuoso
    pub fn format_parameter(&self) -> &'static str {
        match self {
            Self::Json => "application/sparql-results+json",
            Self::Xml => "application/sparql-results+xml",
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResultFormat(pub String);

impl fmt::Display for UnknownResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown result format '{}'", self.0)
    }
}

impl std::error::Error for UnknownResultFormat {}

impl FromStr for ResultFormat {
    type Err = UnknownResultFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(UnknownResultFormat(s.to_string())),
        }
    }
}

/// A validated query, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub endpoint_url: String,
    pub query: String,
    pub result_format: ResultFormat,
}

/// The endpoint's answer
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A parsed `application/sparql-results+json` document
    Json(Value),

    /// The raw body of an XML, CSV or TSV response
    Text(String),
}

/// Executes SPARQL queries.
///
/// The production implementation is [`HttpSparqlClient`]; tests substitute
/// their own.
pub trait SparqlClient: Send + Sync {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<QueryOutcome, EndpointError>> + Send;
}

/// Options for building an [`HttpSparqlClient`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Headers included in every request
    pub headers: HeaderMap,

    /// Upper bound on a single request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// A [`SparqlClient`] speaking the SPARQL 1.1 protocol over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpSparqlClient {
    client: reqwest::Client,
}

impl HttpSparqlClient {
    pub fn new(options: ClientOptions) -> Result<Self, ServerError> {
        let mut headers = options.headers;
        if !headers.contains_key(USER_AGENT) {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_static(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                )),
            );
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().map_err(ServerError::Client)?,
        })
    }
}

impl SparqlClient for HttpSparqlClient {
    #[tracing::instrument(skip_all, fields(endpoint = %request.endpoint_url, format = %request.result_format))]
    async fn query(&self, request: &QueryRequest) -> Result<QueryOutcome, EndpointError> {
        let url =
            Url::parse(&request.endpoint_url).map_err(|source| EndpointError::InvalidUrl {
                url: request.endpoint_url.clone(),
                source,
            })?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("query", request.query.as_str()),
                ("format", request.result_format.format_parameter()),
            ])
            .header(ACCEPT, request.result_format.accept())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EndpointError::Status { status, body });
        }

        tracing::debug!(%status, bytes = body.len(), "Received SPARQL response");

        match request.result_format {
            ResultFormat::Json => Ok(QueryOutcome::Json(serde_json::from_str(&body)?)),
            ResultFormat::Xml | ResultFormat::Csv | ResultFormat::Tsv => {
                Ok(QueryOutcome::Text(body))
            }
        }
    }
}
