use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderMap;
use schemars::JsonSchema;
use serde::Deserialize;
use virtuoso_mcp_server::diagnostic_log::DiagnosticLog;
use virtuoso_mcp_server::server::Transport;

use super::logging::Logging;

/// Configuration for the MCP server
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// The type of server transport to use
    pub transport: Transport,

    /// Tracing output for the server process
    pub logging: Logging,

    /// The plain-text log of every tool invocation
    pub diagnostic_log: DiagnosticLogConfig,

    /// Upper bound on a single SPARQL request, e.g. `30s`. Unset waits indefinitely.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub request_timeout: Option<Duration>,

    /// List of hard-coded headers to include in all SPARQL requests
    #[serde(deserialize_with = "parsers::map_from_str")]
    #[schemars(schema_with = "super::schemas::header_map")]
    pub headers: HeaderMap,
}

/// Where tool invocations are recorded
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiagnosticLogConfig {
    /// Record tool invocations
    pub enabled: bool,

    /// The log file. Defaults to `virtuoso_server_log.txt` next to the executable.
    pub path: Option<PathBuf>,
}

impl Default for DiagnosticLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl DiagnosticLogConfig {
    /// Open the configured log. A log that cannot be opened is disabled rather
    /// than stopping the server.
    pub fn open(&self) -> DiagnosticLog {
        if !self.enabled {
            return DiagnosticLog::disabled();
        }

        let path = match &self.path {
            Some(path) => Ok(path.clone()),
            None => DiagnosticLog::default_path(),
        };

        match path.and_then(DiagnosticLog::open) {
            Ok(log) => {
                tracing::info!(path = ?log.path(), "Writing diagnostic log");
                log
            }
            Err(e) => {
                tracing::warn!("Diagnostic log disabled, could not open it: {e}");
                DiagnosticLog::disabled()
            }
        }
    }
}

mod parsers {
    use std::collections::HashMap;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    /// Header names and values are validated here so a bad entry fails
    /// config loading instead of the first request.
    pub(super) fn map_from_str<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        HashMap::<String, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(name, value)| -> Result<_, D::Error> {
                let name =
                    HeaderName::try_from(name.as_str()).map_err(<D::Error as Error>::custom)?;
                let value =
                    HeaderValue::try_from(value.as_str()).map_err(<D::Error as Error>::custom)?;
                Ok((name, value))
            })
            .collect()
    }
}
