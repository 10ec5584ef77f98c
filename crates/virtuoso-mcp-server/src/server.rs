use std::time::Duration;

use bon::bon;
use reqwest::header::HeaderMap;
use rmcp::{ServiceExt as _, transport::stdio};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{error, info};

use crate::diagnostic_log::DiagnosticLog;
use crate::errors::ServerError;
use crate::sparql::{ClientOptions, HttpSparqlClient};

mod running;

pub use running::Running;

/// A Virtuoso SPARQL MCP Server
pub struct Server {
    transport: Transport,
    headers: HeaderMap,
    request_timeout: Option<Duration>,
    diagnostic_log: DiagnosticLog,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// Use standard IO for server <> client communication
    #[default]
    Stdio,
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        #[builder(default)] transport: Transport,
        #[builder(default)] headers: HeaderMap,
        request_timeout: Option<Duration>,
        #[builder(default)] diagnostic_log: DiagnosticLog,
    ) -> Self {
        Self {
            transport,
            headers,
            request_timeout,
            diagnostic_log,
        }
    }

    /// Serve MCP requests until the client disconnects
    pub async fn start(self) -> Result<(), ServerError> {
        let client = HttpSparqlClient::new(ClientOptions {
            headers: self.headers,
            timeout: self.request_timeout,
        })?;
        let running = Running::new(client, self.diagnostic_log);

        match self.transport {
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = running
                    .serve(stdio())
                    .await
                    .inspect_err(|e| {
                        error!("serving error: {:?}", e);
                    })
                    .map_err(Box::new)?;
                let reason = service.waiting().await?;
                info!(?reason, "MCP session ended");
            }
        }

        Ok(())
    }
}
