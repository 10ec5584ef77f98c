//! Tracing setup for the server process
//!
//! stdout carries MCP frames, so tracing goes to stderr unless a log
//! directory is configured.

mod output;

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use output::{FormatStyle, RotationPeriod};

const LOG_FILE_PREFIX: &str = "virtuoso_mcp_server";

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Tracing options
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Logging {
    /// Minimum level to record. `RUST_LOG` directives are added on top.
    #[serde(deserialize_with = "level_from_str")]
    #[schemars(schema_with = "level")]
    pub level: Level,

    /// Directory for rolling log files. Unset logs to stderr.
    pub path: Option<PathBuf>,

    /// How often a new file is started under `path`
    pub rotation: RotationPeriod,

    pub format: FormatStyle,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            path: None,
            rotation: RotationPeriod::default(),
            format: FormatStyle::default(),
        }
    }
}

impl Logging {
    /// Build the formatting layer for the configured destination.
    ///
    /// The guard must be held for as long as the process logs, or buffered
    /// lines written to a file are lost.
    pub fn layer(&self) -> (BoxedLayer, Option<WorkerGuard>) {
        let (writer, guard) = match &self.path {
            Some(directory) => match self.file_writer(directory) {
                Ok((writer, guard)) => (writer, Some(guard)),
                Err(e) => {
                    eprintln!(
                        "Cannot log to {}: {e}. Logging to stderr instead.",
                        directory.display()
                    );
                    (BoxMakeWriter::new(std::io::stderr), None)
                }
            },
            None => (BoxMakeWriter::new(std::io::stderr), None),
        };

        (self.layer_with_writer(writer), guard)
    }

    /// Build the formatting layer around an arbitrary writer
    pub fn layer_with_writer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);

        match self.format {
            FormatStyle::Full => layer.boxed(),
            FormatStyle::Compact => layer.compact().boxed(),
            FormatStyle::Json => layer.json().boxed(),
            FormatStyle::Pretty => layer.pretty().boxed(),
        }
    }

    /// The level filter, quieting protocol chatter unless debugging
    pub fn env_filter(&self) -> Result<EnvFilter, anyhow::Error> {
        let mut filter = EnvFilter::from_default_env().add_directive(self.level.into());
        if self.level <= Level::INFO {
            filter = filter
                .add_directive("rmcp=warn".parse()?)
                .add_directive("hyper_util=warn".parse()?);
        }
        Ok(filter)
    }

    fn file_writer(&self, directory: &Path) -> anyhow::Result<(BoxMakeWriter, WorkerGuard)> {
        std::fs::create_dir_all(directory)?;
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.into())
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .build(directory)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        Ok((BoxMakeWriter::new(writer), guard))
    }
}

fn level_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
    String::deserialize(deserializer)?
        .parse()
        .map_err(<D::Error as serde::de::Error>::custom)
}

fn level(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
    /// Log level
    #[derive(JsonSchema)]
    #[schemars(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Level {
        Trace,
        Debug,
        Info,
        Warn,
        Error,
    }

    Level::json_schema(generator)
}
