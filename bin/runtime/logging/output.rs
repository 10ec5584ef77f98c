use schemars::JsonSchema;
use serde::Deserialize;
use tracing_appender::rolling::Rotation;

/// Line format of the tracing output
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatStyle {
    /// Single-line, human-readable
    #[default]
    Full,
    /// Single-line with span context folded into the message
    Compact,
    /// One JSON object per line
    Json,
    /// Multi-line with source locations
    Pretty,
}

/// How often a new log file is started when logging to a directory
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RotationPeriod {
    Minutely,
    #[default]
    Hourly,
    Daily,
    Never,
}

impl From<RotationPeriod> for Rotation {
    fn from(period: RotationPeriod) -> Self {
        match period {
            RotationPeriod::Minutely => Rotation::MINUTELY,
            RotationPeriod::Hourly => Rotation::HOURLY,
            RotationPeriod::Daily => Rotation::DAILY,
            RotationPeriod::Never => Rotation::NEVER,
        }
    }
}
