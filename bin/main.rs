use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use virtuoso_mcp_server::server::{Server, Transport};

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, Parser)]
#[command(
    version,
    styles = STYLES,
    about = "Virtuoso MCP Server - run SPARQL queries against Virtuoso endpoints from an AI agent",
)]
struct Args {
    /// Path to the config file
    config: Option<PathBuf>,

    /// The transport to serve MCP over. Overrides the config file.
    #[arg(long, value_enum)]
    transport: Option<TransportArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    Stdio,
}

impl From<TransportArg> for Transport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Transport::Stdio,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config: runtime::Config = match args.config {
        Some(ref path) => runtime::read_config(path)?,
        None => runtime::read_config_from_env()?,
    };

    let (logging_layer, _guard) = config.logging.layer();
    tracing_subscriber::registry()
        .with(logging_layer)
        .with(config.logging.env_filter()?)
        .init();

    info!("Virtuoso MCP Server v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        info!(path = %path.display(), "Loaded configuration");
    }

    let transport = args.transport.map(Transport::from).unwrap_or(config.transport);
    if config.request_timeout.is_none() {
        warn!("No request_timeout configured, SPARQL requests may wait indefinitely");
    }

    let diagnostic_log = config.diagnostic_log.open();

    Ok(Server::builder()
        .transport(transport)
        .headers(config.headers)
        .maybe_request_timeout(config.request_timeout)
        .diagnostic_log(diagnostic_log)
        .build()
        .start()
        .await?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use rstest::rstest;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case::absent(&["virtuoso-mcp-server"], None)]
    #[case::stdio(&["virtuoso-mcp-server", "--transport", "stdio"], Some(TransportArg::Stdio))]
    fn transport_flag(#[case] argv: &[&str], #[case] expected: Option<TransportArg>) {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        assert_eq!(args.transport, expected);
    }

    #[rstest]
    #[case("sse")]
    #[case("streamable_http")]
    #[case("STDIO-ish")]
    fn other_transports_are_rejected(#[case] transport: &str) {
        let error = Args::try_parse_from(["virtuoso-mcp-server", "--transport", transport])
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn config_path_is_positional() {
        let args = Args::try_parse_from(["virtuoso-mcp-server", "virtuoso.yaml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("virtuoso.yaml")));
        assert_eq!(args.transport, None);
    }

    #[test]
    fn flag_maps_onto_the_server_transport() {
        assert_eq!(Transport::from(TransportArg::Stdio), Transport::Stdio);
    }
}
