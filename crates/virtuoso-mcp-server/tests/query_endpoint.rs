//! Integration test: the query tool against a live HTTP endpoint, covering the
//! happy paths and the failures an agent is expected to recover from.

use mockito::Matcher;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{Value, json};
use virtuoso_mcp_server::diagnostic_log::DiagnosticLog;
use virtuoso_mcp_server::sparql::{ClientOptions, HttpSparqlClient};
use virtuoso_mcp_server::tools::query::{QUERY_TOOL_NAME, Query};

fn query_tool(log: DiagnosticLog) -> Query<HttpSparqlClient> {
    let client = HttpSparqlClient::new(ClientOptions::default()).unwrap();
    Query::new(client, log)
}

fn arguments(value: Value) -> JsonObject {
    value.as_object().cloned().unwrap()
}

fn text(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1);
    result.content[0].as_text().unwrap().text.clone()
}

/// An address nothing is listening on
async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{address}/sparql")
}

#[tokio::test]
async fn json_query_is_pretty_printed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sparql")
        .match_query(Matcher::UrlEncoded(
            "query".into(),
            "SELECT * WHERE {?s ?p ?o}".into(),
        ))
        .with_header("content-type", "application/sparql-results+json")
        .with_body(r#"{"head":{},"results":{"bindings":[]}}"#)
        .expect(1)
        .create_async()
        .await;

    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": format!("{}/sparql", server.url()),
                "query": "SELECT * WHERE {?s ?p ?o}"
            }))),
        )
        .await;

    mock.assert_async().await;
    let expected = json!({"head": {}, "results": {"bindings": []}});
    assert_eq!(text(&result), serde_json::to_string_pretty(&expected).unwrap());
}

#[tokio::test]
async fn json_numbers_survive_pretty_printing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_body(r#"{"head":{"vars":["n"]},"results":{"bindings":[]},"count":123456789012345678901234567890,"ratio":0.1000000000000000055511151231257827}"#)
        .create_async()
        .await;

    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": format!("{}/sparql", server.url()),
                "query": "SELECT (COUNT(*) AS ?n) WHERE {?s ?p ?o}"
            }))),
        )
        .await;

    let text = text(&result);
    assert!(text.contains(r#""count": 123456789012345678901234567890"#), "{text}");
    assert!(text.contains(r#""ratio": 0.1000000000000000055511151231257827"#), "{text}");
}

#[tokio::test]
async fn csv_query_is_passed_through() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sparql")
        .match_query(Matcher::UrlEncoded("format".into(), "text/csv".into()))
        .match_header("accept", "text/csv")
        .with_header("content-type", "text/csv")
        .with_body("s,p,o\n")
        .expect(1)
        .create_async()
        .await;

    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": format!("{}/sparql", server.url()),
                "query": "SELECT * WHERE {?s ?p ?o}",
                "result_format": "CSV"
            }))),
        )
        .await;

    mock.assert_async().await;
    assert_eq!(text(&result), "s,p,o\n");
}

#[tokio::test]
async fn missing_endpoint_never_reaches_the_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({"query": "SELECT ..."}))),
        )
        .await;

    mock.assert_async().await;
    assert_eq!(text(&result), "Error: No endpoint URL provided");
}

#[tokio::test]
async fn connection_refused_is_reported_and_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("virtuoso_server_log.txt");
    let tool = query_tool(DiagnosticLog::open(&log_path).unwrap());
    let refused = closed_port_url().await;

    let result = tool
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": refused,
                "query": "SELECT * WHERE {?s ?p ?o}"
            }))),
        )
        .await;

    let message = text(&result);
    assert!(message.starts_with("Error: "), "{message}");
    assert!(
        message.to_lowercase().contains("connect"),
        "expected the connection failure in: {message}"
    );

    // The same tool keeps serving
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_body("?s\n")
        .create_async()
        .await;
    let result = tool
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": format!("{}/sparql", server.url()),
                "query": "SELECT ?s WHERE {?s ?p ?o}",
                "result_format": "tsv"
            }))),
        )
        .await;
    assert_eq!(text(&result), "?s\n");

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Error in execute_sparql: "));
    assert!(log.contains("Query executed successfully. Result format: tsv"));
}

#[tokio::test]
async fn endpoint_rejection_surfaces_the_remote_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body("Virtuoso 37000 Error SP030: SPARQL compiler, line 1: syntax error")
        .create_async()
        .await;

    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": format!("{}/sparql", server.url()),
                "query": "SELEKT"
            }))),
        )
        .await;

    let message = text(&result);
    assert!(message.starts_with("Error: Endpoint responded with 400"));
    assert!(message.contains("SP030"));
}

#[tokio::test]
async fn unparseable_endpoint_url_is_an_execution_error() {
    let result = query_tool(DiagnosticLog::disabled())
        .execute(
            QUERY_TOOL_NAME,
            Some(&arguments(json!({
                "endpoint_url": "virtuoso/sparql",
                "query": "ASK {}"
            }))),
        )
        .await;

    assert!(text(&result).starts_with("Error: Invalid endpoint URL 'virtuoso/sparql'"));
}
