//! MCP client integration tests
//!
//! Drives a real `McpClient` against a scripted server speaking
//! newline-delimited JSON-RPC over an in-memory duplex pipe.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use toolrelay::core::config::SessionConfig;
use toolrelay::core::{RelayError, ToolCall};
use toolrelay::mcp::{McpClient, ToolSession};
use toolrelay::tools::ToolRegistry;

/// Methods the fake server has received, in arrival order
type Seen = Arc<Mutex<Vec<String>>>;

fn add_tool() -> Value {
    json!({
        "name": "add",
        "description": "Add two numbers",
        "inputSchema": {
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
            "required": ["a", "b"]
        }
    })
}

fn failing_tool() -> Value {
    json!({
        "name": "divide_by_zero",
        "inputSchema": {"type": "object"}
    })
}

fn echo_tool() -> Value {
    json!({
        "name": "echo_tool",
        "description": "Echo a message",
        "inputSchema": {
            "type": "object",
            "properties": {"message": {"type": "string"}},
            "required": ["message"]
        }
    })
}

fn text_result(text: &str, is_error: bool) -> Value {
    json!({"content": [{"type": "text", "text": text}], "isError": is_error})
}

/// Answer one request; `None` means hang up
fn respond(method: &str, params: &Value) -> Option<Result<Value, (i32, &'static str)>> {
    let result = match method {
        "initialize" => Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {"tools": {}, "resources": {}},
            "serverInfo": {"name": "demo-server", "version": "1.2.0"}
        })),
        "tools/list" => match params.get("cursor").and_then(Value::as_str) {
            None => Ok(json!({"tools": [add_tool(), failing_tool()], "nextCursor": "page-2"})),
            Some("page-2") => Ok(json!({"tools": [echo_tool()]})),
            Some(_) => Err((-32602, "bad cursor")),
        },
        "tools/call" => {
            let args = &params["arguments"];
            match params["name"].as_str() {
                Some("add") => {
                    let sum = args["a"].as_i64().unwrap_or(0) + args["b"].as_i64().unwrap_or(0);
                    Ok(text_result(&sum.to_string(), false))
                }
                Some("echo_tool") => Ok(text_result(
                    &format!("Tool echo: {}", args["message"].as_str().unwrap_or("")),
                    false,
                )),
                Some("divide_by_zero") => Ok(text_result("division by zero", true)),
                _ => Err((-32602, "Unknown tool")),
            }
        }
        "resources/list" => Ok(json!({
            "resources": [{"uri": "greeting://world", "name": "greeting", "mimeType": "text/plain"}]
        })),
        // Hands back the same cursor forever
        "resources/templates/list" => Ok(json!({
            "resourceTemplates": [{"uriTemplate": "greeting://{name}", "name": "greeting"}],
            "nextCursor": "again"
        })),
        "resources/read" if params["uri"] == "hangup://" => return None,
        "resources/read" => Ok(json!({
            "contents": [{"uri": params["uri"], "text": "Hello, world!"}]
        })),
        _ => Err((-32601, "Method not found")),
    };
    Some(result)
}

/// Spawn the fake server and return a client over the other end of the pipe
fn connect_fake() -> (McpClient, Seen) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let (server_read, mut server_write) = tokio::io::split(server_io);
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        let mut lines = BufReader::new(server_read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let message: Value = serde_json::from_str(&line).unwrap();
            let method = message["method"].as_str().unwrap_or_default().to_string();
            log.lock().unwrap().push(method.clone());

            // Notifications carry no id and get no reply
            let Some(id) = message.get("id").cloned() else {
                continue;
            };

            let params = message.get("params").cloned().unwrap_or(Value::Null);
            let reply = match respond(&method, &params) {
                Some(Ok(result)) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                Some(Err((code, msg))) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": code, "message": msg}
                }),
                None => break,
            };

            let mut out = serde_json::to_string(&reply).unwrap();
            out.push('\n');
            if server_write.write_all(out.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let config = SessionConfig {
        request_timeout_secs: 5,
        ..SessionConfig::default()
    };
    let client = McpClient::from_transport("fake", client_read, client_write, config);
    (client, seen)
}

#[tokio::test]
async fn test_handshake_records_server_info() {
    let (client, seen) = connect_fake();

    let result = client.initialize().await.unwrap();
    assert_eq!(result.protocol_version, "2024-11-05");

    let info = client.server_info().await.unwrap();
    assert_eq!(info.name, "demo-server");
    assert_eq!(info.version, "1.2.0");

    // The in-order pipe guarantees the notification arrived before this request
    client.list_tools().await.unwrap();
    let methods = seen.lock().unwrap().clone();
    assert_eq!(
        &methods[..2],
        &["initialize".to_string(), "notifications/initialized".to_string()]
    );

    client.close().await;
}

#[tokio::test]
async fn test_list_tools_follows_pagination_and_is_stable() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    let first = client.list_tools().await.unwrap();
    let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["add", "divide_by_zero", "echo_tool"]);
    assert_eq!(first[0].description.as_deref(), Some("Add two numbers"));
    assert_eq!(first[1].input_schema, json!({"type": "object"}));

    let second = client.list_tools().await.unwrap();
    assert_eq!(first, second);

    client.close().await;
}

#[tokio::test]
async fn test_call_tool_with_validated_arguments() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    let registry = ToolRegistry::from_descriptors(client.list_tools().await.unwrap());
    let arguments = registry
        .validate(&ToolCall::new("add", json!({"a": 2, "b": 3})))
        .unwrap();

    let output = client.call_tool("add", &arguments).await.unwrap();
    assert_eq!(output.tool_name, "add");
    assert_eq!(output.content, "5");

    let arguments = registry
        .validate(&ToolCall::new("echo_tool", json!({"message": "hi"})))
        .unwrap();
    let output = client.call_tool("echo_tool", &arguments).await.unwrap();
    assert_eq!(output.content, "Tool echo: hi");

    client.close().await;
}

#[tokio::test]
async fn test_tool_error_result_is_an_invocation_failure() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    let registry = ToolRegistry::from_descriptors(client.list_tools().await.unwrap());
    let arguments = registry
        .validate(&ToolCall::new("divide_by_zero", json!({})))
        .unwrap();

    let err = client
        .call_tool("divide_by_zero", &arguments)
        .await
        .unwrap_err();
    match err {
        RelayError::ToolInvocation(msg) => assert!(msg.contains("division by zero")),
        other => panic!("Expected ToolInvocation, got {:?}", other),
    }

    client.close().await;
}

#[tokio::test]
async fn test_resources_can_be_listed_and_read() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    let resources = client.list_resources().await.unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].uri, "greeting://world");
    assert_eq!(resources[0].mime_type.as_deref(), Some("text/plain"));

    let templates = client.list_resource_templates().await.unwrap();
    assert_eq!(templates[0].uri_template, "greeting://{name}");

    let contents = client.read_resource("greeting://world").await.unwrap();
    assert_eq!(contents[0].text.as_deref(), Some("Hello, world!"));

    client.close().await;
}

#[tokio::test]
async fn test_repeated_cursor_ends_pagination() {
    let (client, seen) = connect_fake();
    client.initialize().await.unwrap();

    let templates = client.list_resource_templates().await.unwrap();
    assert_eq!(templates.len(), 2);

    let requests = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|m| *m == "resources/templates/list")
        .count();
    assert_eq!(requests, 2);

    client.close().await;
}

#[tokio::test]
async fn test_server_hangup_fails_pending_request() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    // The fake server exits instead of answering this read
    let err = client.read_resource("hangup://").await.unwrap_err();
    assert!(err.is_connection(), "unexpected error: {:?}", err);

    let err = client.list_tools().await.unwrap_err();
    assert!(err.is_connection(), "unexpected error: {:?}", err);

    client.close().await;
}

#[tokio::test]
async fn test_close_is_idempotent_and_rejects_later_requests() {
    let (client, _seen) = connect_fake();
    client.initialize().await.unwrap();

    client.close().await;
    client.close().await;

    let err = client.list_tools().await.unwrap_err();
    assert!(err.is_connection(), "unexpected error: {:?}", err);
}
