//! MCP client implementation
//!
//! Low-level communication with an MCP server over stdio. Speaks JSON-RPC 2.0
//! with request/response correlation by numeric id.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::core::config::SessionConfig;
use crate::core::{RelayError, Result, ToolArguments, ToolDescriptor, ToolOutput};
use crate::mcp::script::ServerScript;
use crate::mcp::session::ToolSession;
use crate::mcp::types::*;

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Requests awaiting a response
#[derive(Default)]
struct Pending {
    waiters: HashMap<u64, oneshot::Sender<JsonRpcResponse>>,
    /// Set once the reader has exited or the session was closed
    closed: bool,
}

impl Pending {
    /// Drop every waiter so their receivers see a closed channel
    fn shut(&mut self) {
        self.closed = true;
        self.waiters.clear();
    }
}

/// MCP client for communicating with a single MCP server
pub struct McpClient {
    /// Name used in log fields
    name: String,
    /// Session configuration
    config: SessionConfig,
    /// Child process handle, when launched from a script
    process: Mutex<Option<Child>>,
    /// Request writer (child stdin)
    writer: Mutex<Option<Writer>>,
    /// Background stdout reader
    reader: Mutex<Option<JoinHandle<()>>>,
    /// Request ID counter
    request_id: AtomicU64,
    /// Pending requests: request_id -> response channel
    pending: Arc<Mutex<Pending>>,
    /// Server info after initialization
    server_info: Mutex<Option<Implementation>>,
}

impl McpClient {
    /// Launch a server script and complete the MCP handshake
    pub async fn connect(script: &ServerScript, config: &SessionConfig) -> Result<Self> {
        let name = script.display_name();

        info!(
            target: "mcp_client",
            server = %name,
            command = %script.launcher(),
            "Connecting to MCP server"
        );

        let mut child = Command::new(script.launcher().command())
            .arg(script.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!(target: "mcp_client", error = %e, "Failed to spawn MCP server process");
                RelayError::connection(format!(
                    "Failed to start '{} {}': {}",
                    script.launcher(),
                    script.path().display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RelayError::connection("Failed to capture stdin"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RelayError::connection("Failed to capture stdout"))?;

        let client = Self::from_transport(name, stdout, stdin, config.clone());
        *client.process.lock().await = Some(child);

        if let Err(e) = client.initialize().await {
            client.close().await;
            return Err(e);
        }

        Ok(client)
    }

    /// Build a client over arbitrary byte streams
    ///
    /// The handshake is not performed; call [`McpClient::initialize`] next.
    pub fn from_transport<R, W>(
        name: impl Into<String>,
        reader: R,
        writer: W,
        config: SessionConfig,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let name = name.into();
        let pending = Arc::new(Mutex::new(Pending::default()));
        let reader = Self::spawn_reader(name.clone(), reader, Arc::clone(&pending));

        Self {
            name,
            config,
            process: Mutex::new(None),
            writer: Mutex::new(Some(Box::new(writer))),
            reader: Mutex::new(Some(reader)),
            request_id: AtomicU64::new(1),
            pending,
            server_info: Mutex::new(None),
        }
    }

    /// Send `initialize` followed by the `initialized` notification
    pub async fn initialize(&self) -> Result<InitializeResult> {
        let params = InitializeParams {
            protocol_version: self.config.protocol_version.clone(),
            capabilities: json!({}),
            client_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        let result: InitializeResult = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await
            .map_err(|e| match e {
                RelayError::Connection(_) => e,
                other => RelayError::connection(format!("Handshake failed: {}", other)),
            })?;

        self.notify("notifications/initialized")
            .await
            .map_err(|e| RelayError::connection(format!("Handshake failed: {}", e)))?;

        info!(
            target: "mcp_client",
            server = %self.name,
            server_name = %result.server_info.name,
            server_version = %result.server_info.version,
            protocol = %result.protocol_version,
            "MCP server connected and initialized"
        );

        *self.server_info.lock().await = Some(result.server_info.clone());
        Ok(result)
    }

    /// Release the transport: writer, reader task and child process
    ///
    /// Safe to call more than once.
    pub async fn close(&self) {
        let writer = self.writer.lock().await.take();
        let was_open = writer.is_some();

        if let Some(mut writer) = writer {
            let _ = writer.shutdown().await;
        }

        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }

        self.pending.lock().await.shut();

        if let Some(mut child) = self.process.lock().await.take() {
            let _ = child.kill().await;
            let _ = child.wait().await;
        }

        if was_open {
            info!(target: "mcp_client", server = %self.name, "Disconnected from MCP server");
        }
    }

    /// Server identification reported during the handshake
    pub async fn server_info(&self) -> Option<Implementation> {
        self.server_info.lock().await.clone()
    }

    /// List readable resources
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.collect_pages("resources/list", |page: ListResourcesResult| {
            (page.resources, page.next_cursor)
        })
        .await
    }

    /// List parameterised resources
    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>> {
        self.collect_pages(
            "resources/templates/list",
            |page: ListResourceTemplatesResult| (page.resource_templates, page.next_cursor),
        )
        .await
    }

    /// Read a resource by URI
    pub async fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContents>> {
        let params = ReadResourceParams {
            uri: uri.to_string(),
        };
        let result: ReadResourceResult = self
            .request("resources/read", Some(serde_json::to_value(params)?))
            .await?;
        Ok(result.contents)
    }

    /// Fetch every page of a cursor-paginated listing
    ///
    /// Stops when the server hands back a cursor it already returned.
    async fn collect_pages<P, T>(
        &self,
        method: &str,
        split: fn(P) -> (Vec<T>, Option<String>),
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = PaginatedParams { cursor };
            let page: P = self
                .request(method, Some(serde_json::to_value(params)?))
                .await?;
            let (batch, next) = split(page);
            items.extend(batch);

            match next {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    warn!(
                        target: "mcp_client",
                        server = %self.name,
                        method = %method,
                        cursor = %next,
                        "Server repeated a pagination cursor"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// Send a request and decode its result; JSON-RPC errors become protocol errors
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        let value = self.send_request(method, params).await?.map_err(|error| {
            RelayError::protocol(format!(
                "{} failed: {} (code: {})",
                method, error.message, error.code
            ))
        })?;

        serde_json::from_value(value)
            .map_err(|e| RelayError::protocol(format!("Invalid {} result: {}", method, e)))
    }

    /// Send a JSON-RPC request and wait for the matching response
    async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<std::result::Result<Value, JsonRpcError>> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(RelayError::connection("Session is closed"));
            }
            pending.waiters.insert(id, tx);
        }

        debug!(target: "mcp_client", server = %self.name, id = id, method = %method, "Sending request");

        let request = JsonRpcRequest::new(id, method, params);
        if let Err(e) = self.write_message(&request).await {
            self.pending.lock().await.waiters.remove(&id);
            return Err(e);
        }

        let wait = Duration::from_secs(self.config.request_timeout_secs);
        let response = match timeout(wait, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(RelayError::connection(format!(
                    "Server closed the connection during {}",
                    method
                )))
            }
            Err(_) => {
                self.pending.lock().await.waiters.remove(&id);
                warn!(target: "mcp_client", method = %method, "Request timeout");
                return Err(RelayError::Timeout(method.to_string()));
            }
        };

        if let Some(error) = response.error {
            return Ok(Err(error));
        }

        response
            .result
            .map(Ok)
            .ok_or_else(|| RelayError::protocol("Missing result in response"))
    }

    /// Send a notification (no response expected)
    async fn notify(&self, method: &str) -> Result<()> {
        self.write_message(&JsonRpcNotification::new(method)).await
    }

    /// Write one newline-delimited JSON message
    async fn write_message<T: Serialize>(&self, message: &T) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| RelayError::connection("Session is closed"))?;

        writer.write_all(line.as_bytes()).await.map_err(|e| {
            error!(target: "mcp_client", error = %e, "Failed to write request");
            RelayError::connection(format!("Failed to write to server: {}", e))
        })?;

        writer.flush().await.map_err(|e| {
            error!(target: "mcp_client", error = %e, "Failed to flush request");
            RelayError::connection(format!("Failed to write to server: {}", e))
        })
    }

    /// Spawn the stdout reader task
    fn spawn_reader<R>(name: String, reader: R, pending: Arc<Mutex<Pending>>) -> JoinHandle<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(target: "mcp_client", server = %name, error = %e, "Read failed");
                        break;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                match Incoming::parse(&line) {
                    Ok(Incoming::Response(response)) => {
                        let waiter = match response.id.as_u64() {
                            Some(id) => pending.lock().await.waiters.remove(&id),
                            None => None,
                        };
                        match waiter {
                            Some(tx) => {
                                let _ = tx.send(response);
                            }
                            None => warn!(
                                target: "mcp_client",
                                server = %name,
                                id = %response.id,
                                "Received response for unknown request"
                            ),
                        }
                    }
                    Ok(Incoming::Other { method }) => {
                        debug!(
                            target: "mcp_client",
                            server = %name,
                            method = method.as_deref().unwrap_or("?"),
                            "Ignoring server message"
                        );
                    }
                    Err(e) => {
                        warn!(
                            target: "mcp_client",
                            server = %name,
                            error = %e,
                            line = %line,
                            "Failed to parse JSON-RPC message"
                        );
                    }
                }
            }

            pending.lock().await.shut();
            debug!(target: "mcp_client", server = %name, "Stdout reader exited");
        })
    }
}

#[async_trait]
impl ToolSession for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        debug!(target: "mcp_client", server = %self.name, "Listing tools");

        let all_tools = self
            .collect_pages("tools/list", |page: ListToolsResult| {
                (page.tools, page.next_cursor)
            })
            .await?;

        debug!(
            target: "mcp_client",
            server = %self.name,
            count = all_tools.len(),
            "Listed tools"
        );

        Ok(all_tools)
    }

    async fn call_tool(&self, name: &str, arguments: &ToolArguments) -> Result<ToolOutput> {
        debug!(target: "mcp_client", server = %self.name, tool = %name, "Calling tool");

        let params = CallToolParams {
            name: name.to_string(),
            arguments: arguments.to_value(),
        };

        let value = self
            .send_request("tools/call", Some(serde_json::to_value(params)?))
            .await?
            .map_err(|error| {
                RelayError::tool(format!("{}: {} (code: {})", name, error.message, error.code))
            })?;

        let result: CallToolResult = serde_json::from_value(value)
            .map_err(|e| RelayError::protocol(format!("Invalid tools/call result: {}", e)))?;

        let content = result.text();
        if result.is_error.unwrap_or(false) {
            debug!(target: "mcp_client", server = %self.name, tool = %name, "Tool returned error");
            return Err(RelayError::tool(format!("{}: {}", name, content)));
        }

        Ok(ToolOutput::success(name, content))
    }
}
