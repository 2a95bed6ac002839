pub mod sandbox;

use dashmap::DashMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use ts_rs::TS;
use utils::ids::new_id;

use crate::services::readiness::{self, ReadinessConfig};
use sandbox::{SandboxError, Sandboxes};

const STATUS_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    Sse,
    Stdio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum McpServerStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct McpServerConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub transport: McpTransport,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: Vec<KeyValuePair>,
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct McpServerState {
    #[serde(flatten)]
    pub config: McpServerConfig,
    pub status: McpServerStatus,
    pub error_message: Option<String>,
    pub sandbox_url: Option<String>,
}

/// What the chat layer needs to talk to a running server: every entry is an
/// SSE endpoint, with stdio servers represented by their sandbox bridge.
#[derive(Debug, Clone, Serialize, TS)]
pub struct McpServerApi {
    pub url: String,
    pub headers: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct McpStatusEvent {
    pub server_id: String,
    pub status: McpServerStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Error)]
pub enum McpError {
    #[error("MCP server `{0}` not found")]
    ServerNotFound(String),
    #[error("MCP server `{0}` has no command configured")]
    MissingCommand(String),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

fn default_gateway_server() -> McpServerConfig {
    McpServerConfig {
        id: new_id(),
        name: "Docker MCP Gateway".to_string(),
        url: "http://mcp-gateway:9011/sse".to_string(),
        transport: McpTransport::Sse,
        command: None,
        args: Vec::new(),
        env: Vec::new(),
        headers: Vec::new(),
        description: Some("Connect to the Docker MCP Catalog".to_string()),
    }
}

/// In-process registry of MCP server descriptors and their lifecycle.
/// Nothing here is persisted: the registry is rebuilt from the default
/// gateway entry on every process start. Status changes are published on a
/// broadcast channel for anyone who wants to follow along.
pub struct McpManager {
    servers: DashMap<String, McpServerState>,
    selected: RwLock<Vec<String>>,
    sandboxes: Sandboxes,
    events: broadcast::Sender<McpStatusEvent>,
    http: Client,
    readiness: ReadinessConfig,
}

impl McpManager {
    pub fn new(http: Client, readiness: ReadinessConfig) -> Self {
        let (events, _) = broadcast::channel(STATUS_EVENT_CAPACITY);
        let default = default_gateway_server();
        let selected = RwLock::new(vec![default.id.clone()]);

        let servers = DashMap::new();
        servers.insert(
            default.id.clone(),
            McpServerState {
                config: default,
                status: McpServerStatus::Connected,
                error_message: None,
                sandbox_url: None,
            },
        );

        Self {
            servers,
            selected,
            sandboxes: Sandboxes::new(),
            events,
            http,
            readiness,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<McpStatusEvent> {
        self.events.subscribe()
    }

    pub fn list(&self) -> Vec<McpServerState> {
        self.servers.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<McpServerState> {
        self.servers.get(id).map(|entry| entry.value().clone())
    }

    /// Adds a server or replaces its configuration, keeping any live
    /// connection state for an existing id.
    pub fn upsert(&self, config: McpServerConfig) -> McpServerState {
        let state = match self.servers.get(&config.id) {
            Some(existing) => McpServerState {
                config,
                status: existing.status,
                error_message: existing.error_message.clone(),
                sandbox_url: existing.sandbox_url.clone(),
            },
            None => McpServerState {
                config,
                status: McpServerStatus::Disconnected,
                error_message: None,
                sandbox_url: None,
            },
        };
        self.servers.insert(state.config.id.clone(), state.clone());
        state
    }

    pub async fn remove(&self, id: &str) -> Result<(), McpError> {
        if self.servers.remove(id).is_none() {
            return Err(McpError::ServerNotFound(id.to_string()));
        }
        self.sandboxes.stop(id).await;
        self.selected.write().await.retain(|selected| selected != id);
        Ok(())
    }

    pub async fn set_selection(&self, server_ids: Vec<String>) {
        *self.selected.write().await = server_ids;
    }

    pub async fn selection(&self) -> Vec<String> {
        self.selected.read().await.clone()
    }

    fn update_status(&self, id: &str, status: McpServerStatus, error_message: Option<String>) {
        if let Some(mut entry) = self.servers.get_mut(id) {
            entry.status = status;
            entry.error_message = error_message.clone();
        }
        let _ = self.events.send(McpStatusEvent {
            server_id: id.to_string(),
            status,
            error_message,
        });
    }

    fn set_sandbox_url(&self, id: &str, sandbox_url: String) {
        if let Some(mut entry) = self.servers.get_mut(id) {
            entry.sandbox_url = Some(sandbox_url);
        }
    }

    /// Brings a server up and reports whether it answered its readiness
    /// probe. SSE servers are only probed; stdio servers get a sandbox
    /// launched for them first (reusing a previous sandbox when it still
    /// responds).
    pub async fn start_server(&self, id: &str) -> Result<bool, McpError> {
        let server = self.get(id).ok_or_else(|| McpError::ServerNotFound(id.to_string()))?;
        self.update_status(id, McpServerStatus::Connecting, None);

        match server.config.transport {
            McpTransport::Sse => {
                let ready =
                    readiness::wait_until_ready(&self.http, &server.config.url, &self.readiness)
                        .await;
                if ready {
                    self.update_status(id, McpServerStatus::Connected, None);
                } else {
                    self.update_status(
                        id,
                        McpServerStatus::Error,
                        Some("Could not connect to server".to_string()),
                    );
                }
                Ok(ready)
            }
            McpTransport::Stdio => {
                let Some(command) = server.config.command.clone() else {
                    self.update_status(
                        id,
                        McpServerStatus::Error,
                        Some("Server failed to start".to_string()),
                    );
                    return Err(McpError::MissingCommand(id.to_string()));
                };

                if let Some(sandbox_url) = &server.sandbox_url {
                    if self.sandboxes.is_running(id)
                        && readiness::wait_until_ready(&self.http, sandbox_url, &self.readiness)
                            .await
                    {
                        self.update_status(id, McpServerStatus::Connected, None);
                        return Ok(true);
                    }
                }

                let url = self
                    .sandboxes
                    .start(id, &command, &server.config.args, &server.config.env)
                    .await?;
                let ready = readiness::wait_until_ready(&self.http, &url, &self.readiness).await;
                if ready {
                    self.set_sandbox_url(id, url);
                    self.update_status(id, McpServerStatus::Connected, None);
                } else {
                    self.update_status(
                        id,
                        McpServerStatus::Error,
                        Some("Server failed to start".to_string()),
                    );
                    self.sandboxes.stop(id).await;
                }
                Ok(ready)
            }
        }
    }

    pub async fn stop_server(&self, id: &str) -> Result<(), McpError> {
        if !self.servers.contains_key(id) {
            return Err(McpError::ServerNotFound(id.to_string()));
        }
        self.sandboxes.stop(id).await;
        self.update_status(id, McpServerStatus::Disconnected, None);
        Ok(())
    }

    /// Selected servers that are currently connected, in API form. Stdio
    /// servers are exposed through their sandbox URL.
    pub async fn active_servers_for_api(&self) -> Vec<McpServerApi> {
        let selected = self.selected.read().await;
        selected
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|server| server.status == McpServerStatus::Connected)
            .map(|server| {
                let url = match (&server.config.transport, &server.sandbox_url) {
                    (McpTransport::Stdio, Some(sandbox_url)) => sandbox_url.clone(),
                    _ => server.config.url.clone(),
                };
                McpServerApi {
                    url,
                    headers: server.config.headers.clone(),
                }
            })
            .collect()
    }
}
