use dashmap::DashMap;
use thiserror::Error;
use tokio::process::{Child, Command};

use super::KeyValuePair;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("no free local port available")]
    NoFreePort,
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Child processes backing stdio MCP servers, keyed by server id. Each one
/// is launched on a fresh local port and exposed over an SSE bridge URL.
#[derive(Default)]
pub struct Sandboxes {
    children: DashMap<String, Child>,
}

impl Sandboxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches the server command and returns the URL its bridge will
    /// answer on. Any previous instance for the same id is killed first.
    pub async fn start(
        &self,
        id: &str,
        command: &str,
        args: &[String],
        env: &[KeyValuePair],
    ) -> Result<String, SandboxError> {
        self.stop(id).await;

        let port = portpicker::pick_unused_port().ok_or(SandboxError::NoFreePort)?;
        let mut cmd = Command::new(command);
        cmd.args(args)
            .env("PORT", port.to_string())
            .kill_on_drop(true);
        for pair in env {
            cmd.env(&pair.key, &pair.value);
        }

        let child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: command.to_string(),
            source,
        })?;
        tracing::info!("started sandbox {id} (pid {:?}) on port {port}", child.id());
        self.children.insert(id.to_string(), child);

        Ok(format!("http://127.0.0.1:{port}/sse"))
    }

    /// Kills the sandbox if one is running. Idempotent.
    pub async fn stop(&self, id: &str) {
        if let Some((_, mut child)) = self.children.remove(id) {
            if let Err(err) = child.kill().await {
                tracing::warn!("failed to kill sandbox {id}: {err}");
            }
        }
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }
}
