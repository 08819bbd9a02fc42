//! Preview server subprocess lifecycle.
//!
//! The server is spawned in its own process group so that shutdown reaches
//! any grandchildren a wrapper script starts. [`PreviewServer::shutdown`] is
//! the normal release path; dropping the handle kills the process tree as a
//! backstop when a run panics or is cancelled.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep, timeout};

pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a SIGTERM'd server gets before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Command line that starts a preview server, and where it will listen.
#[derive(Debug, Clone)]
pub struct ServerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub origin: String,
}

impl ServerCommand {
    /// This binary's own `serve` subcommand over a built site.
    pub fn self_serve(port: u16, static_dir: &Path, manifest: &Path) -> Result<Self> {
        let exe = std::env::current_exe().context("Could not locate the current executable")?;
        let bind = format!("127.0.0.1:{}", port);

        Ok(Self {
            program: exe.into_os_string(),
            args: vec![
                "serve".into(),
                "--bind".into(),
                bind.into(),
                "--static-dir".into(),
                static_dir.as_os_str().to_owned(),
                "--manifest".into(),
                manifest.as_os_str().to_owned(),
            ],
            origin: format!("http://127.0.0.1:{}", port),
        })
    }

    /// An arbitrary external command (e.g. a frontend toolchain's preview).
    pub fn external(program: impl Into<OsString>, args: Vec<OsString>, port: u16) -> Self {
        Self {
            program: program.into(),
            args,
            origin: format!("http://127.0.0.1:{}", port),
        }
    }
}

pub struct PreviewServer {
    child: Child,
    origin: String,
}

impl PreviewServer {
    pub fn spawn(command: &ServerCommand) -> Result<Self> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().with_context(|| {
            format!(
                "Failed to start preview server: {}",
                command.program.to_string_lossy()
            )
        })?;

        tracing::info!(
            pid = child.id(),
            origin = %command.origin,
            "preview server spawned"
        );

        Ok(Self {
            child,
            origin: command.origin.clone(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Poll the server root until it answers, the process exits, or
    /// `limit` elapses. Any HTTP response counts as ready.
    pub async fn wait_until_ready(
        &mut self,
        client: &reqwest::Client,
        interval: Duration,
        limit: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + limit;
        let root = format!("{}/", self.origin);

        loop {
            if let Some(status) = self.child.try_wait()? {
                anyhow::bail!("Preview server exited before becoming ready ({})", status);
            }

            if answers(client, &root).await {
                tracing::info!(origin = %self.origin, "preview server ready");
                return Ok(());
            }

            if Instant::now() >= deadline {
                anyhow::bail!(
                    "Preview server at {} not reachable after {}s",
                    self.origin,
                    limit.as_secs()
                );
            }

            sleep(interval).await;
        }
    }

    /// Stop the server: SIGTERM to the process group, then a forced kill
    /// after a grace period. On Windows the process tree is killed outright.
    pub async fn shutdown(mut self) -> Result<()> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            signal_process_group(pid, "TERM");
            match timeout(SHUTDOWN_GRACE, self.child.wait()).await {
                Ok(status) => {
                    let status = status?;
                    tracing::info!(pid, %status, "preview server stopped");
                    return Ok(());
                }
                Err(_) => {
                    tracing::warn!(pid, "preview server ignored SIGTERM, killing");
                    signal_process_group(pid, "KILL");
                }
            }
        }

        #[cfg(windows)]
        kill_process_tree(pid).await;

        let _ = self.child.kill().await;
        tracing::info!(pid, "preview server killed");
        Ok(())
    }
}

impl Drop for PreviewServer {
    fn drop(&mut self) {
        // Only set while the child has not been reaped
        if let Some(pid) = self.child.id() {
            tracing::warn!(pid, "preview server dropped while running, killing");
            #[cfg(unix)]
            signal_process_group(pid, "KILL");
            let _ = self.child.start_kill();
        }
    }
}

async fn answers(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(url, error = %e, "preview server not reachable yet");
            false
        }
    }
}

#[cfg(unix)]
fn signal_process_group(pid: u32, signal: &str) {
    let result = std::process::Command::new("kill")
        .arg(format!("-{}", signal))
        .arg("--")
        .arg(format!("-{}", pid))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    if let Err(e) = result {
        tracing::warn!(pid, signal, error = %e, "failed to signal preview server");
    }
}

#[cfg(windows)]
async fn kill_process_tree(pid: u32) {
    let result = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Err(e) = result {
        tracing::warn!(pid, error = %e, "taskkill failed");
    }
}
