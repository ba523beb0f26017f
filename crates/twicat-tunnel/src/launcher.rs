//! Tunnel daemon subprocess
//!
//! Spawns `<binary> http <port>` and installs an interrupt watcher that
//! kills the subprocess before the run is torn down.

use std::future::Future;
use std::io;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use twicat_core::RunContext;

use crate::error::{Result, TunnelError};

/// Starts the tunnel daemon for a local port
#[derive(Debug, Clone)]
pub struct TunnelLauncher {
    binary: String,
}

impl TunnelLauncher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Build `<binary> http <port>` with stdio detached from the terminal
    fn command(&self, port: u16) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("http")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Start the tunnel for `port`.
    ///
    /// On SIGINT or SIGTERM the subprocess is killed and `ctx` is cancelled.
    /// If the kill fails the process aborts rather than leave the tunnel
    /// running.
    pub fn launch(&self, port: u16, ctx: RunContext) -> Result<TunnelHandle> {
        let launch_err = |source| TunnelError::Launch {
            binary: self.binary.clone(),
            source,
        };

        let signal = shutdown_signal().map_err(launch_err)?;
        let child = self.command(port).spawn().map_err(launch_err)?;

        let pid = child.id();
        info!(pid, port, "Started {} http {}", self.binary, port);

        let child = Arc::new(Mutex::new(child));
        let watcher = tokio::spawn(stop_on(signal, Arc::clone(&child), ctx));

        Ok(TunnelHandle {
            child,
            pid,
            watcher,
        })
    }
}

/// Running tunnel subprocess
#[derive(Debug)]
pub struct TunnelHandle {
    child: Arc<Mutex<Child>>,
    pid: Option<u32>,
    watcher: JoinHandle<()>,
}

impl TunnelHandle {
    /// Kill the subprocess and stop watching for interrupts
    pub async fn shutdown(&self) -> Result<()> {
        self.watcher.abort();
        kill(&self.child).await.map_err(TunnelError::Kill)?;
        debug!(pid = self.pid, "Tunnel stopped");
        Ok(())
    }
}

/// Kill the child unless it already exited, and reap it
async fn kill(child: &Mutex<Child>) -> io::Result<()> {
    let mut child = child.lock().await;
    if child.try_wait()?.is_some() {
        return Ok(());
    }
    child.kill().await
}

/// Wait for `trigger`, then kill the child and cancel the run
async fn stop_on<F>(trigger: F, child: Arc<Mutex<Child>>, ctx: RunContext)
where
    F: Future<Output = io::Result<&'static str>>,
{
    tokio::select! {
        received = trigger => match received {
            Ok(name) => info!("Received {}, stopping tunnel", name),
            Err(e) => {
                error!("Interrupt watcher failed: {}", e);
                return;
            }
        },
        // Someone else is tearing the run down and owns the kill
        _ = ctx.cancelled() => return,
    }

    if let Err(e) = kill(&child).await {
        error!("Unable to kill tunnel: {}", e);
        std::process::abort();
    }
    ctx.shutdown();
}

/// Resolves with the signal name on SIGINT or SIGTERM.
///
/// Handlers are registered before returning so a registration failure is
/// reported at launch time.
#[cfg(unix)]
fn shutdown_signal() -> io::Result<impl Future<Output = io::Result<&'static str>>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => Ok("interrupt"),
            _ = terminate.recv() => Ok("terminate"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> io::Result<impl Future<Output = io::Result<&'static str>>> {
    Ok(async { tokio::signal::ctrl_c().await.map(|_| "interrupt") })
}
