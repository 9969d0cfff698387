//! SIGINT/SIGTERM handling.
//!
//! Signal listeners are registered before `install_signal_handler` returns,
//! so a signal raised afterwards is never handled by the default action. A
//! dedicated thread then drives a single-threaded tokio runtime until the
//! first signal arrives and cancels the shared token. The thread is
//! detached; nothing waits for it.

use crate::utils::cancel::CancelToken;
use anyhow::{Context, Result};
use log::info;
use std::thread;

/// Cancel `token` when the process receives SIGINT or SIGTERM
///
/// **Public** - called once from main.rs
pub fn install_signal_handler(token: CancelToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    let listener = {
        let _guard = runtime.enter();
        ShutdownListener::register().context("Failed to register signal handlers")?
    };

    thread::Builder::new()
        .name("signal-listener".to_string())
        .spawn(move || {
            let signal = runtime.block_on(listener.recv());
            info!("{} received, cancelling", signal);
            token.cancel();
        })
        .context("Failed to spawn signal listener")?;

    Ok(())
}

#[cfg(unix)]
struct ShutdownListener {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownListener {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownListener {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownListener {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "Ctrl-C"
    }
}
