//! Cancellation and shutdown, grounded in the teacher's
//! `ShutdownController` (`autopilot/src/shutdown_controller.rs`): listens
//! for SIGINT/SIGTERM and exposes both a non-blocking check and an
//! awaitable the core event loop selects on.

pub struct ShutdownController {
    shutdown: tokio::sync::oneshot::Receiver<()>,
}

pub struct ShutdownSignal(tokio::sync::oneshot::Sender<()>);

impl ShutdownController {
    /// Reacts to SIGINT/SIGTERM from the OS.
    pub fn new_shutdown_on_signal() -> Self {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        tokio::spawn(Self::wait_for_signal(ShutdownSignal(sender)));
        Self { shutdown: receiver }
    }

    /// A manually-triggered variant, for tests.
    pub fn new_manual_shutdown() -> (ShutdownSignal, Self) {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        (ShutdownSignal(sender), Self { shutdown: receiver })
    }

    async fn wait_for_signal(shutdown: ShutdownSignal) {
        #[cfg(unix)]
        {
            use tokio::signal::{self, unix};
            let mut sigterm = unix::signal(unix::SignalKind::terminate()).expect("install SIGTERM handler");
            tokio::select! {
                _ = signal::ctrl_c() => tracing::info!("received SIGINT"),
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.expect("install CTRL+C handler");
            tracing::info!("received SIGINT");
        }
        let _ = shutdown.0.send(());
    }

    /// Non-blocking check, idempotent across calls after the signal fires.
    pub fn should_shutdown(&mut self) -> bool {
        matches!(self.shutdown.try_recv(), Ok(()) | Err(tokio::sync::oneshot::error::TryRecvError::Closed))
    }

    /// Resolves once, the first time a shutdown signal arrives. The core
    /// event loop selects on this and exits its `select!` on resolution.
    pub async fn wait(&mut self) {
        let _ = (&mut self.shutdown).await;
    }
}

impl ShutdownSignal {
    pub fn shutdown(self) {
        let _ = self.0.send(());
    }
}
