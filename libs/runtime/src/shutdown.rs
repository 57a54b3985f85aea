use anyhow::Result;

/// Resolves once the process is asked to stop (SIGTERM / Ctrl+C on unix,
/// console control events on Windows).
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("shutdown: SIGTERM received"),
            _ = sigint.recv() => tracing::info!("shutdown: SIGINT received"),
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close, ctrl_shutdown};

        let mut c = ctrl_c()?;
        let mut br = ctrl_break()?;
        let mut cl = ctrl_close()?;
        let mut sh = ctrl_shutdown()?;
        tokio::select! {
            _ = c.recv() => {},
            _ = br.recv() => {},
            _ = cl.recv() => {},
            _ = sh.recv() => {},
        }
        tracing::info!("shutdown: console signal received");
        Ok(())
    }
}

/// Infallible variant for `axum::serve(..).with_graceful_shutdown`.
/// Falls back to plain Ctrl+C when signal handlers cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = wait_for_shutdown().await {
        tracing::warn!(error = %e, "shutdown: signal handler failed; falling back to ctrl_c()");
        let _ = tokio::signal::ctrl_c().await;
    }
}
