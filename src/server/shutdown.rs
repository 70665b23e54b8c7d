use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Why the server stopped accepting connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    /// The fitness credential could not be refreshed.
    CredentialLost,
}

impl ShutdownReason {
    /// Process exit status once the server has drained.
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownReason::Interrupt | ShutdownReason::Terminate => 0,
            ShutdownReason::CredentialLost => 1,
        }
    }
}

/// Resolves on Ctrl+C, SIGTERM, or a notification on `fatal`.
pub async fn shutdown_signal(fatal: Option<Arc<Notify>>) -> ShutdownReason {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let credential_lost = async {
        match fatal {
            Some(notify) => notify.notified().await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c => {
            info!("Ctrl+C received, shutting down");
            ShutdownReason::Interrupt
        }
        () = terminate => {
            info!("SIGTERM received, shutting down");
            ShutdownReason::Terminate
        }
        () = credential_lost => {
            error!("fitness credential could not be refreshed, shutting down");
            ShutdownReason::CredentialLost
        }
    }
}
