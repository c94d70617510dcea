use tokio::signal;

/// A termination signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Hangup,
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    fn number(self) -> u8 {
        match self {
            ShutdownSignal::Hangup => 1,
            ShutdownSignal::Interrupt => 2,
            ShutdownSignal::Terminate => 15,
        }
    }

    /// Process exit status for a shutdown caused by this signal, following the shell's
    /// `128 + n` convention.
    pub fn exit_code(self) -> u8 {
        128 + self.number()
    }
}

/// Resolves once SIGINT, SIGTERM or SIGHUP is received.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal() -> ShutdownSignal {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = wait_for_unix_signal(signal::unix::SignalKind::terminate());
    #[cfg(unix)]
    let hangup = wait_for_unix_signal(signal::unix::SignalKind::hangup());

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    #[cfg(not(unix))]
    let hangup = std::future::pending::<()>();

    let received = tokio::select! {
        () = interrupt => ShutdownSignal::Interrupt,
        () = terminate => ShutdownSignal::Terminate,
        () = hangup => ShutdownSignal::Hangup,
    };
    tracing::info!("Received {:?} signal, shutting down", received);
    received
}

#[cfg(unix)]
async fn wait_for_unix_signal(kind: signal::unix::SignalKind) {
    match signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!("Failed to install signal handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
