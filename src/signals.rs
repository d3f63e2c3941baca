use std::io;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::{error, info};

fn listeners() -> io::Result<[Signal; 4]> {
    Ok([
        signal(SignalKind::interrupt())?,
        signal(SignalKind::terminate())?,
        signal(SignalKind::hangup())?,
        signal(SignalKind::quit())?,
    ])
}

/// Resolves when the process is asked to stop
pub async fn shutdown_signal() {
    let [mut int, mut term, mut hup, mut quit] = match listeners() {
        Ok(l) => l,
        Err(err) => {
            // without handlers we'll just run until killed
            error!(%err, "Failed to install signal handlers");
            return std::future::pending().await;
        }
    };

    let name = tokio::select! {
        _ = int.recv() => "SIGINT",
        _ = term.recv() => "SIGTERM",
        _ = hup.recv() => "SIGHUP",
        _ = quit.recv() => "SIGQUIT",
    };
    info!(signal = name, "Shutting down");
}
