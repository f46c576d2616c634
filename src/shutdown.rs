use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Cancel `token` on the first SIGTERM or SIGINT.
///
/// The engine observes the token between service steps, so the step in
/// progress finishes before the run returns. If the handlers cannot be
/// installed the run simply stays uncancellable.
pub fn install_cancel_handler(token: CancellationToken) {
    tokio::spawn(async move {
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, cancelling simulation");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, cancelling simulation");
            }
            _ = token.cancelled() => return,
        }

        token.cancel();
    });
}
