// pool.rs: Poll loop producing one bar response per cache interval

use crate::formatter::MetadataFormatter;
use crate::mpris::PlayerBus;
use crate::state::Response;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Polls the player until shutdown, sending each response to `update_tx`.
///
/// Sleeps `cache_timeout` between polls. Returns when `shutdown_rx` fires or
/// closes, or when the receiving side of `update_tx` is dropped.
pub async fn listen<B: PlayerBus>(
    update_tx: mpsc::Sender<Response>,
    formatter: Arc<MetadataFormatter>,
    bus: B,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    loop {
        let response = formatter.response(&bus).await;
        if update_tx.send(response).await.is_err() {
            tracing::debug!("Response receiver dropped, stopping poll loop");
            break;
        }
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(formatter.cache_timeout) => {}
        }
    }
}
