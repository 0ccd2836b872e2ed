use crate::{
    config::Config,
    posts,
    rpc::HiveClient,
    types::{AppEvent, FetchRequest},
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Serve fetch requests until the request channel closes.
///
/// One request, one RPC call, one event back. Nothing polls or refreshes in
/// the background; the UI asks again when the user does.
pub async fn run(
    cfg: Config,
    mut req_rx: UnboundedReceiver<FetchRequest>,
    tx: UnboundedSender<AppEvent>,
) {
    let client = HiveClient::new(cfg.api_url.clone(), cfg.rpc_timeout_ms);
    log::info!("🚀 fetch task started - endpoint: {}", client.base_url());

    while let Some(req) = req_rx.recv().await {
        match req {
            FetchRequest::Posts => {
                log::debug!("📡 fetching post list for @{}", cfg.account);
                let res =
                    posts::fetch_posts(&client, &cfg.account, cfg.limit, &cfg.viewer_url).await;
                if let Err(e) = &res {
                    log::warn!("⚠️ post list fetch failed: {e}");
                }
                let _ = tx.send(AppEvent::PostList(res));
            }
            FetchRequest::Post { author, permlink } => {
                log::debug!("📡 fetching post @{author}/{permlink}");
                let res = posts::fetch_post(&client, &author, &permlink).await;
                if let Err(e) = &res {
                    log::warn!("⚠️ post fetch failed: {e}");
                }
                let _ = tx.send(AppEvent::PostBody(Box::new(res)));
            }
        }
    }

    log::info!("👋 fetch task ended");
}
