//! Write-through and race-guarded loading against the remote cache

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::cache::BoxCache;
use crate::domain::PageBox;
use crate::session::messages::Msg;

/// Bridge between the box store and the remote cache
///
/// Writes carry the full current list and are not ordered relative to one
/// another, so the last completion wins remotely. That is acceptable only
/// because writes happen at gesture commit, never mid-drag; with concurrent
/// editors a sequence-number guard would be required.
pub struct CacheBridge {
    cache: Arc<dyn BoxCache>,
    tx: UnboundedSender<Msg>,
    loading_delay: Duration,
}

impl CacheBridge {
    pub fn new(cache: Arc<dyn BoxCache>, tx: UnboundedSender<Msg>, loading_delay: Duration) -> Self {
        Self {
            cache,
            tx,
            loading_delay,
        }
    }

    /// Fire-and-forget write of the full box list
    ///
    /// Failures are logged and swallowed; the store stays authoritative
    /// locally and nothing retries.
    pub fn persist(&self, server_id: &str, boxes: &[PageBox]) {
        let fut = self.cache.set(server_id, boxes.to_vec(), None);
        let server_id = server_id.to_string();
        tokio::spawn(async move {
            if let Err(err) = fut.await {
                log::warn!("box cache write failed for {server_id}: {err:#}");
            }
        });
    }

    /// Start an asynchronous load carrying a generation token
    ///
    /// The completion comes back as `CacheMsg::Loaded`; a delayed
    /// `CacheMsg::LoadingDelayElapsed` lets the session surface a loading
    /// indicator only when the fetch is actually slow.
    pub fn load(&self, server_id: &str, file_id: String, generation: u64) {
        let fut = self.cache.get(server_id);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut
                .await
                .map(|data| data.boxes)
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(Msg::cache_loaded(file_id, generation, result));
        });

        let tx = self.tx.clone();
        let delay = self.loading_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Msg::loading_delay_elapsed(generation));
        });
    }
}
