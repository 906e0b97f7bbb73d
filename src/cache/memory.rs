//! In-memory box cache
//!
//! Backs tests and offline sessions. Reads can be given artificial per-file
//! delays to exercise load races.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::Value;

use super::{BoxCache, CachedBoxes};
use crate::domain::PageBox;

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<String, CachedBoxes>>,
    delays: Mutex<HashMap<String, Duration>>,
}

/// In-memory `BoxCache` implementation
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Inner>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry directly, bypassing the async write path
    pub fn insert(&self, file_id: &str, entry: CachedBoxes) {
        if let Ok(mut entries) = self.inner.entries.lock() {
            entries.insert(file_id.to_string(), entry);
        }
    }

    /// Delay subsequent reads of a file, for exercising load races
    pub fn set_read_delay(&self, file_id: &str, delay: Duration) {
        if let Ok(mut delays) = self.inner.delays.lock() {
            delays.insert(file_id.to_string(), delay);
        }
    }

    /// Snapshot an entry, if present
    pub fn entry(&self, file_id: &str) -> Option<CachedBoxes> {
        self.inner
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(file_id).cloned())
    }
}

impl BoxCache for MemoryCache {
    fn get(&self, file_id: &str) -> BoxFuture<'static, Result<CachedBoxes>> {
        let inner = self.inner.clone();
        let file_id = file_id.to_string();
        Box::pin(async move {
            let delay = inner
                .delays
                .lock()
                .ok()
                .and_then(|delays| delays.get(&file_id).copied());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let entry = inner
                .entries
                .lock()
                .ok()
                .and_then(|entries| entries.get(&file_id).cloned());
            Ok(entry.unwrap_or_default())
        })
    }

    fn set(
        &self,
        file_id: &str,
        boxes: Vec<PageBox>,
        meta: Option<Value>,
    ) -> BoxFuture<'static, Result<()>> {
        let inner = self.inner.clone();
        let file_id = file_id.to_string();
        Box::pin(async move {
            if let Ok(mut entries) = inner.entries.lock() {
                entries.insert(file_id, CachedBoxes::from_boxes(boxes, meta));
            }
            Ok(())
        })
    }
}
