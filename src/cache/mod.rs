//! Remote box cache interface
//!
//! This module provides:
//! - The `BoxCache` trait and its wire types
//! - The bridge running fire-and-forget writes and race-guarded loads
//! - In-memory and JSON-file cache implementations

pub mod bridge;
pub mod file;
pub mod memory;

use anyhow::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{BoxCandidate, PageBox};

pub use bridge::CacheBridge;
pub use file::JsonFileCache;
pub use memory::MemoryCache;

/// Payload held per file in the cache
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedBoxes {
    #[serde(default)]
    pub boxes: Vec<BoxCandidate>,
    /// Opaque metadata stored alongside the boxes
    #[serde(default)]
    pub meta: Option<Value>,
    /// When the entry was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl CachedBoxes {
    pub fn from_boxes(boxes: Vec<PageBox>, meta: Option<Value>) -> Self {
        Self {
            boxes: boxes.into_iter().map(Into::into).collect(),
            meta,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Keyed store holding persisted box lists per uploaded file
///
/// Implementations must not block: both operations run on spawned tasks and
/// their completions are delivered back to the session as messages.
pub trait BoxCache: Send + Sync {
    /// Fetch the cached box list for a file; an unknown file yields an empty
    /// payload rather than an error
    fn get(&self, file_id: &str) -> BoxFuture<'static, Result<CachedBoxes>>;

    /// Replace the cached box list for a file
    fn set(
        &self,
        file_id: &str,
        boxes: Vec<PageBox>,
        meta: Option<Value>,
    ) -> BoxFuture<'static, Result<()>>;
}
