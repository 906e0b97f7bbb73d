//! JSON-file-per-page box cache
//!
//! Each file's boxes live in `boxes-<file id>.json` under the cache
//! directory, with the write timestamp recorded alongside.

use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde_json::Value;

use super::{BoxCache, CachedBoxes};
use crate::domain::PageBox;

/// File-backed `BoxCache` implementation
#[derive(Clone, Debug)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Create the cache rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating box cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, file_id: &str) -> PathBuf {
        // Ids are opaque strings; keep the file name filesystem-safe.
        let safe: String = file_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("boxes-{safe}.json"))
    }
}

impl BoxCache for JsonFileCache {
    fn get(&self, file_id: &str) -> BoxFuture<'static, Result<CachedBoxes>> {
        let path = self.path_for(file_id);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || -> Result<CachedBoxes> {
                if !path.exists() {
                    return Ok(CachedBoxes::default());
                }
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
            })
            .await
            .context("box cache read task failed")?
        })
    }

    fn set(
        &self,
        file_id: &str,
        boxes: Vec<PageBox>,
        meta: Option<Value>,
    ) -> BoxFuture<'static, Result<()>> {
        let path = self.path_for(file_id);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || -> Result<()> {
                let payload = CachedBoxes::from_boxes(boxes, meta);
                let raw = serde_json::to_string_pretty(&payload)?;
                std::fs::write(&path, raw).with_context(|| format!("writing {}", path.display()))
            })
            .await
            .context("box cache write task failed")?
        })
    }
}
