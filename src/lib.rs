//! Interactive box-annotation engine for paginated raster images
//!
//! pagebox keeps the authoritative, ordered box list for the active page,
//! runs the pointer gesture state machine (draw, resize, move,
//! rectangle-select), and writes every committed mutation through to a
//! remote per-file cache with a generation guard against rapid page
//! switches. The hosting UI maps pointer positions to overlay coordinates,
//! routes hit targets, renders from the engine's state, and feeds cache
//! completions back into [`Engine::update`].

pub mod cache;
pub mod config;
pub mod core;
pub mod domain;
pub mod gestures;
pub mod session;
pub mod store;

pub use cache::{BoxCache, CacheBridge, CachedBoxes, JsonFileCache, MemoryCache};
pub use config::EngineConfig;
pub use crate::core::engine::Engine;
pub use domain::{
    BoxCandidate, BoxType, Corner, DropTarget, GeometryPatch, Modifiers, NormRect, OverlayBounds,
    PageBox, Point, Tool, overlay_point,
};
pub use session::messages::{BoxMsg, CacheMsg, GestureMsg, Msg, PageMsg};
pub use session::state::{Gesture, PageFile, PageState, Session};
pub use store::ordering::ReorderError;
