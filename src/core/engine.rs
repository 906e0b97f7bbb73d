//! Engine assembly
//!
//! The engine owns the session, dispatches messages to the gesture and box
//! store handlers, swaps page contexts, and drives the cache bridge. Handlers
//! are pure state transitions returning a dirty flag; only the engine talks
//! to the bridge, so gesture and ordering logic stays runtime-free.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::cache::{BoxCache, CacheBridge};
use crate::config::EngineConfig;
use crate::domain::{BoxCandidate, NormRect, PageBox, Tool};
use crate::gestures::handlers::handle_gesture_msg;
use crate::session::messages::{CacheMsg, Msg, PageMsg};
use crate::session::state::{Gesture, PageFile, PageState, PendingLoad, Session};
use crate::store::handlers::handle_box_msg;
use crate::store::ordering::{ReorderError, normalize_boxes, normalize_candidates};

/// Interactive box-annotation engine for one active page at a time
pub struct Engine {
    config: EngineConfig,
    session: Session,
    bridge: CacheBridge,
}

impl Engine {
    /// Build an engine over a cache; completions arrive on `tx` and must be
    /// fed back into [`Engine::update`]
    pub fn new(config: EngineConfig, cache: Arc<dyn BoxCache>, tx: UnboundedSender<Msg>) -> Self {
        let bridge = CacheBridge::new(cache, tx, Duration::from_millis(config.loading_delay_ms));
        let mut session = Session::new();
        session.draw_type = config.default_draw_type;
        Self {
            config,
            session,
            bridge,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page(&self) -> Option<&PageState> {
        self.session.page.as_ref()
    }

    /// Order-sorted box list of the active page
    pub fn boxes(&self) -> &[PageBox] {
        self.session.boxes()
    }

    pub fn selected(&self) -> &[String] {
        self.session.selected()
    }

    pub fn editing(&self) -> Option<&str> {
        self.session
            .page
            .as_ref()
            .and_then(|p| p.editing.as_deref())
    }

    /// Draft rectangle of an in-progress draw or rectangle-select
    pub fn draft(&self) -> Option<NormRect> {
        self.session.page.as_ref().and_then(|p| p.gesture.draft())
    }

    pub fn is_loading(&self) -> bool {
        self.session.page.as_ref().is_some_and(|p| p.loading)
    }

    pub fn tool(&self) -> Tool {
        self.session.tool
    }

    /// Apply one message
    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Gesture(m) => {
                if handle_gesture_msg(&mut self.session, &self.config, m) {
                    self.write_through();
                }
            }
            Msg::Boxes(m) => {
                if handle_box_msg(&mut self.session, m) {
                    self.write_through();
                }
            }
            Msg::Page(m) => self.handle_page_msg(m),
            Msg::Cache(m) => self.handle_cache_msg(m),
        }
    }

    /// Reorder from free text, reporting the validation outcome directly
    pub fn reorder_by_list(&mut self, input: &str) -> Result<(), ReorderError> {
        if self.session.page.is_none() {
            return Err(ReorderError::EmptyPage);
        }
        self.update(Msg::reorder_list(input));
        match self
            .session
            .page
            .as_ref()
            .and_then(|p| p.order_error.clone())
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Keep the saved map current and write the page through to the cache
    fn write_through(&mut self) {
        let Some(page) = self.session.page.as_ref() else {
            return;
        };
        self.session
            .saved
            .insert(page.file.id.clone(), page.boxes.clone());
        if let Some(server_id) = page.file.server_id.as_deref() {
            self.bridge.persist(server_id, &page.boxes);
        }
    }

    fn handle_page_msg(&mut self, msg: PageMsg) {
        match msg {
            PageMsg::Activate(file) => self.activate(file),
            PageMsg::Deactivate => {
                // Supersede any pending load along with the page context.
                self.session.load_generation += 1;
                self.session.pending_load = None;
                self.session.page = None;
            }
            PageMsg::SetTool(tool) => {
                self.session.tool = tool;
                // A tool switch abandons the gesture and its draft.
                if let Some(page) = self.session.page.as_mut() {
                    page.gesture = Gesture::Idle;
                }
            }
            PageMsg::ToggleDrawType => {
                self.session.draw_type = self.session.draw_type.cycle();
            }
            PageMsg::Detections {
                file_id,
                candidates,
            } => self.ingest_detections(file_id, candidates),
        }
    }

    /// Swap in a fresh page context for `file`
    ///
    /// Locally held boxes win without a network call; otherwise a load is
    /// issued under a fresh generation token. Any gesture in progress on the
    /// page being left is dropped with the old context.
    fn activate(&mut self, file: PageFile) {
        self.session.load_generation += 1;
        self.session.pending_load = None;

        let mut page = PageState::new(file);
        if let Some(saved) = self.session.saved.get(&page.file.id)
            && !saved.is_empty()
        {
            page.boxes = normalize_boxes(saved.clone());
            self.session.page = Some(page);
            return;
        }

        let Some(server_id) = page.file.server_id.clone() else {
            self.session.page = Some(page);
            return;
        };

        let generation = self.session.load_generation;
        self.session.pending_load = Some(PendingLoad {
            file_id: page.file.id.clone(),
            generation,
        });
        let file_id = page.file.id.clone();
        self.session.page = Some(page);
        self.bridge.load(&server_id, file_id, generation);
    }

    fn handle_cache_msg(&mut self, msg: CacheMsg) {
        match msg {
            CacheMsg::Loaded {
                file_id,
                generation,
                result,
            } => {
                let current = self
                    .session
                    .pending_load
                    .as_ref()
                    .is_some_and(|p| p.generation == generation);
                if !current {
                    // Expected supersession from rapid page switching.
                    log::debug!("discarding superseded box load for {file_id}");
                    return;
                }
                self.session.pending_load = None;
                let Some(page) = self.session.page.as_mut() else {
                    return;
                };
                page.loading = false;
                match result {
                    Ok(candidates) => {
                        let boxes = normalize_candidates(candidates);
                        page.boxes = boxes.clone();
                        page.clear_selection();
                        self.session.saved.insert(file_id, boxes);
                    }
                    Err(err) => {
                        log::warn!("box load failed for {file_id}: {err}");
                        page.boxes.clear();
                        page.clear_selection();
                    }
                }
            }
            CacheMsg::LoadingDelayElapsed { generation } => {
                let still_pending = self
                    .session
                    .pending_load
                    .as_ref()
                    .is_some_and(|p| p.generation == generation);
                if still_pending && let Some(page) = self.session.page.as_mut() {
                    page.loading = true;
                }
            }
        }
    }

    /// Ingest detector candidates for a file, replacing its box list
    ///
    /// Candidates carry no order and are put into reading order. Detector
    /// results are never auto-selected, and ingestion itself does not write
    /// through: the detection collaborator caches its own output.
    fn ingest_detections(&mut self, file_id: String, mut candidates: Vec<BoxCandidate>) {
        if candidates.len() > self.config.max_boxes {
            log::debug!(
                "capping {} detector candidates to {} for {file_id}",
                candidates.len(),
                self.config.max_boxes
            );
            candidates.truncate(self.config.max_boxes);
        }
        let boxes = normalize_candidates(candidates);
        self.session.saved.insert(file_id.clone(), boxes.clone());
        if let Some(page) = self.session.page.as_mut()
            && page.file.id == file_id
        {
            page.boxes = boxes;
            page.clear_selection();
        }
    }
}
