//! Message types for the annotation session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Convenience constructors for common messages

use crate::domain::{BoxCandidate, Corner, DropTarget, GeometryPatch, Modifiers, Point, Tool};
use crate::session::state::PageFile;

// ============================================================================
// Gesture Types
// ============================================================================

/// Pointer-driven gesture messages
///
/// The hosting UI resolves hit targets (empty overlay, box body, corner
/// handle) and maps pointer positions to overlay coordinates before
/// dispatching. `Click` is sent only for clicks without a drag.
#[derive(Debug, Clone)]
pub enum GestureMsg {
    /// Pointer down on empty overlay space
    OverlayDown(Point),
    /// Pointer down on the body of a box
    BoxDown { id: String, pos: Point },
    /// Pointer down on a corner handle of the box in edit focus
    HandleDown {
        id: String,
        corner: Corner,
        pos: Point,
    },
    /// Plain click (no drag) on a box
    Click { id: String, modifiers: Modifiers },
    /// Pointer moved
    Moved(Point),
    /// Pointer released
    Released(Point),
}

// ============================================================================
// Box Store Types
// ============================================================================

/// Box store mutations
#[derive(Debug, Clone)]
pub enum BoxMsg {
    /// Merge a partial geometry update into one box
    Patch { id: String, patch: GeometryPatch },
    /// Cycle one box's category
    CycleType(String),
    /// Cycle the category of several boxes at once
    CycleTypes(Vec<String>),
    /// Delete boxes by id
    Delete(Vec<String>),
    /// Toggle a box's membership in the selection set
    ToggleSelected(String),
    /// Move a box next to another in the ordered sequence
    ReorderDrag { source: String, target: DropTarget },
    /// Reorder from a free-text list of 1-based positions
    ReorderList(String),
}

// ============================================================================
// Page Types
// ============================================================================

/// Page and tool messages
#[derive(Debug, Clone)]
pub enum PageMsg {
    /// Make a file's page the active editing context
    Activate(PageFile),
    /// Leave page context entirely (no active file)
    Deactivate,
    /// Switch the pointer tool
    SetTool(Tool),
    /// Flip the category applied to newly drawn boxes
    ToggleDrawType,
    /// Ingest detector candidates for a file
    Detections {
        file_id: String,
        candidates: Vec<BoxCandidate>,
    },
}

// ============================================================================
// Cache Types
// ============================================================================

/// Asynchronous cache completions
#[derive(Debug, Clone)]
pub enum CacheMsg {
    /// A load finished; applied only if `generation` is still current
    Loaded {
        file_id: String,
        generation: u64,
        result: Result<Vec<BoxCandidate>, String>,
    },
    /// The anti-flicker delay elapsed for a pending load
    LoadingDelayElapsed { generation: u64 },
}

// ============================================================================
// Main Message Enum
// ============================================================================

/// Messages for annotation session interactions
#[derive(Debug, Clone)]
pub enum Msg {
    /// Pointer gesture messages
    Gesture(GestureMsg),
    /// Box store mutations
    Boxes(BoxMsg),
    /// Page and tool messages
    Page(PageMsg),
    /// Asynchronous cache completions
    Cache(CacheMsg),
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Msg {
    // Gesture shortcuts
    pub fn overlay_down(pos: Point) -> Self {
        Self::Gesture(GestureMsg::OverlayDown(pos))
    }
    pub fn box_down(id: impl Into<String>, pos: Point) -> Self {
        Self::Gesture(GestureMsg::BoxDown { id: id.into(), pos })
    }
    pub fn handle_down(id: impl Into<String>, corner: Corner, pos: Point) -> Self {
        Self::Gesture(GestureMsg::HandleDown {
            id: id.into(),
            corner,
            pos,
        })
    }
    pub fn click(id: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Gesture(GestureMsg::Click {
            id: id.into(),
            modifiers,
        })
    }
    pub fn moved(pos: Point) -> Self {
        Self::Gesture(GestureMsg::Moved(pos))
    }
    pub fn released(pos: Point) -> Self {
        Self::Gesture(GestureMsg::Released(pos))
    }

    // Box store shortcuts
    pub fn patch_geometry(id: impl Into<String>, patch: GeometryPatch) -> Self {
        Self::Boxes(BoxMsg::Patch {
            id: id.into(),
            patch,
        })
    }
    pub fn cycle_type(id: impl Into<String>) -> Self {
        Self::Boxes(BoxMsg::CycleType(id.into()))
    }
    pub fn cycle_types(ids: Vec<String>) -> Self {
        Self::Boxes(BoxMsg::CycleTypes(ids))
    }
    pub fn delete(ids: Vec<String>) -> Self {
        Self::Boxes(BoxMsg::Delete(ids))
    }
    pub fn toggle_selected(id: impl Into<String>) -> Self {
        Self::Boxes(BoxMsg::ToggleSelected(id.into()))
    }
    pub fn reorder_drag(source: impl Into<String>, target: DropTarget) -> Self {
        Self::Boxes(BoxMsg::ReorderDrag {
            source: source.into(),
            target,
        })
    }
    pub fn reorder_list(input: impl Into<String>) -> Self {
        Self::Boxes(BoxMsg::ReorderList(input.into()))
    }

    // Page shortcuts
    pub fn activate(file: PageFile) -> Self {
        Self::Page(PageMsg::Activate(file))
    }
    pub fn deactivate() -> Self {
        Self::Page(PageMsg::Deactivate)
    }
    pub fn set_tool(tool: Tool) -> Self {
        Self::Page(PageMsg::SetTool(tool))
    }
    pub fn toggle_draw_type() -> Self {
        Self::Page(PageMsg::ToggleDrawType)
    }
    pub fn detections(file_id: impl Into<String>, candidates: Vec<BoxCandidate>) -> Self {
        Self::Page(PageMsg::Detections {
            file_id: file_id.into(),
            candidates,
        })
    }

    // Cache shortcuts
    pub fn cache_loaded(
        file_id: impl Into<String>,
        generation: u64,
        result: Result<Vec<BoxCandidate>, String>,
    ) -> Self {
        Self::Cache(CacheMsg::Loaded {
            file_id: file_id.into(),
            generation,
            result,
        })
    }
    pub fn loading_delay_elapsed(generation: u64) -> Self {
        Self::Cache(CacheMsg::LoadingDelayElapsed { generation })
    }
}
