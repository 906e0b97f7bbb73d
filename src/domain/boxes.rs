//! Box annotation types
//!
//! Boxes store geometry in normalized page coordinates and carry an explicit
//! dense `order` that defines the render and export sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::geometry::{NormRect, clamp01};

/// Category of an annotated region
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxType {
    /// Text inside a speech bubble
    TextBubble,
    /// Free-standing text outside any bubble
    TextFree,
    /// Sound effects
    #[default]
    Sounds,
}

impl BoxType {
    /// Next category in the manual cycle
    ///
    /// Manual cycling is a fixed 2-cycle between bubble text and sounds.
    /// Free-standing text only enters through detection import and re-enters
    /// the cycle at `TextBubble`.
    pub fn cycle(self) -> Self {
        match self {
            BoxType::TextBubble => BoxType::Sounds,
            BoxType::Sounds => BoxType::TextBubble,
            BoxType::TextFree => BoxType::TextBubble,
        }
    }
}

static NEXT_BOX_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh opaque box id
///
/// Timestamp plus a process-wide sequence keeps ids unique even when many
/// boxes are created within the same millisecond.
pub fn make_box_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = NEXT_BOX_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("box-{millis}-{:04x}", seq & 0xffff)
}

/// A rectangular annotated region on a page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    /// Stable opaque identifier
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Category of the region
    #[serde(rename = "type")]
    pub box_type: BoxType,
    /// Detector confidence; absent for hand-drawn boxes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Position in the page's render/export sequence
    pub order: u32,
}

impl PageBox {
    pub fn rect(&self) -> NormRect {
        NormRect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_rect(&mut self, rect: NormRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }
}

/// Partial geometry update for a box
///
/// Fields left `None` keep their current value. The merged result is
/// clamped so the box stays inside the unit square.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeometryPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
}

impl GeometryPatch {
    /// Merge into a box and clamp the result into the unit square
    pub fn apply(self, b: &mut PageBox) {
        if let Some(x) = self.x {
            b.x = x;
        }
        if let Some(y) = self.y {
            b.y = y;
        }
        if let Some(w) = self.w {
            b.w = w;
        }
        if let Some(h) = self.h {
            b.h = h;
        }
        b.x = clamp01(b.x);
        b.y = clamp01(b.y);
        b.w = clamp01(b.w.min(1.0 - b.x));
        b.h = clamp01(b.h.min(1.0 - b.y));
    }
}

/// Incoming box shape from the remote cache or the detection engine
///
/// Candidates may lack an id (detector output) and an order (lists written
/// before ordering existed); [`BoxCandidate::into_page_box`] fills in both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "type")]
    pub box_type: BoxType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl BoxCandidate {
    /// Clamp geometry into the unit square and assign the given order
    pub fn into_page_box(self, order: u32) -> PageBox {
        let x = clamp01(self.x);
        let y = clamp01(self.y);
        PageBox {
            id: self.id.unwrap_or_else(make_box_id),
            x,
            y,
            w: clamp01(self.w.min(1.0 - x)),
            h: clamp01(self.h.min(1.0 - y)),
            box_type: self.box_type,
            score: self.score,
            order,
        }
    }
}

impl From<PageBox> for BoxCandidate {
    fn from(b: PageBox) -> Self {
        Self {
            id: Some(b.id),
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            box_type: b.box_type,
            score: b.score,
            order: Some(b.order),
        }
    }
}
