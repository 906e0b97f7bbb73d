//! Selection and tool types for the overlay

/// Corner handles of the box in edit focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    /// North-West corner
    Nw,
    /// North-East corner
    Ne,
    /// South-West corner
    Sw,
    /// South-East corner
    Se,
}

impl Corner {
    /// Whether dragging this corner moves the top edge
    pub fn is_north(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }

    /// Whether dragging this corner moves the left edge
    pub fn is_west(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }
}

/// Active pointer tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    /// Click, rectangle-select, and move boxes
    #[default]
    Select,
    /// Drag out new boxes
    Draw,
}

/// Keyboard modifiers held during a click
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS
    pub ctrl: bool,
}

impl Modifiers {
    /// Modifier clicks toggle selection membership instead of replacing it
    pub fn toggles_selection(self) -> bool {
        self.shift || self.ctrl
    }
}

/// Where a dragged box lands in the ordered sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Insert immediately before this box
    Before(String),
    /// Move to the end of the sequence
    End,
}
