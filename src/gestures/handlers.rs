//! Pointer gesture handlers
//!
//! Handles GestureMsg for the draw/resize/move/rectangle-select state
//! machine. Every event dispatches on the single gesture tag, so at most one
//! gesture processes pointer events; a down event while a gesture is active
//! is ignored.

use crate::config::EngineConfig;
use crate::domain::{Corner, Modifiers, NormRect, PageBox, Point, Tool, clamp01, make_box_id};
use crate::session::messages::GestureMsg;
use crate::session::state::{Gesture, Session};
use crate::store::ordering::reindex;

/// Handle a GestureMsg, modifying the active page
///
/// Returns true if the gesture committed geometry that must be persisted.
pub fn handle_gesture_msg(session: &mut Session, config: &EngineConfig, msg: GestureMsg) -> bool {
    match msg {
        GestureMsg::OverlayDown(pos) => {
            overlay_down(session, pos);
            false
        }
        GestureMsg::BoxDown { id, pos } => {
            box_down(session, &id, pos);
            false
        }
        GestureMsg::HandleDown { id, corner, pos } => {
            handle_down(session, &id, corner, pos);
            false
        }
        GestureMsg::Click { id, modifiers } => {
            box_click(session, &id, modifiers);
            false
        }
        GestureMsg::Moved(pos) => {
            pointer_moved(session, config, pos);
            false
        }
        GestureMsg::Released(pos) => pointer_released(session, config, pos),
    }
}

/// Pointer down on empty overlay space starts a draw or a rectangle select
fn overlay_down(session: &mut Session, pos: Point) {
    let tool = session.tool;
    let Some(page) = session.page.as_mut() else {
        return;
    };
    if !page.gesture.is_idle() {
        return;
    }
    match tool {
        Tool::Draw => {
            page.editing = None;
            page.gesture = Gesture::Drawing {
                start: pos,
                draft: NormRect::at(pos),
            };
        }
        Tool::Select => {
            // Clicking empty space drops the selection before rubber-banding.
            page.clear_selection();
            page.gesture = Gesture::Selecting {
                start: pos,
                draft: NormRect::at(pos),
            };
        }
    }
}

/// Pointer down on a box body starts a move when the box is already selected
///
/// A down on an unselected box does nothing here; the click that follows the
/// release performs the selection change.
fn box_down(session: &mut Session, id: &str, pos: Point) {
    if session.tool != Tool::Select {
        return;
    }
    let Some(page) = session.page.as_mut() else {
        return;
    };
    if !page.gesture.is_idle() || !page.is_selected(id) {
        return;
    }
    let ids = page.selected.clone();
    let start_rects = page
        .boxes
        .iter()
        .filter(|b| ids.contains(&b.id))
        .map(|b| (b.id.clone(), b.rect()))
        .collect();
    page.gesture = Gesture::Moving {
        start: pos,
        ids,
        start_rects,
    };
}

/// Pointer down on a corner handle starts resizing the focused box
fn handle_down(session: &mut Session, id: &str, corner: Corner, pos: Point) {
    let Some(page) = session.page.as_mut() else {
        return;
    };
    if !page.gesture.is_idle() {
        return;
    }
    let Some(start_box) = page.get_box(id).map(|b| b.rect()) else {
        return;
    };
    page.editing = Some(id.to_string());
    page.ensure_selected(id);
    page.gesture = Gesture::Resizing {
        box_id: id.to_string(),
        corner,
        start_box,
        start: pos,
    };
}

fn box_click(session: &mut Session, id: &str, modifiers: Modifiers) {
    let Some(page) = session.page.as_mut() else {
        return;
    };
    if page.get_box(id).is_none() {
        return;
    }
    if modifiers.toggles_selection() {
        page.toggle_selected(id);
    } else {
        // Covers plain click on an unselected box and collapsing a
        // multi-selection onto the clicked box.
        page.select_only(id);
    }
}

fn pointer_moved(session: &mut Session, config: &EngineConfig, pos: Point) {
    let Some(page) = session.page.as_mut() else {
        return;
    };
    match &mut page.gesture {
        Gesture::Idle => {}
        Gesture::Drawing { start, draft } | Gesture::Selecting { start, draft } => {
            *draft = NormRect::from_corners(*start, pos);
        }
        Gesture::Resizing {
            box_id,
            corner,
            start_box,
            start,
        } => {
            let dx = pos.x - start.x;
            let dy = pos.y - start.y;
            let min = config.min_box_size;
            let Some(b) = page.boxes.iter_mut().find(|b| b.id == *box_id) else {
                return;
            };
            // Each edge derives from the gesture-start geometry; a move that
            // would shrink past the minimum is rejected, holding the edge at
            // its previous valid position.
            if corner.is_north() {
                let new_y = start_box.y + dy;
                let new_h = start_box.h - dy;
                if new_h > min {
                    b.y = clamp01(new_y);
                    b.h = clamp01(new_h);
                }
            } else {
                let new_h = start_box.h + dy;
                if new_h > min {
                    b.h = clamp01(new_h);
                }
            }
            if corner.is_west() {
                let new_x = start_box.x + dx;
                let new_w = start_box.w - dx;
                if new_w > min {
                    b.x = clamp01(new_x);
                    b.w = clamp01(new_w);
                }
            } else {
                let new_w = start_box.w + dx;
                if new_w > min {
                    b.w = clamp01(new_w);
                }
            }
            b.x = clamp01(b.x);
            b.y = clamp01(b.y);
            b.w = clamp01(b.w.min(1.0 - b.x));
            b.h = clamp01(b.h.min(1.0 - b.y));
        }
        Gesture::Moving {
            start,
            ids,
            start_rects,
        } => {
            let dx = pos.x - start.x;
            let dy = pos.y - start.y;
            for b in &mut page.boxes {
                if !ids.contains(&b.id) {
                    continue;
                }
                let Some(sr) = start_rects.get(&b.id) else {
                    continue;
                };
                // Each box clamps independently; recomputing from the
                // gesture-start rect keeps the size when the box moves back
                // off an edge.
                let x = clamp01(sr.x + dx);
                let y = clamp01(sr.y + dy);
                b.x = x;
                b.y = y;
                b.w = clamp01(sr.w.min(1.0 - x));
                b.h = clamp01(sr.h.min(1.0 - y));
            }
        }
    }
}

fn pointer_released(session: &mut Session, config: &EngineConfig, pos: Point) -> bool {
    let draw_type = session.draw_type;
    let Some(page) = session.page.as_mut() else {
        return false;
    };
    match std::mem::take(&mut page.gesture) {
        Gesture::Idle => false,
        Gesture::Drawing { start, .. } => {
            let rect = NormRect::from_corners(start, pos);
            if rect.w < config.min_box_size || rect.h < config.min_box_size {
                return false;
            }
            let id = make_box_id();
            page.boxes.push(PageBox {
                id: id.clone(),
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                box_type: draw_type,
                score: None,
                order: page.boxes.len() as u32,
            });
            reindex(&mut page.boxes);
            page.select_only(&id);
            true
        }
        Gesture::Selecting { start, .. } => {
            let area = NormRect::from_corners(start, pos);
            let matched: Vec<String> = page
                .boxes
                .iter()
                .filter(|b| b.rect().intersects(&area))
                .map(|b| b.id.clone())
                .collect();
            if matched.len() == 1 {
                page.select_only(&matched[0]);
            } else if !matched.is_empty() {
                page.selected = matched;
            }
            false
        }
        Gesture::Resizing { .. } => true,
        Gesture::Moving { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoxType;
    use crate::session::state::{PageFile, PageState};

    fn page_box(id: &str, x: f32, y: f32, w: f32, h: f32, order: u32) -> PageBox {
        PageBox {
            id: id.into(),
            x,
            y,
            w,
            h,
            box_type: BoxType::TextBubble,
            score: None,
            order,
        }
    }

    fn session_with(boxes: Vec<PageBox>) -> Session {
        let mut session = Session::new();
        let mut page = PageState::new(PageFile::local("f1"));
        page.boxes = boxes;
        session.page = Some(page);
        session
    }

    fn update(session: &mut Session, msg: GestureMsg) -> bool {
        handle_gesture_msg(session, &EngineConfig::default(), msg)
    }

    #[test]
    fn draw_commits_box_with_sole_selection() {
        let mut session = session_with(vec![]);
        session.tool = Tool::Draw;
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.1, 0.1)));
        update(&mut session, GestureMsg::Moved(Point::new(0.2, 0.2)));
        assert!(session.page.as_ref().unwrap().gesture.draft().is_some());
        let dirty = update(&mut session, GestureMsg::Released(Point::new(0.3, 0.4)));
        assert!(dirty);

        let page = session.page.as_ref().unwrap();
        assert_eq!(page.boxes.len(), 1);
        let b = &page.boxes[0];
        assert!((b.x - 0.1).abs() < 1e-6);
        assert!((b.y - 0.1).abs() < 1e-6);
        assert!((b.w - 0.2).abs() < 1e-6);
        assert!((b.h - 0.3).abs() < 1e-6);
        assert_eq!(b.order, 0);
        assert!(b.score.is_none());
        assert_eq!(page.selected, vec![b.id.clone()]);
        assert_eq!(page.editing, Some(b.id.clone()));
        assert!(page.gesture.is_idle());
    }

    #[test]
    fn sub_threshold_draw_is_discarded() {
        let mut session = session_with(vec![]);
        session.tool = Tool::Draw;
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.1, 0.1)));
        let dirty = update(
            &mut session,
            GestureMsg::Released(Point::new(0.105, 0.105)),
        );
        assert!(!dirty);
        assert!(session.boxes().is_empty());
    }

    #[test]
    fn draw_uses_current_drawing_category() {
        let mut session = session_with(vec![]);
        session.tool = Tool::Draw;
        session.draw_type = BoxType::TextBubble;
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.0, 0.0)));
        update(&mut session, GestureMsg::Released(Point::new(0.2, 0.2)));
        assert_eq!(session.boxes()[0].box_type, BoxType::TextBubble);
    }

    #[test]
    fn rectangle_select_requires_nonzero_overlap() {
        let mut session = session_with(vec![
            page_box("inside", 0.2, 0.2, 0.1, 0.1, 0),
            // Left edge exactly on the selection rectangle's right edge.
            page_box("touching", 0.5, 0.2, 0.1, 0.1, 1),
            page_box("outside", 0.8, 0.8, 0.1, 0.1, 2),
        ]);
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.1, 0.1)));
        update(&mut session, GestureMsg::Released(Point::new(0.5, 0.5)));
        let page = session.page.as_ref().unwrap();
        assert_eq!(page.selected, vec!["inside"]);
        // A single match also takes edit focus.
        assert_eq!(page.editing.as_deref(), Some("inside"));
    }

    #[test]
    fn rectangle_select_multi_match_keeps_focus_clear() {
        let mut session = session_with(vec![
            page_box("a", 0.15, 0.15, 0.1, 0.1, 0),
            page_box("b", 0.3, 0.3, 0.1, 0.1, 1),
        ]);
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.1, 0.1)));
        update(&mut session, GestureMsg::Released(Point::new(0.45, 0.45)));
        let page = session.page.as_ref().unwrap();
        assert_eq!(page.selected, vec!["a", "b"]);
        assert!(page.editing.is_none());
    }

    #[test]
    fn empty_area_select_clears_selection_immediately() {
        let mut session = session_with(vec![page_box("a", 0.2, 0.2, 0.1, 0.1, 0)]);
        session.page.as_mut().unwrap().select_only("a");
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.8, 0.8)));
        let page = session.page.as_ref().unwrap();
        assert!(page.selected.is_empty());
        assert!(page.editing.is_none());
    }

    #[test]
    fn click_semantics() {
        let mut session = session_with(vec![
            page_box("a", 0.1, 0.1, 0.1, 0.1, 0),
            page_box("b", 0.3, 0.3, 0.1, 0.1, 1),
        ]);

        // Plain click replaces selection and takes edit focus.
        update(
            &mut session,
            GestureMsg::Click {
                id: "a".into(),
                modifiers: Modifiers::default(),
            },
        );
        {
            let page = session.page.as_ref().unwrap();
            assert_eq!(page.selected, vec!["a"]);
            assert_eq!(page.editing.as_deref(), Some("a"));
        }

        // Shift-click toggles membership without moving focus.
        update(
            &mut session,
            GestureMsg::Click {
                id: "b".into(),
                modifiers: Modifiers {
                    shift: true,
                    ctrl: false,
                },
            },
        );
        {
            let page = session.page.as_ref().unwrap();
            assert_eq!(page.selected, vec!["a", "b"]);
            assert_eq!(page.editing.as_deref(), Some("a"));
        }

        // Plain click on a member of a multi-selection collapses onto it.
        update(
            &mut session,
            GestureMsg::Click {
                id: "b".into(),
                modifiers: Modifiers::default(),
            },
        );
        let page = session.page.as_ref().unwrap();
        assert_eq!(page.selected, vec!["b"]);
        assert_eq!(page.editing.as_deref(), Some("b"));
    }

    #[test]
    fn resize_nw_moves_top_left_anchored_at_opposite_corner() {
        let mut session = session_with(vec![page_box("a", 0.4, 0.4, 0.2, 0.2, 0)]);
        update(
            &mut session,
            GestureMsg::HandleDown {
                id: "a".into(),
                corner: Corner::Nw,
                pos: Point::new(0.4, 0.4),
            },
        );
        update(&mut session, GestureMsg::Moved(Point::new(0.3, 0.35)));
        let dirty = update(&mut session, GestureMsg::Released(Point::new(0.3, 0.35)));
        assert!(dirty);
        let b = &session.boxes()[0];
        assert!((b.x - 0.3).abs() < 1e-6);
        assert!((b.y - 0.35).abs() < 1e-6);
        assert!((b.w - 0.3).abs() < 1e-6);
        assert!((b.h - 0.25).abs() < 1e-6);
        // The opposite corner stayed put.
        assert!((b.rect().right() - 0.6).abs() < 1e-6);
        assert!((b.rect().bottom() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn resize_below_minimum_holds_previous_size() {
        let mut session = session_with(vec![page_box("a", 0.4, 0.4, 0.2, 0.2, 0)]);
        update(
            &mut session,
            GestureMsg::HandleDown {
                id: "a".into(),
                corner: Corner::Se,
                pos: Point::new(0.6, 0.6),
            },
        );
        // Collapse width past the minimum; height shrinks legally.
        update(&mut session, GestureMsg::Moved(Point::new(0.35, 0.55)));
        let b = &session.boxes()[0];
        assert!((b.w - 0.2).abs() < 1e-6);
        assert!((b.h - 0.15).abs() < 1e-6);
    }

    #[test]
    fn resize_clamps_to_unit_square() {
        let mut session = session_with(vec![page_box("a", 0.7, 0.7, 0.2, 0.2, 0)]);
        update(
            &mut session,
            GestureMsg::HandleDown {
                id: "a".into(),
                corner: Corner::Se,
                pos: Point::new(0.9, 0.9),
            },
        );
        update(&mut session, GestureMsg::Moved(Point::new(1.5, 1.5)));
        let b = &session.boxes()[0];
        assert!(b.rect().right() <= 1.0 + 1e-6);
        assert!(b.rect().bottom() <= 1.0 + 1e-6);
    }

    #[test]
    fn move_translates_selection_with_independent_clamping() {
        let mut session = session_with(vec![
            page_box("mid", 0.4, 0.4, 0.2, 0.2, 0),
            page_box("edge", 0.85, 0.4, 0.1, 0.1, 1),
        ]);
        {
            let page = session.page.as_mut().unwrap();
            page.selected = vec!["mid".into(), "edge".into()];
        }
        update(
            &mut session,
            GestureMsg::BoxDown {
                id: "mid".into(),
                pos: Point::new(0.5, 0.5),
            },
        );
        update(&mut session, GestureMsg::Moved(Point::new(0.6, 0.5)));
        let dirty = update(&mut session, GestureMsg::Released(Point::new(0.6, 0.5)));
        assert!(dirty);

        let page = session.page.as_ref().unwrap();
        let mid = page.get_box("mid").unwrap();
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert!((mid.w - 0.2).abs() < 1e-6);
        let edge = page.get_box("edge").unwrap();
        // Clamped against the right edge while the other box moved in full.
        assert!((edge.x - 0.95).abs() < 1e-6);
        assert!((edge.w - 0.05).abs() < 1e-6);
        // Selection is retained after the move.
        assert_eq!(page.selected, vec!["mid", "edge"]);
    }

    #[test]
    fn move_back_inside_restores_size() {
        let mut session = session_with(vec![page_box("a", 0.85, 0.4, 0.1, 0.1, 0)]);
        session.page.as_mut().unwrap().selected = vec!["a".into()];
        update(
            &mut session,
            GestureMsg::BoxDown {
                id: "a".into(),
                pos: Point::new(0.9, 0.45),
            },
        );
        update(&mut session, GestureMsg::Moved(Point::new(1.0, 0.45)));
        assert!((session.boxes()[0].w - 0.05).abs() < 1e-6);
        update(&mut session, GestureMsg::Moved(Point::new(0.9, 0.45)));
        assert!((session.boxes()[0].w - 0.1).abs() < 1e-6);
    }

    #[test]
    fn down_on_unselected_box_does_not_start_moving() {
        let mut session = session_with(vec![page_box("a", 0.1, 0.1, 0.2, 0.2, 0)]);
        update(
            &mut session,
            GestureMsg::BoxDown {
                id: "a".into(),
                pos: Point::new(0.2, 0.2),
            },
        );
        assert!(session.page.as_ref().unwrap().gesture.is_idle());
    }

    #[test]
    fn down_events_are_ignored_while_a_gesture_is_active() {
        let mut session = session_with(vec![page_box("a", 0.1, 0.1, 0.2, 0.2, 0)]);
        session.tool = Tool::Draw;
        update(&mut session, GestureMsg::OverlayDown(Point::new(0.5, 0.5)));
        update(
            &mut session,
            GestureMsg::HandleDown {
                id: "a".into(),
                corner: Corner::Nw,
                pos: Point::new(0.1, 0.1),
            },
        );
        assert!(matches!(
            session.page.as_ref().unwrap().gesture,
            Gesture::Drawing { .. }
        ));
    }

    #[test]
    fn release_without_gesture_is_a_noop() {
        let mut session = session_with(vec![page_box("a", 0.1, 0.1, 0.2, 0.2, 0)]);
        let dirty = update(&mut session, GestureMsg::Released(Point::new(0.5, 0.5)));
        assert!(!dirty);
        assert_eq!(session.boxes().len(), 1);
    }
}
