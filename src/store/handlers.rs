//! Box store mutation handlers
//!
//! Handles BoxMsg for all list-level box operations.
//!
//! Each handler returns whether a mutation committed, which tells the engine
//! to write the page through to the remote cache.

use crate::domain::{DropTarget, GeometryPatch};
use crate::session::messages::BoxMsg;
use crate::session::state::{PageState, Session};
use crate::store::ordering::{apply_list_order, parse_order_tokens, reindex};

/// Handle a BoxMsg, modifying the active page
///
/// Returns true if the page's box list changed in a way that must be
/// persisted. Without an active page every message is a no-op.
pub fn handle_box_msg(session: &mut Session, msg: BoxMsg) -> bool {
    let Some(page) = session.page.as_mut() else {
        return false;
    };
    match msg {
        BoxMsg::Patch { id, patch } => patch_geometry(page, &id, patch),
        BoxMsg::CycleType(id) => cycle_type(page, &id),
        BoxMsg::CycleTypes(ids) => cycle_types(page, &ids),
        BoxMsg::Delete(ids) => delete_boxes(page, &ids),
        BoxMsg::ToggleSelected(id) => {
            page.toggle_selected(&id);
            false
        }
        BoxMsg::ReorderDrag { source, target } => reorder_by_drag(page, &source, target),
        BoxMsg::ReorderList(input) => reorder_by_list(page, &input),
    }
}

fn patch_geometry(page: &mut PageState, id: &str, patch: GeometryPatch) -> bool {
    match page.get_box_mut(id) {
        Some(b) => {
            patch.apply(b);
            true
        }
        None => false,
    }
}

fn cycle_type(page: &mut PageState, id: &str) -> bool {
    let Some(b) = page.get_box_mut(id) else {
        return false;
    };
    b.box_type = b.box_type.cycle();
    page.ensure_selected(id);
    true
}

fn cycle_types(page: &mut PageState, ids: &[String]) -> bool {
    let mut changed = false;
    for b in &mut page.boxes {
        if ids.iter().any(|id| *id == b.id) {
            b.box_type = b.box_type.cycle();
            changed = true;
        }
    }
    changed
}

fn delete_boxes(page: &mut PageState, ids: &[String]) -> bool {
    if ids.is_empty() {
        return false;
    }
    let before = page.boxes.len();
    page.boxes.retain(|b| !ids.contains(&b.id));
    if page.boxes.len() == before {
        return false;
    }
    reindex(&mut page.boxes);
    page.selected.retain(|id| !ids.contains(id));
    page.editing = None;
    true
}

fn reorder_by_drag(page: &mut PageState, source: &str, target: DropTarget) -> bool {
    if matches!(&target, DropTarget::Before(t) if t == source) {
        return false;
    }
    let Some(source_idx) = page.boxes.iter().position(|b| b.id == source) else {
        return false;
    };
    if matches!(&target, DropTarget::Before(t) if !page.boxes.iter().any(|b| b.id == *t)) {
        return false;
    }
    let moved = page.boxes.remove(source_idx);
    let insert_at = match &target {
        // Position is resolved after removal, so the moved box lands
        // immediately before the target.
        DropTarget::Before(t) => page
            .boxes
            .iter()
            .position(|b| b.id == *t)
            .unwrap_or(page.boxes.len()),
        DropTarget::End => page.boxes.len(),
    };
    page.boxes.insert(insert_at, moved);
    reindex(&mut page.boxes);
    true
}

fn reorder_by_list(page: &mut PageState, input: &str) -> bool {
    match parse_order_tokens(input, page.boxes.len()) {
        Ok(tokens) => {
            page.boxes = apply_list_order(std::mem::take(&mut page.boxes), &tokens);
            page.order_error = None;
            true
        }
        Err(err) => {
            page.order_error = Some(err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoxType, PageBox};
    use crate::session::state::PageFile;
    use crate::store::ordering::ReorderError;

    fn page_box(id: &str, order: u32) -> PageBox {
        PageBox {
            id: id.into(),
            x: 0.1 * order as f32,
            y: 0.1,
            w: 0.1,
            h: 0.1,
            box_type: BoxType::TextBubble,
            score: None,
            order,
        }
    }

    fn session_with(ids: &[&str]) -> Session {
        let mut session = Session::new();
        let mut page = PageState::new(PageFile::local("f1"));
        page.boxes = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| page_box(id, idx as u32))
            .collect();
        session.page = Some(page);
        session
    }

    fn ids(session: &Session) -> Vec<&str> {
        session.boxes().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn delete_reindexes_survivors_and_prunes_selection() {
        let mut session = session_with(&["a", "b", "c"]);
        {
            let page = session.page.as_mut().unwrap();
            page.selected = vec!["a".into(), "b".into()];
            page.editing = Some("b".into());
        }
        let dirty = handle_box_msg(&mut session, BoxMsg::Delete(vec!["b".into()]));
        assert!(dirty);
        assert_eq!(ids(&session), ["a", "c"]);
        let orders: Vec<u32> = session.boxes().iter().map(|b| b.order).collect();
        assert_eq!(orders, [0, 1]);
        let page = session.page.as_ref().unwrap();
        assert_eq!(page.selected, vec!["a"]);
        assert!(page.editing.is_none());
    }

    #[test]
    fn delete_of_unknown_id_is_clean_noop() {
        let mut session = session_with(&["a"]);
        let dirty = handle_box_msg(&mut session, BoxMsg::Delete(vec!["zz".into()]));
        assert!(!dirty);
        assert_eq!(ids(&session), ["a"]);
    }

    #[test]
    fn cycle_type_flips_and_selects() {
        let mut session = session_with(&["a"]);
        let dirty = handle_box_msg(&mut session, BoxMsg::CycleType("a".into()));
        assert!(dirty);
        let page = session.page.as_ref().unwrap();
        assert_eq!(page.boxes[0].box_type, BoxType::Sounds);
        assert_eq!(page.selected, vec!["a"]);
    }

    #[test]
    fn drag_reorder_inserts_before_target() {
        let mut session = session_with(&["a", "b", "c", "d"]);
        let dirty = handle_box_msg(
            &mut session,
            BoxMsg::ReorderDrag {
                source: "a".into(),
                target: DropTarget::Before("c".into()),
            },
        );
        assert!(dirty);
        assert_eq!(ids(&session), ["b", "a", "c", "d"]);
        let orders: Vec<u32> = session.boxes().iter().map(|b| b.order).collect();
        assert_eq!(orders, [0, 1, 2, 3]);
    }

    #[test]
    fn drag_reorder_to_end() {
        let mut session = session_with(&["a", "b", "c"]);
        let dirty = handle_box_msg(
            &mut session,
            BoxMsg::ReorderDrag {
                source: "a".into(),
                target: DropTarget::End,
            },
        );
        assert!(dirty);
        assert_eq!(ids(&session), ["b", "c", "a"]);
    }

    #[test]
    fn drag_reorder_noops_on_self_or_missing() {
        let mut session = session_with(&["a", "b"]);
        assert!(!handle_box_msg(
            &mut session,
            BoxMsg::ReorderDrag {
                source: "a".into(),
                target: DropTarget::Before("a".into()),
            },
        ));
        assert!(!handle_box_msg(
            &mut session,
            BoxMsg::ReorderDrag {
                source: "zz".into(),
                target: DropTarget::End,
            },
        ));
        assert!(!handle_box_msg(
            &mut session,
            BoxMsg::ReorderDrag {
                source: "a".into(),
                target: DropTarget::Before("zz".into()),
            },
        ));
        assert_eq!(ids(&session), ["a", "b"]);
    }

    #[test]
    fn list_reorder_applies_and_clears_error() {
        let mut session = session_with(&["a", "b", "c"]);
        let dirty = handle_box_msg(&mut session, BoxMsg::ReorderList("2 1 3".into()));
        assert!(dirty);
        assert_eq!(ids(&session), ["b", "a", "c"]);
        assert!(session.page.as_ref().unwrap().order_error.is_none());
    }

    #[test]
    fn list_reorder_failure_leaves_boxes_untouched() {
        let mut session = session_with(&["a", "b", "c"]);
        let dirty = handle_box_msg(&mut session, BoxMsg::ReorderList("5".into()));
        assert!(!dirty);
        assert_eq!(ids(&session), ["a", "b", "c"]);
        assert_eq!(
            session.page.as_ref().unwrap().order_error,
            Some(ReorderError::OutOfRange { max: 3 })
        );
    }

    #[test]
    fn patch_merges_and_clamps() {
        let mut session = session_with(&["a"]);
        let dirty = handle_box_msg(
            &mut session,
            BoxMsg::Patch {
                id: "a".into(),
                patch: GeometryPatch {
                    x: Some(0.95),
                    w: Some(0.3),
                    ..Default::default()
                },
            },
        );
        assert!(dirty);
        let b = &session.boxes()[0];
        assert_eq!(b.x, 0.95);
        assert!((b.w - 0.05).abs() < 1e-6);
    }
}
