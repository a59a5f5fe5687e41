use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, glib, Align, Box as GtkBox, Button, Label, Orientation, Overlay, Popover};

use crate::pins::{LauncherPosition, Pin};
use crate::ui::{ellipsized_label, pill_button};

use super::{run_toggle_selection, PinContext};

/// Mounts the floating launcher into the window overlay, removing any
/// stale instance first so re-init is idempotent.
pub(super) fn mount_launcher(ctx: &PinContext, overlay: &Overlay) {
    if let Some(stale) = ctx.launcher_slot.borrow_mut().take() {
        if let Some(stale_menu) = ctx.menu_popover.borrow_mut().take() {
            stale_menu.unparent();
        }
        overlay.remove_overlay(&stale);
        tracing::debug!("removed stale launcher instance");
    }

    let fab = GtkBox::new(Orientation::Vertical, 0);
    fab.add_css_class("pin-fab");

    let button = Button::with_label("📌");
    button.add_css_class("pin-fab-button");
    button.set_size_request(ctx.tokens.fab_size, ctx.tokens.fab_size);
    fab.append(&button);

    place_launcher(ctx, &fab);

    let menu = Popover::new();
    menu.set_parent(&button);
    menu.set_position(gtk4::PositionType::Top);
    menu.add_css_class("pin-menu");

    let menu_body = GtkBox::new(Orientation::Vertical, ctx.tokens.spacing_8);
    menu_body.set_size_request(ctx.tokens.menu_width, -1);
    let scroller = gtk4::ScrolledWindow::new();
    scroller.set_policy(gtk4::PolicyType::Never, gtk4::PolicyType::Automatic);
    scroller.set_max_content_height(ctx.tokens.menu_max_height);
    scroller.set_propagate_natural_height(true);
    scroller.set_child(Some(&menu_body));
    menu.set_child(Some(&scroller));

    *ctx.menu_popover.borrow_mut() = Some(menu.clone());

    // Menu list re-render closure shared with every mutation site.
    let ctx_for_refresh = ctx.clone();
    let body_for_refresh = menu_body.clone();
    *ctx.menu_refresh.borrow_mut() = Some(Rc::new(move || {
        render_menu_into(&ctx_for_refresh, &body_for_refresh);
    }));

    wire_launcher_drag(ctx, overlay, &fab, &button, &menu);

    overlay.add_overlay(&fab);
    *ctx.launcher_slot.borrow_mut() = Some(fab);
}

/// Restores the persisted launcher placement, or the default
/// bottom-right inset when nothing is stored yet.
fn place_launcher(ctx: &PinContext, fab: &GtkBox) {
    let saved = match ctx.store.load_launcher_position() {
        Ok(saved) => saved,
        Err(err) => {
            tracing::warn!(%err, "failed to load launcher position");
            None
        }
    };

    match saved.and_then(|position| {
        Some((parse_px(&position.left)?, parse_px(&position.top)?))
    }) {
        Some((left, top)) => {
            fab.set_halign(Align::Start);
            fab.set_valign(Align::Start);
            fab.set_margin_start(left.max(0.0) as i32);
            fab.set_margin_top(top.max(0.0) as i32);
        }
        None => {
            fab.set_halign(Align::End);
            fab.set_valign(Align::End);
            fab.set_margin_end(ctx.tokens.fab_margin);
            fab.set_margin_bottom(ctx.tokens.fab_margin);
        }
    }
}

fn wire_launcher_drag(
    ctx: &PinContext,
    overlay: &Overlay,
    fab: &GtkBox,
    button: &Button,
    menu: &Popover,
) {
    let has_moved = Rc::new(Cell::new(false));
    let start = Rc::new(Cell::new((0.0_f64, 0.0_f64)));

    let drag = gtk4::GestureDrag::new();
    drag.set_propagation_phase(gtk4::PropagationPhase::Capture);

    let fab_for_begin = fab.clone();
    let overlay_for_begin = overlay.clone();
    let has_moved_for_begin = has_moved.clone();
    let start_for_begin = start.clone();
    drag.connect_drag_begin(move |_gesture, _x, _y| {
        has_moved_for_begin.set(false);
        let Some(bounds) = fab_for_begin.compute_bounds(&overlay_for_begin) else {
            return;
        };
        // Anchor to the top-left corner so the gesture moves freely.
        start_for_begin.set((f64::from(bounds.x()), f64::from(bounds.y())));
        fab_for_begin.set_halign(Align::Start);
        fab_for_begin.set_valign(Align::Start);
        fab_for_begin.set_margin_end(0);
        fab_for_begin.set_margin_bottom(0);
        fab_for_begin.set_margin_start(bounds.x() as i32);
        fab_for_begin.set_margin_top(bounds.y() as i32);
    });

    let fab_for_update = fab.clone();
    let has_moved_for_update = has_moved.clone();
    let start_for_update = start.clone();
    let threshold = ctx.tokens.drag_threshold;
    drag.connect_drag_update(move |gesture, dx, dy| {
        if dx.abs() > threshold || dy.abs() > threshold {
            has_moved_for_update.set(true);
            gesture.set_state(gtk4::EventSequenceState::Claimed);
        }
        if !has_moved_for_update.get() {
            return;
        }
        let (left, top) = start_for_update.get();
        fab_for_update.set_margin_start((left + dx).max(0.0) as i32);
        fab_for_update.set_margin_top((top + dy).max(0.0) as i32);
    });

    let ctx_for_end = ctx.clone();
    let fab_for_end = fab.clone();
    let has_moved_for_end = has_moved.clone();
    drag.connect_drag_end(move |_gesture, _dx, _dy| {
        if !has_moved_for_end.get() {
            return;
        }
        let position = LauncherPosition {
            left: format!("{}px", fab_for_end.margin_start()),
            top: format!("{}px", fab_for_end.margin_top()),
        };
        if let Err(err) = ctx_for_end.store.save_launcher_position(&position) {
            tracing::error!(%err, "failed to persist launcher position");
        }
    });
    fab.add_controller(drag);

    // Click toggles the menu only when the gesture never became a drag.
    let ctx_for_click = ctx.clone();
    let menu_for_click = menu.clone();
    let has_moved_for_click = has_moved.clone();
    button.connect_clicked(move |_button| {
        if has_moved_for_click.get() {
            return;
        }
        if menu_for_click.is_visible() {
            menu_for_click.popdown();
        } else {
            render_menu(&ctx_for_click);
            menu_for_click.popup();
        }
    });
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

pub(super) fn render_menu(ctx: &PinContext) {
    let refresh = ctx.menu_refresh.borrow().clone();
    if let Some(refresh) = refresh {
        refresh();
    }
}

/// Headless model of the menu list body: one row per pin, or the empty
/// placeholder once the last pin is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuListModel {
    Empty,
    Rows(Vec<String>),
}

fn menu_list_model(pins: &[Pin]) -> MenuListModel {
    if pins.is_empty() {
        MenuListModel::Empty
    } else {
        MenuListModel::Rows(pins.iter().map(|pin| pin.name.clone()).collect())
    }
}

fn render_menu_into(ctx: &PinContext, body: &GtkBox) {
    while let Some(child) = body.first_child() {
        body.remove(&child);
    }

    let selecting = ctx.is_selecting();
    let toggle = pill_button(
        if selecting {
            "停止選擇 (Stop)"
        } else {
            "新增釘選項目 (Add Pin)"
        },
        &["selection-toggle", if selecting { "toggle-stop" } else { "toggle-add" }],
    );
    let ctx_for_toggle = ctx.clone();
    toggle.connect_clicked(move |_| {
        // The menu stays open so the user can keep picking.
        run_toggle_selection(&ctx_for_toggle);
    });
    body.append(&toggle);

    let header = Label::new(Some("已釘選項目 (Pinned):"));
    header.add_css_class("pin-menu-header");
    header.set_halign(Align::Start);
    body.append(&header);

    let pins = match ctx.store.load() {
        Ok(pins) => pins,
        Err(err) => {
            tracing::error!(%err, "failed to load pins for menu render");
            Vec::new()
        }
    };

    match menu_list_model(&pins) {
        MenuListModel::Empty => {
            let empty = Label::new(Some("(無項目 None)"));
            empty.add_css_class("pin-menu-empty");
            empty.set_halign(Align::Center);
            body.append(&empty);
        }
        MenuListModel::Rows(names) => {
            let list = GtkBox::new(Orientation::Vertical, ctx.tokens.spacing_4);
            for (index, name) in names.iter().enumerate() {
                list.append(&menu_row(ctx, index, name));
            }
            body.append(&list);
        }
    }
}

fn menu_row(ctx: &PinContext, index: usize, name: &str) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, ctx.tokens.spacing_8);
    row.add_css_class("pin-menu-row");

    let handle = Label::new(Some("≡"));
    handle.add_css_class("pin-menu-handle");
    row.append(&handle);
    row.append(&ellipsized_label(name));

    let delete = Button::with_label("✕");
    delete.add_css_class("pin-menu-delete");
    delete.set_has_frame(false);
    let ctx_for_delete = ctx.clone();
    delete.connect_clicked(move |_| {
        super::remove_pin(&ctx_for_delete, index);
    });
    row.append(&delete);

    let source = gtk4::DragSource::new();
    source.set_actions(gdk::DragAction::MOVE);
    source.connect_prepare(move |_source, _x, _y| {
        Some(gdk::ContentProvider::for_value(&(index as i32).to_value()))
    });
    let row_for_begin = row.clone();
    source.connect_drag_begin(move |_source, _drag| {
        row_for_begin.set_opacity(0.5);
    });
    let row_for_end = row.clone();
    source.connect_drag_end(move |_source, _drag, _delete_data| {
        row_for_end.set_opacity(1.0);
    });
    row.add_controller(source);

    let target = gtk4::DropTarget::new(glib::types::Type::I32, gdk::DragAction::MOVE);
    let row_for_motion = row.clone();
    target.connect_motion(move |_target, _x, _y| {
        row_for_motion.add_css_class("menu-row-dragover");
        gdk::DragAction::MOVE
    });
    let row_for_leave = row.clone();
    target.connect_leave(move |_target| {
        row_for_leave.remove_css_class("menu-row-dragover");
    });
    let ctx_for_drop = ctx.clone();
    let row_for_drop = row.clone();
    target.connect_drop(move |_target, value, _x, _y| {
        row_for_drop.remove_css_class("menu-row-dragover");
        let Ok(from) = value.get::<i32>() else {
            return false;
        };
        super::apply_menu_reorder(&ctx_for_drop, from as usize, index);
        true
    });
    row.add_controller(target);

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinStore;
    use crate::storage::MemoryStore;

    #[test]
    fn menu_model_has_one_row_per_pin_in_order() {
        let pins = vec![Pin::link("A", "u1"), Pin::link("B", "u2")];
        assert_eq!(
            menu_list_model(&pins),
            MenuListModel::Rows(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn menu_model_falls_back_to_placeholder_after_last_delete() {
        let store = PinStore::new(Rc::new(MemoryStore::new()));
        store.add_pin(Pin::link("A", "u1")).unwrap();
        store.add_pin(Pin::link("B", "u2")).unwrap();
        assert!(matches!(
            menu_list_model(&store.load().unwrap()),
            MenuListModel::Rows(_)
        ));

        store.remove_at(1).unwrap();
        store.remove_at(0).unwrap();
        assert_eq!(menu_list_model(&store.load().unwrap()), MenuListModel::Empty);
    }
}
