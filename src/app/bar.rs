use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, glib, Align, Box as GtkBox, Button, Orientation, Overlay, Popover, Widget};

use crate::pins::{DropSide, Pin, PinKind};
use crate::ui::{pill_button, round_button};

use super::{open_uri, refresh_surfaces, PinContext};

/// Builds the in-page shortcut bar surface and installs its re-render
/// closure. Returns the widget to mount at the page anchor.
pub(super) fn build_bar(ctx: &PinContext) -> Overlay {
    let bar_root = Overlay::new();

    let row = GtkBox::new(Orientation::Horizontal, ctx.tokens.bar_gap);
    row.set_halign(Align::Center);
    row.set_margin_top(ctx.tokens.bar_padding_top);
    row.set_margin_bottom(ctx.tokens.spacing_8);
    bar_root.set_child(Some(&row));

    // Insertion marker lives above the row, positioned into the gaps.
    let marker = GtkBox::new(Orientation::Vertical, 0);
    marker.add_css_class("drop-marker");
    marker.set_halign(Align::Start);
    marker.set_valign(Align::Start);
    marker.set_visible(false);
    marker.set_can_target(false);
    bar_root.add_overlay(&marker);

    let edit_toggle = round_button("✎", 30, &["edit-toggle"]);
    edit_toggle.set_halign(Align::End);
    edit_toggle.set_valign(Align::Start);
    edit_toggle.set_margin_end(ctx.tokens.spacing_4);
    edit_toggle.set_margin_top(ctx.tokens.spacing_4);
    let ctx_for_edit = ctx.clone();
    edit_toggle.connect_clicked(move |_| {
        let editing = !ctx_for_edit.editing_bar.get();
        ctx_for_edit.editing_bar.set(editing);
        tracing::debug!(editing, "bar edit mode toggled");
        refresh_surfaces(&ctx_for_edit);
    });
    bar_root.add_overlay(&edit_toggle);

    let ctx_for_refresh = ctx.clone();
    let row_for_refresh = row.clone();
    let marker_for_refresh = marker.clone();
    let edit_for_refresh = edit_toggle.clone();
    *ctx.bar_refresh.borrow_mut() = Some(Rc::new(move || {
        render_bar_into(
            &ctx_for_refresh,
            &row_for_refresh,
            &marker_for_refresh,
            &edit_for_refresh,
        );
    }));

    bar_root
}

fn render_bar_into(ctx: &PinContext, row: &GtkBox, marker: &GtkBox, edit_toggle: &Button) {
    while let Some(child) = row.first_child() {
        row.remove(&child);
    }
    marker.set_visible(false);

    let editing = ctx.editing_bar.get();
    edit_toggle.set_label(if editing { "✓" } else { "✎" });
    edit_toggle.set_tooltip_text(Some(if editing {
        "完成 (Done)"
    } else {
        "編輯 (Edit)"
    }));
    if editing {
        edit_toggle.add_css_class("editing");
    } else {
        edit_toggle.remove_css_class("editing");
    }

    // Fixed default shortcut, never removable or reorderable.
    let default_button = pill_button(&ctx.config.default_shortcut_label, &["shortcut-default"]);
    let default_url = ctx.config.default_shortcut_url.clone();
    default_button.connect_clicked(move |_| open_uri(&default_url));
    row.append(&default_button);

    let pins = match ctx.store.load() {
        Ok(pins) => pins,
        Err(err) => {
            tracing::error!(%err, "failed to load pins for bar render");
            Vec::new()
        }
    };
    let pin_count = pins.len();

    for (index, pin) in pins.iter().enumerate() {
        if pin.name.is_empty() || pin.href.is_empty() {
            tracing::debug!(index, "skipping pin with missing name or href");
            continue;
        }
        let element: Widget =
            if pin.kind == PinKind::Group && !pin.items.is_empty() {
                group_dropdown(ctx, pin).upcast()
            } else {
                let button = pill_button(&pin.name, &["shortcut-link"]);
                let href = pin.href.clone();
                button.connect_clicked(move |_| open_uri(&href));
                button.upcast()
            };

        if editing {
            row.append(&editable_wrapper(ctx, row, marker, element, index, pin_count));
        } else {
            row.append(&element);
        }
    }
}

/// Wraps a bar element with the edit-mode affordances: delete badge,
/// disabled inner navigation, and marker-guided drag reordering.
fn editable_wrapper(
    ctx: &PinContext,
    row: &GtkBox,
    marker: &GtkBox,
    element: Widget,
    index: usize,
    pin_count: usize,
) -> Overlay {
    element.set_can_target(false);

    let wrapper = Overlay::new();
    wrapper.set_child(Some(&element));

    let delete = Button::with_label("✕");
    delete.add_css_class("delete-badge");
    delete.set_halign(Align::End);
    delete.set_valign(Align::Start);
    let ctx_for_delete = ctx.clone();
    delete.connect_clicked(move |_| {
        super::remove_pin(&ctx_for_delete, index);
    });
    wrapper.add_overlay(&delete);

    let source = gtk4::DragSource::new();
    source.set_actions(gdk::DragAction::MOVE);
    source.connect_prepare(move |_source, _x, _y| {
        Some(gdk::ContentProvider::for_value(&(index as i32).to_value()))
    });
    let wrapper_for_begin = wrapper.clone();
    source.connect_drag_begin(move |_source, _drag| {
        wrapper_for_begin.set_opacity(0.4);
    });
    let wrapper_for_end = wrapper.clone();
    let marker_for_end = marker.clone();
    source.connect_drag_end(move |_source, _drag, _delete_data| {
        wrapper_for_end.set_opacity(1.0);
        marker_for_end.set_visible(false);
    });
    wrapper.add_controller(source);

    // The intended side is decided on motion and read again on drop.
    let drop_before = Rc::new(Cell::new(true));

    let target = gtk4::DropTarget::new(glib::types::Type::I32, gdk::DragAction::MOVE);
    let wrapper_for_motion = wrapper.clone();
    let row_for_motion = row.clone();
    let marker_for_motion = marker.clone();
    let drop_before_for_motion = drop_before.clone();
    let gap = ctx.tokens.bar_gap;
    let marker_width = ctx.tokens.marker_width;
    target.connect_motion(move |_target, x, _y| {
        let width = f64::from(wrapper_for_motion.width());
        let is_before = x < width / 2.0;
        drop_before_for_motion.set(is_before);

        if let Some(bounds) = wrapper_for_motion.compute_bounds(&row_for_motion) {
            let offset = f64::from(gap) / 2.0 + f64::from(marker_width) / 2.0;
            let marker_left = if is_before {
                f64::from(bounds.x()) - offset
            } else {
                f64::from(bounds.x()) + f64::from(bounds.width()) + f64::from(gap) / 2.0
                    - f64::from(marker_width) / 2.0
            };
            marker_for_motion.set_size_request(marker_width, bounds.height() as i32 + 4);
            marker_for_motion.set_margin_start(marker_left.max(0.0) as i32);
            marker_for_motion.set_margin_top((f64::from(bounds.y()) - 2.0).max(0.0) as i32);
            marker_for_motion.set_visible(true);
        }
        gdk::DragAction::MOVE
    });

    let marker_for_leave = marker.clone();
    target.connect_leave(move |_target| {
        marker_for_leave.set_visible(false);
    });

    let ctx_for_drop = ctx.clone();
    let marker_for_drop = marker.clone();
    target.connect_drop(move |_target, value, _x, _y| {
        marker_for_drop.set_visible(false);
        let Ok(from) = value.get::<i32>() else {
            return false;
        };
        let from = from as usize;
        if from >= pin_count {
            return false;
        }
        let side = if drop_before.get() {
            DropSide::Before
        } else {
            DropSide::After
        };
        super::apply_bar_reorder(&ctx_for_drop, from, index, side);
        true
    });
    wrapper.add_controller(target);

    wrapper
}

fn group_dropdown(ctx: &PinContext, pin: &Pin) -> GtkBox {
    let container = GtkBox::new(Orientation::Horizontal, 0);

    let button = pill_button(&format!("{} ▼", pin.name), &["shortcut-group"]);
    container.append(&button);

    let dropdown = Popover::new();
    dropdown.set_parent(&button);
    dropdown.set_position(gtk4::PositionType::Bottom);
    dropdown.add_css_class("group-dropdown");
    dropdown.set_has_arrow(false);

    let list = GtkBox::new(Orientation::Vertical, 0);
    for item in &pin.items {
        let link = Button::with_label(&item.name);
        link.add_css_class("group-dropdown-link");
        link.set_has_frame(false);
        let href = item.href.clone();
        let dropdown_for_link = dropdown.clone();
        link.connect_clicked(move |_| {
            dropdown_for_link.popdown();
            open_uri(&href);
        });
        list.append(&link);
    }
    dropdown.set_child(Some(&list));

    let open_dropdown = ctx.open_dropdown.clone();
    let dropdown_for_click = dropdown.clone();
    button.connect_clicked(move |_| {
        // Only one group dropdown is open across the bar.
        if let Some(previous) = open_dropdown.borrow_mut().take() {
            if previous != dropdown_for_click {
                previous.popdown();
            }
        }
        if dropdown_for_click.is_visible() {
            dropdown_for_click.popdown();
        } else {
            dropdown_for_click.popup();
            *open_dropdown.borrow_mut() = Some(dropdown_for_click.clone());
        }
    });

    container
}
