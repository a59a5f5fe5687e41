use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Label, Orientation, Revealer, Widget};

use crate::page::PageNode;
use crate::select::HEADER_CLASS;

use super::{handle_click_outcome, open_uri, PinContext};

const BANNER_TEXT: &str = "請點擊您想釘選的功能按鈕 (Click to pin) | ESC 取消";

/// Builds the portal page surface: instruction banner, menu cards wired
/// into the selection engine, and the shortcut bar mounted at the
/// structurally-located anchor.
pub(super) fn build_page_view(ctx: &PinContext) -> (Widget, Revealer) {
    let page_root = GtkBox::new(Orientation::Vertical, 0);

    let banner_label = Label::new(Some(BANNER_TEXT));
    banner_label.add_css_class("selection-banner");
    let banner = Revealer::new();
    banner.set_transition_type(gtk4::RevealerTransitionType::SlideDown);
    banner.set_child(Some(&banner_label));
    banner.set_halign(Align::Center);
    banner.set_margin_top(ctx.tokens.spacing_8);
    page_root.append(&banner);

    let content = GtkBox::new(Orientation::Vertical, ctx.tokens.spacing_8);

    let cards_box = GtkBox::new(Orientation::Vertical, 0);
    let mut header_widgets: Vec<(Button, Rc<PageNode>)> = Vec::new();
    for card in ctx.page.cards() {
        if let Some(widget) = card_widget(ctx, &card, &mut header_widgets) {
            cards_box.append(&widget);
        }
    }
    content.append(&cards_box);

    // Highlight state lives on the page model; widgets mirror it here.
    let sync_targets = Rc::new(header_widgets);
    for (button, node) in sync_targets.iter() {
        sync_header_css(button, node);
    }
    let targets_for_sync = sync_targets.clone();
    *ctx.header_sync.borrow_mut() = Some(Rc::new(move || {
        for (button, node) in targets_for_sync.iter() {
            sync_header_css(button, node);
        }
    }));

    match ctx.page.bar_anchor() {
        Some(anchor) => {
            tracing::debug!(anchor = anchor.tag(), "mounting shortcut bar at page anchor");
            content.append(&super::bar::build_bar(ctx));
        }
        // Missing anchor: log and skip, never fail the page.
        None => tracing::warn!("shortcut bar anchor not found; bar not mounted"),
    }

    let scroller = gtk4::ScrolledWindow::new();
    scroller.set_policy(gtk4::PolicyType::Never, gtk4::PolicyType::Automatic);
    scroller.set_vexpand(true);
    scroller.set_child(Some(&content));
    page_root.append(&scroller);

    (page_root.upcast(), banner)
}

fn card_widget(
    ctx: &PinContext,
    card: &Rc<PageNode>,
    header_widgets: &mut Vec<(Button, Rc<PageNode>)>,
) -> Option<GtkBox> {
    let header = card
        .children()
        .into_iter()
        .find(|child| child.has_class(HEADER_CLASS))?;

    let container = GtkBox::new(Orientation::Vertical, 0);
    container.add_css_class("portal-card");

    let header_button = Button::with_label(&crate::select::header_label(&header));
    header_button.add_css_class("portal-card-header");
    header_button.set_has_frame(false);

    let ctx_for_click = ctx.clone();
    let node_for_click = header.clone();
    header_button.connect_clicked(move |button| {
        let outcome = ctx_for_click.engine.borrow_mut().click(&node_for_click);
        if outcome == crate::select::ClickOutcome::NotSelecting {
            if let Some(href) = node_for_click.attr_value("href") {
                open_uri(&href);
            }
            return;
        }
        sync_header_css(button, &node_for_click);
        handle_click_outcome(&ctx_for_click, outcome);
    });

    let motion = gtk4::EventControllerMotion::new();
    let ctx_for_enter = ctx.clone();
    let node_for_enter = header.clone();
    let button_for_enter = header_button.clone();
    motion.connect_enter(move |_controller, _x, _y| {
        ctx_for_enter.engine.borrow_mut().hover_enter(&node_for_enter);
        sync_header_css(&button_for_enter, &node_for_enter);
    });
    let ctx_for_leave = ctx.clone();
    let node_for_leave = header.clone();
    let button_for_leave = header_button.clone();
    motion.connect_leave(move |_controller| {
        ctx_for_leave.engine.borrow_mut().hover_leave(&node_for_leave);
        sync_header_css(&button_for_leave, &node_for_leave);
    });
    header_button.add_controller(motion);

    container.append(&header_button);
    header_widgets.push((header_button, header.clone()));

    // Submenu links render below the header, selection mode or not.
    for anchor in card.descendants_where(&|node| node.tag() == "a" && !node.has_class(HEADER_CLASS))
    {
        let Some(href) = anchor.attr_value("href") else {
            continue;
        };
        let label = anchor.text_content().trim().to_string();
        let link = Button::with_label(&label);
        link.add_css_class("portal-card-link");
        link.set_has_frame(false);
        link.set_halign(Align::Start);
        link.connect_clicked(move |_| open_uri(&href));
        container.append(&link);
    }

    Some(container)
}

fn sync_header_css(button: &Button, node: &Rc<PageNode>) {
    if node.style_value("outline").is_some() {
        button.add_css_class("pin-select-hover");
    } else {
        button.remove_css_class("pin-select-hover");
    }
}
