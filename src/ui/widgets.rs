use gtk4::prelude::*;
use gtk4::{Button, Label};

pub fn pill_button(label: &str, extra_classes: &[&str]) -> Button {
    let button = Button::with_label(label);
    button.set_focus_on_click(false);
    button.add_css_class("pill-button");
    for css_class in extra_classes {
        button.add_css_class(css_class);
    }
    button
}

pub fn round_button(label: &str, size: i32, extra_classes: &[&str]) -> Button {
    let button = Button::with_label(label);
    button.set_focus_on_click(false);
    button.add_css_class("round-button");
    for css_class in extra_classes {
        button.add_css_class(css_class);
    }
    button.set_size_request(size, size);
    button
}

pub fn ellipsized_label(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.set_halign(gtk4::Align::Start);
    label.set_xalign(0.0);
    label.set_hexpand(true);
    label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
    label.set_tooltip_text(Some(text));
    label
}
