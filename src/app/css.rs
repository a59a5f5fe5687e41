use crate::ui::StyleTokens;
use gtk4::CssProvider;

pub(super) fn install_runtime_css(tokens: StyleTokens) {
    let fab_radius = tokens.fab_size / 2;
    let badge_radius = tokens.badge_size / 2;
    let css = format!(
        "
window.pinshelf-root {{
  color: #333333;
}}
.portal-card {{
  border: {border_width}px solid #dddddd;
  border-radius: {panel_radius}px;
  background: #ffffff;
  margin: {spacing_8}px;
}}
.portal-card-header {{
  padding: {spacing_8}px {spacing_12}px;
  font-weight: bold;
  border-radius: {panel_radius}px {panel_radius}px 0 0;
  background: #f8f9fa;
}}
.portal-card-header.pin-select-hover {{
  border: 3px solid #dc0000;
  background: #fff3f3;
}}
.portal-card-link {{
  padding: {spacing_4}px {spacing_12}px;
}}
.pin-fab-button {{
  border-radius: {fab_radius}px;
  background: #007bff;
  color: white;
  font-size: 24px;
  box-shadow: 0 4px 8px rgba(0, 0, 0, 0.3);
}}
.pin-fab-button:hover {{
  background: #0069d9;
}}
.pin-menu {{
  background: white;
  border: {border_width}px solid #cccccc;
  border-radius: {panel_radius}px;
  padding: {spacing_8}px;
}}
.pin-menu-header {{
  font-size: 12px;
  font-weight: bold;
  color: #666666;
}}
.pin-menu-empty {{
  color: #999999;
  padding: {spacing_8}px 0;
}}
.pin-menu-row {{
  background: #f8f9fa;
  border: {border_width}px solid #eeeeee;
  border-radius: {control_radius}px;
  padding: {spacing_4}px {spacing_8}px;
}}
.pin-menu-row.menu-row-dragover {{
  border: 2px dashed #007bff;
}}
.pin-menu-handle {{
  color: #999999;
  font-weight: bold;
}}
.pin-menu-delete {{
  color: #dc3545;
  font-weight: bold;
  background: none;
  border: none;
}}
.selection-toggle.toggle-add {{
  background: #28a745;
  color: white;
  font-weight: bold;
}}
.selection-toggle.toggle-stop {{
  background: #dc3545;
  color: white;
  font-weight: bold;
}}
.pill-button {{
  border-radius: 5px;
  padding: {spacing_8}px {spacing_16}px;
  color: #ffffff;
}}
.pill-button.shortcut-default {{
  background: #007bff;
}}
.pill-button.shortcut-default:hover {{
  background: #0056b3;
}}
.pill-button.shortcut-link {{
  background: #17a2b8;
}}
.pill-button.shortcut-link:hover {{
  background: #138496;
}}
.pill-button.shortcut-group {{
  background: #6c757d;
}}
.pill-button.shortcut-group:hover {{
  background: #5a6268;
}}
.group-dropdown {{
  background: white;
  border: {border_width}px solid #cccccc;
  border-radius: {control_radius}px;
}}
.group-dropdown-link {{
  padding: {spacing_8}px {spacing_12}px;
  color: #333333;
  font-size: 14px;
}}
.group-dropdown-link:hover {{
  background: #f8f9fa;
}}
.drop-marker {{
  background: #007bff;
  border-radius: 2px;
}}
.delete-badge {{
  border-radius: {badge_radius}px;
  background: #dc3545;
  color: white;
  border: 2px solid white;
  font-size: 12px;
  font-weight: bold;
  padding: 0;
  min-width: {badge_size}px;
  min-height: {badge_size}px;
}}
.round-button.edit-toggle {{
  background: #ffc107;
  color: #333333;
}}
.round-button.edit-toggle.editing {{
  background: #28a745;
  color: white;
}}
.selection-banner {{
  background: rgba(0, 0, 0, 0.8);
  color: white;
  border-radius: 20px;
  padding: {spacing_8}px {spacing_16}px;
}}
.pin-toast {{
  background: rgba(0, 0, 0, 0.8);
  color: white;
  border-radius: {control_radius}px;
  padding: {spacing_8}px {spacing_16}px;
}}
",
        border_width = tokens.border_width,
        panel_radius = tokens.panel_radius,
        control_radius = tokens.control_radius,
        fab_radius = fab_radius,
        badge_radius = badge_radius,
        badge_size = tokens.badge_size,
        spacing_4 = tokens.spacing_4,
        spacing_8 = tokens.spacing_8,
        spacing_12 = tokens.spacing_12,
        spacing_16 = tokens.spacing_16,
    );

    let provider = CssProvider::new();
    provider.load_from_data(&css);
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
