/// Compile-time layout tokens — not user-overridable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleTokens {
    pub spacing_4: i32,
    pub spacing_8: i32,
    pub spacing_12: i32,
    pub spacing_16: i32,
    pub fab_size: i32,
    pub fab_margin: i32,
    pub menu_width: i32,
    pub menu_max_height: i32,
    pub bar_gap: i32,
    pub bar_padding_top: i32,
    pub marker_width: i32,
    pub badge_size: i32,
    pub control_radius: u16,
    pub panel_radius: u16,
    pub border_width: u16,
    pub drag_threshold: f64,
    pub toast_duration_ms: u32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    spacing_4: 4,
    spacing_8: 8,
    spacing_12: 12,
    spacing_16: 16,
    fab_size: 50,
    fab_margin: 20,
    menu_width: 250,
    menu_max_height: 400,
    bar_gap: 15,
    bar_padding_top: 35,
    marker_width: 4,
    badge_size: 20,
    control_radius: 8,
    panel_radius: 8,
    border_width: 1,
    drag_threshold: 3.0,
    toast_duration_ms: 2_000,
};

#[cfg(test)]
mod tests {
    use super::LAYOUT_TOKENS;

    #[test]
    fn layout_tokens_keep_launcher_dimensions() {
        assert_eq!(LAYOUT_TOKENS.fab_size, 50);
        assert_eq!(LAYOUT_TOKENS.fab_margin, 20);
        assert_eq!(LAYOUT_TOKENS.menu_width, 250);
        assert_eq!(LAYOUT_TOKENS.menu_max_height, 400);
    }

    #[test]
    fn layout_tokens_keep_bar_drag_geometry() {
        assert_eq!(LAYOUT_TOKENS.bar_gap, 15);
        assert_eq!(LAYOUT_TOKENS.marker_width, 4);
        assert_eq!(LAYOUT_TOKENS.drag_threshold, 3.0);
    }
}
