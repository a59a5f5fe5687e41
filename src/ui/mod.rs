pub mod style;
pub mod widgets;

pub use style::{StyleTokens, LAYOUT_TOKENS};
pub use widgets::{ellipsized_label, pill_button, round_button};
