// Terminal UI module using ratatui

mod app;
mod screen;
mod widgets;

pub use app::{describe_end, describe_notice, end_marker, key_hints, map_key, Input};
pub use screen::{ScreenOptions, SessionScreen};
pub use widgets::format_clock;
