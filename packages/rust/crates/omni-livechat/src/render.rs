//! Terminal frame rendering.

use std::fmt::Write as _;

use omni_chat_window::{RankedCount, WindowStats};

/// ANSI: cursor home, then clear screen.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// One frame: `content: count` per line, then a `window_size=` footer.
#[must_use]
pub fn render_frame(top: &[RankedCount], stats: &WindowStats, clear_screen: bool) -> String {
    let mut frame = String::new();
    if clear_screen {
        frame.push_str(CLEAR_SCREEN);
    }
    for entry in top {
        let _ = writeln!(frame, "{}: {}", entry.content, entry.count);
    }
    let _ = writeln!(frame, "window_size={}", stats.retained);
    frame
}
