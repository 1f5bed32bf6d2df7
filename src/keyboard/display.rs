/// Key display adapter for sentinel-char to display-name conversions.
///
/// Sentinels (`BACKSPACE`, `ENTER`, `SHIFT`) are produced only where
/// `handle_key` in `src/main.rs` converts crossterm key codes for
/// `depressed_keys`. Rendering goes through these helpers instead of matching
/// the raw chars.

/// Human-readable display name for a key character (including sentinels).
/// Returns `""` for printable chars; caller uses `ch.to_string()` for those.
pub fn key_display_name(ch: char) -> &'static str {
    match ch {
        BACKSPACE => "Backspace",
        ENTER => "Enter",
        SHIFT => "Shift",
        SPACE => "Space",
        _ => "",
    }
}

/// Short label for the on-screen keyboard.
pub fn key_short_label(ch: char) -> &'static str {
    match ch {
        BACKSPACE => "Bksp",
        ENTER => "Ent",
        SHIFT => "Shift",
        SPACE => "Space",
        _ => "",
    }
}

/// Sentinel char for Backspace.
pub const BACKSPACE: char = '\x08';
/// Sentinel char for Enter.
pub const ENTER: char = '\n';
/// Sentinel char for the one-shot Shift latch.
pub const SHIFT: char = '\x0f';
/// Space character (not a sentinel, but treated as a special key for display).
pub const SPACE: char = ' ';
