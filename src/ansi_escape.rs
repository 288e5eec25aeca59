//! # ANSI escape sequences
//!
//! Named constants for the VT100/ANSI sequences emitted by the compositor.

/// Hide the cursor (`?25l`).
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor (`?25h`).
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Move the cursor to the top-left corner (`1;1H`, i.e. home).
pub const MOVE_CURSOR_TO_START: &str = "\x1b[H";
/// Clear the entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";
/// Clear from the cursor to the end of the current line.
pub const CLEAR_LINE_RIGHT_OF_CURSOR: &str = "\x1b[K";
/// Switch to reverse video (used for bars and control-byte glyphs).
pub const REVERSE_VIDEO: &str = "\x1b[7m";
/// Reset all SGR attributes, including colour, to the default.
pub const RESET_FMT: &str = "\x1b[m";

/// The SGR code for a given highlight colour, as used by [`crate::row::HlAttr::ansi_color`].
pub const COLOR_RED: u8 = 31;
pub const COLOR_GREEN: u8 = 32;
pub const COLOR_YELLOW: u8 = 33;
pub const COLOR_BLUE: u8 = 34;
pub const COLOR_MAGENTA: u8 = 35;
pub const COLOR_CYAN: u8 = 36;
pub const COLOR_WHITE: u8 = 37;
pub const COLOR_DEFAULT: u8 = 39;
pub const COLOR_BRIGHT_YELLOW: u8 = 93;

/// Return the `ESC[<n>m` SGR sequence for a given colour code.
pub fn set_color(color: u8) -> String { format!("\x1b[{color}m") }
