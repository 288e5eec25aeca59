//! # Terminal
//!
//! The terminal driver: raw-mode lifecycle, window-size measurement (with the cursor-position
//! fallback), and atomic frame writes.

use std::io::{self, Read, Write};

use crate::sys;
use crate::Error;

/// RAII guard for raw mode. Holds the terminal attributes captured before raw mode was entered,
/// and restores them unconditionally when dropped (including on panics unwinding through it).
pub struct RawMode {
    orig_termios: sys::TermMode,
}

impl RawMode {
    /// Enable raw mode, snapshotting the current terminal attributes for later restoration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalUnavailable`] if the underlying `tcgetattr`/`tcsetattr` calls fail.
    pub fn enable() -> Result<Self, Error> {
        let orig_termios = sys::enable_raw_mode()?;
        Ok(Self { orig_termios })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // Best-effort: there is nothing useful to do if restoring the terminal fails during
        // shutdown, and panicking from a `Drop` impl while already unwinding aborts the process.
        let _ = sys::set_termios(&self.orig_termios);
    }
}

/// Write `s` to standard output and flush immediately, so that a frame is never left half-drawn.
pub fn print_and_flush(s: &str) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(s.as_bytes()).map_err(Error::WriteFailed)?;
    lock.flush().map_err(Error::WriteFailed)?;
    Ok(())
}

/// Clear the screen and move the cursor home. Called before surfacing a fatal error so the
/// terminal is not left in a corrupted state.
pub fn clear_screen_best_effort() {
    let _ = print_and_flush("\x1b[2J\x1b[H");
}

/// Determine the terminal window size as `(rows, cols)`.
///
/// Prefers the `TIOCGWINSZ` ioctl; only falls back to the cursor-position probe when the ioctl
/// fails or reports a degenerate size. An earlier prototype of this editor forced the fallback
/// path unconditionally even when the ioctl succeeded; that was a debugging artefact and is not
/// reproduced here.
pub fn get_window_size() -> Result<(usize, usize), Error> {
    match sys::get_window_size() {
        Ok(size) => Ok(size),
        Err(_) => get_window_size_using_cursor(),
    }
}

/// Fall back to measuring the window by moving the cursor far down-right, requesting its
/// position, and parsing the `ESC[<r>;<c>R` reply.
pub fn get_window_size_using_cursor() -> Result<(usize, usize), Error> {
    print_and_flush("\x1b[999C\x1b[999B")?;
    get_cursor_position()
}

/// Request the cursor position with `ESC[6n` and parse the `ESC[<rows>;<cols>R` response.
fn get_cursor_position() -> Result<(usize, usize), Error> {
    print_and_flush("\x1b[6n")?;

    let mut buf = Vec::with_capacity(32);
    let mut byte = [0u8; 1];
    let mut stdin = io::stdin();
    loop {
        if stdin.read(&mut byte).unwrap_or(0) != 1 {
            break;
        }
        if byte[0] == b'R' {
            break;
        }
        buf.push(byte[0]);
        if buf.len() >= 31 {
            break;
        }
    }

    let response = std::str::from_utf8(&buf).map_err(|_| Error::CursorPosition)?;
    let rest = response.strip_prefix("\x1b[").ok_or(Error::CursorPosition)?;
    let (rows, cols) = rest.split_once(';').ok_or(Error::CursorPosition)?;
    let rows: usize = rows.parse().map_err(|_| Error::CursorPosition)?;
    let cols: usize = cols.parse().map_err(|_| Error::CursorPosition)?;
    Ok((rows, cols))
}
