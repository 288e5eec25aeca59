//! # sys (UNIX)
//!
//! UNIX-specific structs and functions. Imported as `sys` by the rest of the crate.

use std::io;
use std::mem;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering::Relaxed};

// On UNIX systems, termios represents the terminal mode.
pub use libc::termios as TermMode;
use libc::{
    c_int, c_void, ioctl, read, sigaction, siginfo_t, tcgetattr, tcsetattr, winsize, BRKINT, CS8,
    ECHO, ICANON, ICRNL, IEXTEN, INPCK, ISIG, ISTRIP, IXON, OPOST, SA_SIGINFO, SIGWINCH,
    STDIN_FILENO, STDOUT_FILENO, TCSAFLUSH, TIOCGWINSZ,
};

use crate::Error;

fn cerr(err: c_int) -> Result<(), Error> {
    match err {
        0..=c_int::MAX => Ok(()),
        _ => Err(Error::TerminalUnavailable(io::Error::last_os_error())),
    }
}

/// Read the current terminal attributes for standard input.
fn get_termios() -> Result<TermMode, Error> {
    let mut termios = unsafe { mem::zeroed() };
    cerr(unsafe { tcgetattr(STDIN_FILENO, &mut termios) })?;
    Ok(termios)
}

/// Apply `termios` as the new terminal attributes for standard input.
pub fn set_termios(termios: &TermMode) -> Result<(), Error> {
    cerr(unsafe { tcsetattr(STDIN_FILENO, TCSAFLUSH, termios) })
}

/// Switch the terminal to raw mode and return the original attributes, so that they can be
/// restored later via [`set_termios`].
pub fn enable_raw_mode() -> Result<TermMode, Error> {
    let orig_termios = get_termios()?;
    let mut raw = orig_termios;

    raw.c_iflag &= !(BRKINT | ICRNL | INPCK | ISTRIP | IXON);
    raw.c_oflag &= !(OPOST);
    raw.c_cflag |= CS8;
    raw.c_lflag &= !(ECHO | ICANON | IEXTEN | ISIG);

    set_termios(&raw)?;
    Ok(orig_termios)
}

/// Obtain the terminal window size through the `TIOCGWINSZ` ioctl. Returns `(rows, cols)`.
///
/// # Errors
///
/// Returns [`Error::InvalidWindowSize`] if the ioctl fails or reports a zero-width terminal; the
/// caller is expected to fall back to the cursor-position probe in that case.
pub fn get_window_size() -> Result<(usize, usize), Error> {
    let mut ws: winsize = unsafe { mem::zeroed() };
    let res = unsafe { ioctl(STDOUT_FILENO, TIOCGWINSZ, &mut ws) };
    if res == -1 || ws.ws_col == 0 {
        return Err(Error::InvalidWindowSize);
    }
    Ok((ws.ws_row as usize, ws.ws_col as usize))
}

/// Read a single byte from standard input. Blocks until a byte is available or an unrecoverable
/// error occurs.
pub fn read_byte() -> Result<Option<u8>, Error> {
    let mut buf = [0u8; 1];
    loop {
        let n = unsafe { read(STDIN_FILENO, buf.as_mut_ptr().cast::<c_void>(), 1) };
        match n {
            1 => return Ok(Some(buf[0])),
            0 => return Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted
                    || err.kind() == io::ErrorKind::WouldBlock
                {
                    continue;
                }
                return Err(Error::ReadFailed(err));
            }
        }
    }
}

/// Set to `true` by [`winsize_changed_handler`] when a `SIGWINCH` is received, and taken (reset
/// to `false`) by [`has_window_size_changed`].
static WINDOW_SIZE_CHANGED: AtomicBool = AtomicBool::new(false);

extern "C" fn winsize_changed_handler(_signum: c_int, _info: *mut siginfo_t, _data: *mut c_void) {
    WINDOW_SIZE_CHANGED.store(true, Relaxed);
}

/// Install a `SIGWINCH` handler so that [`has_window_size_changed`] can later report whether the
/// window has been resized since the last check.
pub fn register_winsize_change_signal_handler() -> Result<(), Error> {
    let mut action: sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = winsize_changed_handler as usize;
    action.sa_flags = SA_SIGINFO;
    cerr(unsafe { sigaction(SIGWINCH, &action, std::ptr::null_mut()) })
}

/// Return whether a `SIGWINCH` has been received since the last call, clearing the flag.
pub fn has_window_size_changed() -> bool { WINDOW_SIZE_CHANGED.swap(false, Relaxed) }

/// The raw file descriptor the editor reads keystrokes from.
pub const STDIN_RAW_FD: RawFd = STDIN_FILENO;
