//! # Errors

use std::fmt;
use std::path::PathBuf;

/// Error type.
#[derive(Debug)]
pub enum Error {
    /// Getting or setting terminal attributes (raw mode, signal handler registration) failed.
    TerminalUnavailable(std::io::Error),
    /// Reading a keystroke from standard input failed.
    ReadFailed(std::io::Error),
    /// Writing a redrawn frame to standard output failed.
    WriteFailed(std::io::Error),
    /// Opening a file to load failed, for a reason other than the file not existing.
    FileOpenFailed(std::io::Error),
    /// Writing a file on save failed.
    FileWriteFailed(std::io::Error),
    /// Any other I/O error without a more specific propagation policy above.
    Io(std::io::Error),
    /// Error returned when the window size obtained through a system call is invalid.
    InvalidWindowSize,
    /// Error setting or retrieving the cursor position.
    CursorPosition,
    /// Configuration error. The three attributes correspond to the file path, the line number and
    /// the error message.
    Config(PathBuf, usize, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TerminalUnavailable(err) => write!(f, "Terminal unavailable: {err}"),
            Self::ReadFailed(err) => write!(f, "Could not read from the terminal: {err}"),
            Self::WriteFailed(err) => write!(f, "Could not write to the terminal: {err}"),
            Self::FileOpenFailed(err) => write!(f, "Could not open file: {err}"),
            Self::FileWriteFailed(err) => write!(f, "Could not write file: {err}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::InvalidWindowSize => write!(f, "Could not determine the terminal window size"),
            Self::CursorPosition => write!(f, "Could not read the cursor position"),
            Self::Config(path, line, msg) => {
                write!(f, "{}:{}: {}", path.display(), line, msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TerminalUnavailable(err)
            | Self::ReadFailed(err)
            | Self::WriteFailed(err)
            | Self::FileOpenFailed(err)
            | Self::FileWriteFailed(err)
            | Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    /// Convert an IO Error into an editor `Error`. Used at call sites with no more specific
    /// propagation policy; see [`Error::TerminalUnavailable`] and friends for the named kinds.
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}
