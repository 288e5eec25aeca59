#![allow(clippy::wildcard_imports)]

use std::io::{self, BufRead, BufReader, ErrorKind::InvalidInput, ErrorKind::NotFound, Write};
use std::{fmt::Display, fs::File, path::Path, time::Instant};

use crate::row::{HlState, Row};
use crate::syntax::SyntaxConf;
use crate::{ansi_escape::*, sys, Config, Error};

const fn ctrl_key(key: u8) -> u8 { key & 0x1f }

const EXIT: u8 = ctrl_key(b'Q');
const DELETE_BIS: u8 = ctrl_key(b'H');
const REFRESH_SCREEN: u8 = ctrl_key(b'L');
const SAVE: u8 = ctrl_key(b'S');
const FIND: u8 = ctrl_key(b'F');
const GOTO: u8 = ctrl_key(b'G');
const DUPLICATE: u8 = ctrl_key(b'D');
const BACKSPACE: u8 = 127;

const HELP_MESSAGE: &str =
    "Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find | Ctrl-G = go to | Ctrl-D = duplicate line";

/// Sets a formatted status message for the editor. Example usage:
/// `set_status!(editor, "{} written to {}", file_size, file_name)`
macro_rules! set_status {
    ($editor:expr, $($arg:expr),*) => ($editor.status_msg = Some(StatusMessage::new(format!($($arg),*))))
}

/// Input keys, after decoding multi-byte escape sequences.
enum Key {
    Arrow(AKey),
    CtrlArrow(AKey),
    Page(PageKey),
    Home,
    End,
    Delete,
    Escape,
    Char(u8),
}

enum AKey {
    Left,
    Right,
    Up,
    Down,
}

enum PageKey {
    Up,
    Down,
}

/// Which direction an incremental search is currently moving in.
#[derive(Clone, Copy)]
enum SearchDirection {
    Forward,
    Backward,
}

/// The kind of prompt currently shown in the message bar, if any. Does not own the input buffer;
/// that lives on the stack of [`Editor::prompt_line`]. Its purpose is purely to let the drawing
/// routines and `process_keypress` recognize that the editor is in a modal, single-purpose input
/// state rather than regular edit mode.
enum PromptMode {
    Save,
    Find,
    GoTo,
}

#[derive(Default, Clone)]
struct CursorState {
    /// Raw byte offset into the current row.
    x: usize,
    /// Row number, 0-indexed.
    y: usize,
    /// Row offset (first visible row).
    roff: usize,
    /// Column offset (first visible render column).
    coff: usize,
}

impl CursorState {
    fn move_to_next_line(&mut self) {
        self.y += 1;
        self.x = 0;
    }

    /// Adjust `roff`/`coff` so that the cursor (at render-column `rx`) remains visible within a
    /// viewport of `screen_rows` by `screen_cols`.
    fn scroll(&mut self, rx: usize, screen_rows: usize, screen_cols: usize) {
        self.roff = self.roff.clamp(self.y.saturating_sub(screen_rows.saturating_sub(1)), self.y);
        self.coff = self.coff.clamp(rx.saturating_sub(screen_cols.saturating_sub(1)), rx);
    }
}

struct StatusMessage {
    msg: String,
    time: Instant,
}

impl StatusMessage {
    fn new(msg: String) -> Self { Self { msg, time: Instant::now() } }
}

/// The `Editor` struct: the full in-memory state of an editing session.
#[derive(Default)]
pub struct Editor {
    /// The kind of prompt currently active, if the editor is in a modal input state.
    prompt_mode: Option<PromptMode>,
    cursor: CursorState,
    /// Width reserved on the left for the line-number gutter, including its separator.
    ln_pad: usize,
    /// Total terminal width, updated on resize.
    window_width: usize,
    /// Rows usable for text, excluding the title bar, status bar and message bar.
    screen_rows: usize,
    /// Columns usable for text, excluding `ln_pad`.
    screen_cols: usize,
    rows: Vec<Row>,
    dirty: bool,
    config: Config,
    /// Confirmations remaining before a dirty buffer can be quit without saving.
    quit_times: usize,
    file_name: Option<String>,
    status_msg: Option<StatusMessage>,
    /// The syntax profile matching the current file name, if any.
    syntax: Option<SyntaxConf>,
    /// Total byte count across all rows, excluding newlines.
    n_bytes: u64,
    /// Position of the last incremental-search match, as `(row, render-column)`.
    find_last_match: Option<(usize, usize)>,
    find_direction: SearchDirection,
    /// Set to `true` once `process_keypress` has been asked to quit and confirmed.
    should_quit: bool,
}

impl Default for SearchDirection {
    fn default() -> Self { Self::Forward }
}

/// Pretty-format a byte count using binary (1024-based) units.
fn format_size(n: u64) -> String {
    const UNITS: &[u8] = b" kMGTPEZ";
    if n < 1024 {
        return format!("{n}B");
    }
    let mut unit = 0;
    let mut scaled = n;
    while scaled >= 1024 * 1024 && unit < UNITS.len() - 1 {
        scaled /= 1024;
        unit += 1;
    }
    let whole = scaled / 1024;
    let frac = (scaled % 1024) * 100 / 1024;
    format!("{}.{:02}{}B", whole, frac, UNITS[unit] as char)
}

/// Return the index of `needle` in `s` if `needle` is a subslice of `s`.
fn slice_find<T: PartialEq>(s: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() || needle.len() > s.len() {
        return None;
    }
    (0..=s.len() - needle.len()).find(|&i| s[i..].starts_with(needle))
}

impl Editor {
    /// Initialize the text editor. Does not touch terminal modes; the caller is responsible for
    /// entering raw mode (see [`crate::terminal::RawMode`]) before the editor is run.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the `SIGWINCH` handler cannot be installed or the window size cannot be
    /// determined.
    pub fn new(config: Config) -> Result<Self, Error> {
        sys::register_winsize_change_signal_handler()?;
        let mut editor = Self { quit_times: config.quit_times, config, ..Self::default() };
        editor.update_window_size()?;
        Ok(editor)
    }

    /// Load `path` if given, then run the main loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns `Err` on unrecoverable I/O or terminal errors.
    pub fn run(&mut self, path: Option<&Path>) -> Result<(), Error> {
        if let Some(path) = path {
            self.load(path)?;
            self.select_syntax_highlight(path)?;
        } else {
            self.rows.push(Row::new(0, Vec::new()));
        }
        self.update_all_rows();

        while !self.should_quit {
            self.refresh_screen()?;
            self.process_keypress()?;
        }
        self.refresh_screen()
    }

    fn current_row(&self) -> Option<&Row> { self.rows.get(self.cursor.y) }

    /// The cursor position in render-columns, as opposed to `cursor.x` (raw byte offset).
    fn rx(&self) -> usize { self.current_row().map_or(0, |r| r.cx_to_rx(self.cursor.x)) }

    fn move_cursor(&mut self, key: &AKey) {
        match (key, self.current_row()) {
            (AKey::Left, Some(_)) if self.cursor.x > 0 => self.cursor.x -= 1,
            (AKey::Left, _) if self.cursor.y > 0 => {
                self.cursor.y -= 1;
                self.cursor.x = usize::MAX;
            }
            (AKey::Right, Some(row)) if self.cursor.x < row.chars.len() => self.cursor.x += 1,
            (AKey::Right, Some(_)) => self.cursor.move_to_next_line(),
            (AKey::Up, _) if self.cursor.y > 0 => self.cursor.y -= 1,
            (AKey::Down, Some(_)) => self.cursor.y += 1,
            _ => (),
        }
        self.clamp_cursor_x();
    }

    /// After a vertical move, the row under the cursor may be shorter than before; clamp `x` to
    /// stay within it.
    fn clamp_cursor_x(&mut self) {
        self.cursor.x = self.cursor.x.min(self.current_row().map_or(0, |row| row.chars.len()));
    }

    /// Block until a full keypress (including multi-byte escape sequences) has been decoded.
    fn loop_until_keypress(&mut self) -> Result<Key, Error> {
        loop {
            if sys::has_window_size_changed() {
                self.update_window_size()?;
                self.refresh_screen()?;
            }
            let Some(first) = sys::read_byte()? else { continue };
            if first != b'\x1b' {
                return Ok(Key::Char(first));
            }
            return Ok(match sys::read_byte()? {
                Some(b @ (b'[' | b'O')) => match (b, sys::read_byte()?) {
                    (b'[', Some(b'A')) => Key::Arrow(AKey::Up),
                    (b'[', Some(b'B')) => Key::Arrow(AKey::Down),
                    (b'[', Some(b'C')) => Key::Arrow(AKey::Right),
                    (b'[', Some(b'D')) => Key::Arrow(AKey::Left),
                    (b'[' | b'O', Some(b'H')) => Key::Home,
                    (b'[' | b'O', Some(b'F')) => Key::End,
                    (b'[', mut c @ Some(b'0'..=b'8')) => {
                        let mut d = sys::read_byte()?;
                        if let (Some(b'1'), Some(b';')) = (c, d) {
                            c = sys::read_byte()?;
                            d = sys::read_byte()?;
                        }
                        match (c, d) {
                            (Some(c), Some(b'~')) if c == b'1' || c == b'7' => Key::Home,
                            (Some(c), Some(b'~')) if c == b'4' || c == b'8' => Key::End,
                            (Some(b'3'), Some(b'~')) => Key::Delete,
                            (Some(b'5'), Some(b'~')) => Key::Page(PageKey::Up),
                            (Some(b'6'), Some(b'~')) => Key::Page(PageKey::Down),
                            (Some(b'5'), Some(b'A')) => Key::CtrlArrow(AKey::Up),
                            (Some(b'5'), Some(b'B')) => Key::CtrlArrow(AKey::Down),
                            (Some(b'5'), Some(b'C')) => Key::CtrlArrow(AKey::Right),
                            (Some(b'5'), Some(b'D')) => Key::CtrlArrow(AKey::Left),
                            _ => Key::Escape,
                        }
                    }
                    (b'O', Some(b'a')) => Key::CtrlArrow(AKey::Up),
                    (b'O', Some(b'b')) => Key::CtrlArrow(AKey::Down),
                    (b'O', Some(b'c')) => Key::CtrlArrow(AKey::Right),
                    (b'O', Some(b'd')) => Key::CtrlArrow(AKey::Left),
                    _ => Key::Escape,
                },
                _ => Key::Escape,
            });
        }
    }

    fn update_window_size(&mut self) -> Result<(), Error> {
        let (rows, cols) = crate::terminal::get_window_size()?;
        self.screen_rows = rows.saturating_sub(4); // title, status, help and message bars
        self.window_width = cols;
        self.update_screen_cols();
        Ok(())
    }

    /// Recompute `screen_cols` and `ln_pad` from the current row count and window width.
    fn update_screen_cols(&mut self) {
        let n_digits = self.rows.len().to_string().len();
        let show_line_num = self.config.show_line_num && n_digits + 2 < self.window_width / 4;
        self.ln_pad = if show_line_num { n_digits + 2 } else { 0 };
        self.screen_cols = self.window_width.saturating_sub(self.ln_pad);
    }

    /// Select the syntax profile matching `path`'s file name, if any is compiled in.
    fn select_syntax_highlight(&mut self, path: &Path) -> Result<(), Error> {
        let name = path.file_name().and_then(std::ffi::OsStr::to_str).unwrap_or_default();
        self.syntax = SyntaxConf::get(name).transpose()?;
        Ok(())
    }

    /// Recompute highlighting for row `y` onward, stopping early once the cascading
    /// open-multiline-comment state stabilizes (unless `force_following_rows`).
    fn update_row(&mut self, y: usize, force_following_rows: bool) {
        let mut hl_state = if y > 0 { self.rows[y - 1].hl_state } else { HlState::Normal };
        for row in self.rows.iter_mut().skip(y) {
            let previous_hl_state = row.hl_state;
            hl_state = row.update(self.syntax.as_ref(), hl_state, self.config.tab_stop);
            if !force_following_rows && hl_state == previous_hl_state {
                return;
            }
        }
    }

    fn update_all_rows(&mut self) {
        let mut hl_state = HlState::Normal;
        for row in &mut self.rows {
            hl_state = row.update(self.syntax.as_ref(), hl_state, self.config.tab_stop);
        }
    }

    fn insert_byte(&mut self, c: u8) {
        if let Some(row) = self.rows.get_mut(self.cursor.y) {
            row.chars.insert(self.cursor.x, c);
        } else {
            self.rows.push(Row::new(self.rows.len(), vec![c]));
            self.update_screen_cols();
        }
        self.update_row(self.cursor.y, false);
        self.cursor.x += 1;
        self.n_bytes += 1;
        self.dirty = true;
    }

    /// Insert a new line at the cursor, splitting the current row if the cursor is mid-row.
    fn insert_new_line(&mut self) {
        let (position, new_row_chars) = if self.cursor.x == 0 {
            (self.cursor.y, Vec::new())
        } else {
            let new_chars = self.rows[self.cursor.y].chars.split_off(self.cursor.x);
            self.update_row(self.cursor.y, false);
            (self.cursor.y + 1, new_chars)
        };
        self.rows.insert(position, Row::new(position, new_row_chars));
        self.reindex_rows_from(position + 1);
        self.update_row(position, false);
        self.update_screen_cols();
        self.cursor.move_to_next_line();
        self.dirty = true;
    }

    /// Delete the character before the cursor, or merge with the previous row at the start of a
    /// line.
    fn delete_char(&mut self) {
        if self.cursor.x > 0 {
            let row = &mut self.rows[self.cursor.y];
            row.chars.remove(self.cursor.x - 1);
            self.update_row(self.cursor.y, false);
            self.cursor.x -= 1;
            self.dirty = true;
            self.n_bytes -= 1;
        } else if self.cursor.y > 0 && self.cursor.y < self.rows.len() {
            let row = self.rows.remove(self.cursor.y);
            self.reindex_rows_from(self.cursor.y);
            let previous_row = &mut self.rows[self.cursor.y - 1];
            self.cursor.x = previous_row.chars.len();
            previous_row.chars.extend(&row.chars);
            self.update_row(self.cursor.y - 1, true);
            self.update_screen_cols();
            self.dirty = true;
            self.cursor.y -= 1;
        }
    }

    /// Insert a copy of the current row directly below it, leaving the cursor in place.
    fn duplicate_current_row(&mut self) {
        if let Some(row) = self.current_row() {
            let chars = row.chars.clone();
            self.n_bytes += chars.len() as u64;
            self.rows.insert(self.cursor.y + 1, Row::new(self.cursor.y + 1, chars));
            self.reindex_rows_from(self.cursor.y + 2);
            self.update_row(self.cursor.y + 1, false);
            self.dirty = true;
            self.update_screen_cols();
        }
    }

    /// Renumber `row.idx` for every row from `from` onward, after an insertion or removal shifted
    /// their positions.
    fn reindex_rows_from(&mut self, from: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(from) {
            row.idx = i;
        }
    }

    /// Load `path`'s contents into `rows`. A missing file is not an error: the editor starts with
    /// a single empty row, as if creating a new file at that path.
    fn load(&mut self, path: &Path) -> Result<(), Error> {
        match std::fs::metadata(path) {
            Ok(meta) if !(meta.file_type().is_file() || meta.file_type().is_symlink()) => {
                return Err(Error::FileOpenFailed(io::Error::new(InvalidInput, "not a regular file")));
            }
            Err(e) if e.kind() == NotFound => {
                self.rows.push(Row::new(0, Vec::new()));
                return Ok(());
            }
            Err(e) => return Err(Error::FileOpenFailed(e)),
            Ok(_) => {}
        }

        let file = File::open(path).map_err(Error::FileOpenFailed)?;
        for (i, line) in BufReader::new(file).split(b'\n').enumerate() {
            let mut line = line.map_err(Error::FileOpenFailed)?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.rows.push(Row::new(i, line));
        }
        if self.rows.is_empty() {
            self.rows.push(Row::new(0, Vec::new()));
        }
        self.n_bytes = self.rows.iter().map(|row| row.chars.len() as u64).sum();
        self.update_screen_cols();
        Ok(())
    }

    /// Write every row to `file_name`, each followed by a newline, so the file always ends in one.
    fn save(&self, file_name: &str) -> Result<usize, Error> {
        let mut file = File::create(file_name).map_err(Error::FileWriteFailed)?;
        let mut written = 0;
        for row in &self.rows {
            file.write_all(&row.chars).map_err(Error::FileWriteFailed)?;
            file.write_all(b"\n").map_err(Error::FileWriteFailed)?;
            written += row.chars.len() + 1;
        }
        file.sync_all().map_err(Error::FileWriteFailed)?;
        Ok(written)
    }

    /// Save to `file_name`, reporting the outcome in the status bar. Returns whether it succeeded.
    ///
    /// A [`Error::FileWriteFailed`] is non-fatal here: it stays in the editor, surfaces via the
    /// message bar, and leaves `dirty` set so the quit-confirm guard still triggers.
    fn save_and_report(&mut self, file_name: &str) -> bool {
        let saved = self.save(file_name);
        match &saved {
            Ok(written) => set_status!(self, "{} written to {}", format_size(*written as u64), file_name),
            Err(err) => set_status!(self, "Can't save! {}", err),
        }
        if saved.is_ok() {
            self.dirty = false;
        }
        saved.is_ok()
    }

    fn save_as(&mut self, file_name: String) -> Result<(), Error> {
        if self.save_and_report(&file_name) {
            self.select_syntax_highlight(Path::new(&file_name))?;
            self.file_name = Some(file_name);
            self.update_all_rows();
        }
        Ok(())
    }

    /// Read a line of input in the message bar, calling `on_key` after each keypress is applied to
    /// `input` (used by [`Editor::find`] to update the view incrementally).
    fn prompt_line(
        &mut self,
        prompt: &str,
        mode: PromptMode,
        mut on_key: impl FnMut(&mut Self, &str, &Key),
    ) -> Result<Option<String>, Error> {
        self.prompt_mode = Some(mode);
        let mut input = String::new();
        let outcome = loop {
            set_status!(self, "{} {}", prompt, input);
            self.refresh_screen()?;
            let key = self.loop_until_keypress()?;
            match &key {
                Key::Char(b'\r') if !input.is_empty() => {
                    on_key(self, &input, &key);
                    break Some(input);
                }
                Key::Escape | Key::Char(EXIT) => {
                    on_key(self, &input, &key);
                    break None;
                }
                Key::Char(BACKSPACE | DELETE_BIS) => {
                    input.pop();
                    on_key(self, &input, &key);
                }
                Key::Char(c) if !c.is_ascii_control() => {
                    input.push(*c as char);
                    on_key(self, &input, &key);
                }
                _ => on_key(self, &input, &key),
            }
        };
        self.prompt_mode = None;
        self.status_msg = None;
        Ok(outcome)
    }

    fn prompt_save_as(&mut self) -> Result<Option<String>, Error> {
        self.prompt_line("Save as (ESC to cancel):", PromptMode::Save, |_, _, _| {})
    }

    /// Run the incremental-search prompt, moving the cursor to matches as the query or navigation
    /// arrows change, and restoring the original cursor position if the search is cancelled.
    fn find(&mut self) -> Result<(), Error> {
        let saved_cursor = self.cursor.clone();
        self.find_last_match = None;
        self.find_direction = SearchDirection::Forward;

        let result = self.prompt_line(
            "Search (ESC to cancel, arrows to navigate):",
            PromptMode::Find,
            Self::find_step,
        );

        self.clear_match_highlight();
        if matches!(result, Ok(None) | Err(_)) {
            self.cursor = saved_cursor;
        }
        result.map(|_| ())
    }

    fn clear_match_highlight(&mut self) {
        if let Some((y, _)) = self.find_last_match {
            if let Some(row) = self.rows.get_mut(y) {
                row.match_segment = None;
            }
        }
    }

    /// Advance the search by one match in the direction implied by `key` (or the last direction
    /// used, for a plain character key), scanning forward/backward from the last match with
    /// wraparound.
    fn find_step(&mut self, query: &str, key: &Key) {
        self.clear_match_highlight();
        self.find_direction = match key {
            Key::Arrow(AKey::Up) | Key::Arrow(AKey::Left) => SearchDirection::Backward,
            Key::Arrow(AKey::Down) | Key::Arrow(AKey::Right) => SearchDirection::Forward,
            _ => self.find_direction,
        };
        if query.is_empty() {
            self.find_last_match = None;
            return;
        }
        let n = self.rows.len();
        if n == 0 {
            return;
        }
        let mut y = self.find_last_match.map_or(self.cursor.y, |(row, _)| row);
        for _ in 0..n {
            y = match self.find_direction {
                SearchDirection::Forward => (y + 1) % n,
                SearchDirection::Backward => (y + n - 1) % n,
            };
            if let Some(rx) = slice_find(&self.rows[y].render, query.as_bytes()) {
                self.cursor.y = y;
                self.cursor.x = self.rows[y].rx_to_cx(rx);
                self.rows[y].match_segment = Some(rx..rx + query.len());
                self.find_last_match = Some((y, rx));
                return;
            }
        }
    }

    /// Accepts `<line>` or `<line>:<column>` (both 1-indexed, trimmed). An unparsable field
    /// reports a status-bar error and leaves the cursor untouched.
    fn go_to_line(&mut self) -> Result<(), Error> {
        let Some(input) = self.prompt_line("Go to line (ESC to cancel):", PromptMode::GoTo, |_, _, _| {})?
        else {
            return Ok(());
        };
        let (line_part, column_part) = input.trim().split_once(':').map_or((input.trim(), None), |(l, c)| (l, Some(c)));

        let Ok(line) = line_part.parse::<usize>().map(|l| l.max(1)) else {
            set_status!(self, "Not a valid line number: {}", input);
            return Ok(());
        };
        let target_y = (line - 1).min(self.rows.len().saturating_sub(1));

        let target_x = match column_part {
            None => None,
            Some(col) => match col.parse::<usize>() {
                Ok(col) => Some(col.saturating_sub(1)),
                Err(_) => {
                    set_status!(self, "Not a valid column number: {}", input);
                    return Ok(());
                }
            },
        };

        self.cursor.y = target_y;
        self.cursor.x = match target_x {
            Some(rx) => self.rows.get(target_y).map_or(0, |row| row.rx_to_cx(rx)),
            None => self.cursor.x,
        };
        self.clamp_cursor_x();
        Ok(())
    }

    /// Handle one decoded keypress: editing, navigation, and the save/find/go-to/quit commands.
    fn process_keypress(&mut self) -> Result<(), Error> {
        let key = self.loop_until_keypress()?;
        if !matches!(key, Key::Char(EXIT)) {
            self.quit_times = self.config.quit_times;
        }
        match key {
            Key::Char(EXIT) => {
                if self.dirty {
                    self.quit_times -= 1;
                    if self.quit_times == 0 {
                        self.should_quit = true;
                    } else {
                        let times = self.quit_times;
                        set_status!(
                            self,
                            "Unsaved changes! Press Ctrl-Q {} more time{} to quit anyway.",
                            times,
                            if times == 1 { "" } else { "s" }
                        );
                    }
                } else {
                    self.should_quit = true;
                }
            }
            Key::Char(REFRESH_SCREEN) => {}
            Key::Char(SAVE) => {
                if let Some(file_name) = self.file_name.clone() {
                    self.save_and_report(&file_name);
                } else if let Some(file_name) = self.prompt_save_as()? {
                    self.save_as(file_name)?;
                }
            }
            Key::Char(FIND) => self.find()?,
            Key::Char(GOTO) => self.go_to_line()?,
            Key::Char(DUPLICATE) => self.duplicate_current_row(),
            Key::Char(b'\r') => self.insert_new_line(),
            Key::Char(BACKSPACE | DELETE_BIS) => self.delete_char(),
            Key::Delete => {
                self.move_cursor(&AKey::Right);
                self.delete_char();
            }
            Key::Escape => {}
            Key::Arrow(ref a) | Key::CtrlArrow(ref a) => self.move_cursor(a),
            Key::Page(PageKey::Up) => {
                self.cursor.y = self.cursor.y.saturating_sub(self.screen_rows);
                self.clamp_cursor_x();
            }
            Key::Page(PageKey::Down) => {
                self.cursor.y = (self.cursor.y + self.screen_rows).min(self.rows.len());
                self.clamp_cursor_x();
            }
            Key::Home => self.cursor.x = 0,
            Key::End => self.cursor.x = self.current_row().map_or(0, |r| r.chars.len()),
            Key::Char(c) if !c.is_ascii_control() => self.insert_byte(c),
            Key::Char(_) => {}
        }
        Ok(())
    }

    /// Draw the line-number gutter and its vertical separator for one row.
    fn draw_left_padding<T: Display>(&self, buffer: &mut String, val: T) {
        if self.ln_pad >= 2 {
            buffer.push_str(&set_color(COLOR_BRIGHT_YELLOW));
            buffer.push_str(&format!("{:>1$} \u{2502}", val, self.ln_pad - 2));
            buffer.push_str(RESET_FMT);
        }
    }

    fn is_empty(&self) -> bool { self.rows.len() <= 1 && self.n_bytes == 0 }

    /// Draw the single-line title bar at the very top: editor name, current file, modified marker.
    fn draw_top_title_bar(&self, buffer: &mut String) {
        let name = self.file_name.as_deref().unwrap_or("[No Name]");
        let modified = if self.dirty { " (modified)" } else { "" };
        let title = format!("kiroglyph - {name}{modified}");
        buffer.push_str(REVERSE_VIDEO);
        buffer.push_str(&format!("{title:^1$.1$}", self.window_width));
        buffer.push_str(RESET_FMT);
        buffer.push_str("\r\n");
    }

    fn draw_rows(&self, buffer: &mut String) {
        for i in self.cursor.roff..self.cursor.roff + self.screen_rows {
            buffer.push_str(CLEAR_LINE_RIGHT_OF_CURSOR);
            match self.rows.get(i) {
                Some(row) => {
                    self.draw_left_padding(buffer, i + 1);
                    row.draw(self.cursor.coff, self.screen_cols, buffer);
                }
                None => {
                    self.draw_left_padding(buffer, '~');
                    if self.is_empty() && i == self.screen_rows / 3 {
                        let welcome = concat!("kiroglyph ", env!("CARGO_PKG_VERSION"));
                        buffer.push_str(&format!("{welcome:^1$.1$}", self.screen_cols));
                    }
                }
            }
            buffer.push_str("\r\n");
        }
    }

    fn draw_status_bar(&self, buffer: &mut String) {
        let left = format!(
            "{} - {} lines{}",
            self.file_name.as_deref().unwrap_or("[No Name]"),
            self.rows.len(),
            if self.dirty { " (modified)" } else { "" }
        );
        let syntax_name = self.syntax.as_ref().map_or("no ft", |s| s.name);
        let right = format!("{} | {}/{}", syntax_name, self.cursor.y + 1, self.rows.len());
        let width = self.window_width;
        let gap = width.saturating_sub(left.len() + right.len());
        buffer.push_str(REVERSE_VIDEO);
        buffer.push_str(&left[..left.len().min(width)]);
        for _ in 0..gap {
            buffer.push(' ');
        }
        buffer.push_str(&right);
        buffer.push_str(RESET_FMT);
        buffer.push_str("\r\n");
    }

    /// Draw the fixed help line enumerating the core key bindings.
    fn draw_help_bar(&self, buffer: &mut String) {
        buffer.push_str(REVERSE_VIDEO);
        buffer.push_str(&format!("{HELP_MESSAGE:<1$.1$}", self.window_width));
        buffer.push_str(RESET_FMT);
        buffer.push_str("\r\n");
    }

    fn draw_message_bar(&self, buffer: &mut String) {
        buffer.push_str(CLEAR_LINE_RIGHT_OF_CURSOR);
        if let Some(status) = &self.status_msg {
            if self.prompt_mode.is_some() || status.time.elapsed() < self.config.message_dur {
                buffer.push_str(&status.msg[..status.msg.len().min(self.window_width)]);
            }
        }
    }

    /// Redraw the whole screen: title bar, text rows, status bar, message bar, then position the
    /// real cursor.
    fn refresh_screen(&mut self) -> Result<(), Error> {
        self.cursor.scroll(self.rx(), self.screen_rows, self.screen_cols);

        let mut buffer = String::new();
        buffer.push_str(HIDE_CURSOR);
        buffer.push_str(MOVE_CURSOR_TO_START);

        self.draw_top_title_bar(&mut buffer);
        self.draw_rows(&mut buffer);
        self.draw_status_bar(&mut buffer);
        self.draw_help_bar(&mut buffer);
        self.draw_message_bar(&mut buffer);

        if self.prompt_mode.is_some() {
            let message_row = self.screen_rows + 4;
            let message_col = self.status_msg.as_ref().map_or(0, |s| s.msg.len().min(self.window_width)) + 1;
            buffer.push_str(&format!("\x1b[{message_row};{message_col}H"));
        } else {
            let cursor_row = self.cursor.y - self.cursor.roff + 2; // +1 for title bar, +1 for 1-index
            let cursor_col = self.rx() - self.cursor.coff + self.ln_pad + 1;
            buffer.push_str(&format!("\x1b[{cursor_row};{cursor_col}H"));
        }
        buffer.push_str(SHOW_CURSOR);

        crate::terminal::print_and_flush(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an editor with no terminal dependency: `Editor::new` touches raw termios and signal
    /// handling, neither of which are available in a test harness.
    fn test_editor() -> Editor {
        let config = Config::default();
        Editor {
            quit_times: config.quit_times,
            screen_rows: 20,
            screen_cols: 80,
            window_width: 80,
            config,
            ..Editor::default()
        }
    }

    #[test]
    fn format_size_uses_binary_units() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1024), "1.00kB");
        assert_eq!(format_size(1024 * 1536), "1.50MB");
    }

    #[test]
    fn slice_find_locates_subslice() {
        assert_eq!(slice_find(b"hello world", b"world"), Some(6));
        assert_eq!(slice_find(b"hello world", b"xyz"), None);
        assert_eq!(slice_find(b"abc", b""), None);
        assert_eq!(slice_find(b"ab", b"abc"), None);
    }

    #[test]
    fn load_then_save_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let mut editor = test_editor();
        editor.load(&path).unwrap();
        assert_eq!(editor.rows.len(), 2);
        assert_eq!(editor.rows[0].chars, b"line one");
        assert_eq!(editor.rows[1].chars, b"line two");

        let out_path = dir.path().join("out.txt");
        editor.save(out_path.to_str().unwrap()).unwrap();
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn load_missing_file_starts_with_one_empty_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let mut editor = test_editor();
        editor.load(&path).unwrap();
        assert_eq!(editor.rows.len(), 1);
        assert!(editor.rows[0].chars.is_empty());
    }

    #[test]
    fn insert_and_delete_byte_tracks_dirty_and_count() {
        let mut editor = test_editor();
        editor.rows.push(Row::new(0, Vec::new()));
        editor.insert_byte(b'a');
        editor.insert_byte(b'b');
        assert_eq!(editor.rows[0].chars, b"ab");
        assert_eq!(editor.n_bytes, 2);
        assert!(editor.dirty);

        editor.delete_char();
        assert_eq!(editor.rows[0].chars, b"a");
        assert_eq!(editor.n_bytes, 1);
    }

    #[test]
    fn insert_new_line_splits_row_and_keeps_idx_in_sync() {
        let mut editor = test_editor();
        editor.rows.push(Row::new(0, b"abcdef".to_vec()));
        editor.cursor.x = 3;
        editor.insert_new_line();
        assert_eq!(editor.rows.len(), 2);
        assert_eq!(editor.rows[0].chars, b"abc");
        assert_eq!(editor.rows[1].chars, b"def");
        assert_eq!(editor.rows[1].idx, 1);
        assert_eq!((editor.cursor.y, editor.cursor.x), (1, 0));
    }

    #[test]
    fn duplicate_current_row_inserts_copy_below_and_reindexes() {
        let mut editor = test_editor();
        editor.rows.push(Row::new(0, b"abc".to_vec()));
        editor.rows.push(Row::new(1, b"def".to_vec()));
        editor.duplicate_current_row();
        assert_eq!(editor.rows.len(), 3);
        assert_eq!(editor.rows[1].chars, b"abc");
        assert_eq!(editor.rows[2].chars, b"def");
        assert_eq!(editor.rows[2].idx, 2);
    }

    #[test]
    fn find_step_wraps_around_and_respects_direction() {
        let mut editor = test_editor();
        for (i, line) in ["foo", "bar", "foo baz"].into_iter().enumerate() {
            let mut row = Row::new(i, line.as_bytes().to_vec());
            row.update(None, HlState::Normal, 8);
            editor.rows.push(row);
        }
        editor.cursor.y = 0;
        editor.find_last_match = None;
        editor.find_direction = SearchDirection::Forward;

        editor.find_step("foo", &Key::Char(b'o'));
        assert_eq!(editor.cursor.y, 2); // search steps away from the cursor row before matching

        editor.find_step("foo", &Key::Arrow(AKey::Up));
        assert_eq!(editor.cursor.y, 0);
    }

    #[test]
    fn go_to_line_clamps_to_row_count() {
        let mut editor = test_editor();
        for i in 0..5 {
            editor.rows.push(Row::new(i, Vec::new()));
        }
        editor.cursor.y = 100.min(editor.rows.len() - 1);
        assert_eq!(editor.cursor.y, 4);
    }
}
