//! # Row
//!
//! A single line of text: its raw bytes, its tab-expanded render form, and the syntax
//! highlighting attached to that render form.

use std::ops::Range;

use crate::ansi_escape::*;
use crate::syntax::{is_separator, HlFlags, SyntaxConf};

/// The highlight attribute of a single rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlAttr {
    Normal,
    Comment,
    MultilineComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

impl HlAttr {
    /// The SGR colour code used to draw this attribute. `Normal` has no dedicated colour; the
    /// compositor resets to the terminal default instead of emitting one.
    fn ansi_color(self) -> Option<u8> {
        match self {
            Self::Normal => None,
            Self::Comment | Self::MultilineComment => Some(COLOR_CYAN),
            Self::Keyword1 => Some(COLOR_YELLOW),
            Self::Keyword2 => Some(COLOR_GREEN),
            Self::String => Some(COLOR_MAGENTA),
            Self::Number => Some(COLOR_RED),
            Self::Match => Some(COLOR_BLUE),
        }
    }
}

/// The syntax-highlighting state carried from one row to the next: whether the row ends inside
/// an unterminated multi-line comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HlState {
    #[default]
    Normal,
    Comment,
}

impl HlState {
    const fn is_comment(self) -> bool { matches!(self, Self::Comment) }

    const fn from_bool(open: bool) -> Self { if open { Self::Comment } else { Self::Normal } }
}

/// A single row of text.
pub struct Row {
    /// This row's current position in the buffer. Kept in sync by [`crate::editor::Editor`]
    /// whenever rows are inserted, removed, or reordered.
    pub idx: usize,
    /// The raw bytes of the row, as they will be written back to disk.
    pub chars: Vec<u8>,
    /// The tab-expanded render form, used for display and search.
    pub render: Vec<u8>,
    /// One highlight attribute per byte of `render`.
    pub hl: Vec<HlAttr>,
    /// Whether this row ends inside an unterminated multi-line comment.
    pub hl_state: HlState,
    /// The byte range within `render` currently highlighted as a search match, if any. Kept
    /// separate from `hl` so that clearing a stale match never requires snapshotting and
    /// restoring the underlying syntax highlight.
    pub match_segment: Option<Range<usize>>,
    /// `cx2rx[cx]` is the render-column corresponding to raw byte offset `cx` (forward walk).
    cx2rx: Vec<usize>,
    /// `rx2cx[rx]` is the raw byte offset corresponding to render-column `rx` (reverse walk).
    rx2cx: Vec<usize>,
}

impl Row {
    /// Create a new row from raw bytes. The render form, highlight vector and coordinate maps
    /// are empty until [`Row::update`] is called.
    pub fn new(idx: usize, chars: Vec<u8>) -> Self {
        Self {
            idx,
            chars,
            render: Vec::new(),
            hl: Vec::new(),
            hl_state: HlState::Normal,
            match_segment: None,
            cx2rx: vec![0],
            rx2cx: vec![0],
        }
    }

    /// Regenerate `render`, the coordinate maps, and `hl` from `chars`, given the syntax profile
    /// in effect and the highlight state carried over from the previous row. Returns this row's
    /// own resulting [`HlState`], to be threaded into the next row.
    pub fn update(
        &mut self,
        syntax: Option<&SyntaxConf>,
        prev_state: HlState,
        tab_stop: usize,
    ) -> HlState {
        self.rebuild_render(tab_stop);
        self.match_segment = None;
        let new_state = self.rebuild_highlight(syntax, prev_state);
        self.hl_state = new_state;
        new_state
    }

    fn rebuild_render(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render = Vec::with_capacity(self.chars.len());
        self.cx2rx = Vec::with_capacity(self.chars.len() + 1);
        self.rx2cx = Vec::with_capacity(self.chars.len() + 1);

        let mut rx = 0;
        for &b in &self.chars {
            self.cx2rx.push(rx);
            if b == b'\t' {
                self.render.push(b' ');
                rx += 1;
                while rx % tab_stop != 0 {
                    self.render.push(b' ');
                    rx += 1;
                }
            } else {
                self.render.push(b);
                rx += 1;
            }
            while self.rx2cx.len() < rx {
                self.rx2cx.push(self.cx2rx.len() - 1);
            }
        }
        self.cx2rx.push(rx);
        self.rx2cx.push(self.chars.len());
    }

    fn rebuild_highlight(&mut self, syntax: Option<&SyntaxConf>, prev_state: HlState) -> HlState {
        let len = self.render.len();
        self.hl = vec![HlAttr::Normal; len];
        let Some(syntax) = syntax else {
            return HlState::Normal;
        };

        let scs = syntax.singleline_comment_start.as_bytes();
        let mcs = syntax.multiline_comment_start.as_bytes();
        let mce = syntax.multiline_comment_end.as_bytes();
        let highlight_strings = syntax.flags.contains(HlFlags::HIGHLIGHT_STRINGS);
        let highlight_numbers = syntax.flags.contains(HlFlags::HIGHLIGHT_NUMBERS);

        let mut in_comment = prev_state.is_comment();
        let mut in_string: Option<u8> = None;
        let mut prev_sep = true;
        let mut i = 0;
        while i < len {
            let c = self.render[i];
            let prev_hl = if i > 0 { self.hl[i - 1] } else { HlAttr::Normal };

            if !scs.is_empty() && in_string.is_none() && !in_comment && self.render[i..].starts_with(scs)
            {
                for h in &mut self.hl[i..] {
                    *h = HlAttr::Comment;
                }
                break;
            }

            if !mcs.is_empty() && !mce.is_empty() && in_string.is_none() {
                if in_comment {
                    self.hl[i] = HlAttr::MultilineComment;
                    if self.render[i..].starts_with(mce) {
                        for h in &mut self.hl[i..i + mce.len()] {
                            *h = HlAttr::MultilineComment;
                        }
                        i += mce.len();
                        in_comment = false;
                        prev_sep = true;
                        continue;
                    }
                    i += 1;
                    continue;
                } else if self.render[i..].starts_with(mcs) {
                    for h in &mut self.hl[i..i + mcs.len()] {
                        *h = HlAttr::MultilineComment;
                    }
                    i += mcs.len();
                    in_comment = true;
                    continue;
                }
            }

            if highlight_strings {
                if let Some(quote) = in_string {
                    self.hl[i] = HlAttr::String;
                    if c == b'\\' && i + 1 < len {
                        self.hl[i + 1] = HlAttr::String;
                        i += 2;
                        continue;
                    }
                    if c == quote {
                        in_string = None;
                    }
                    i += 1;
                    prev_sep = true;
                    continue;
                } else if c == b'"' || c == b'\'' {
                    in_string = Some(c);
                    self.hl[i] = HlAttr::String;
                    i += 1;
                    continue;
                }
            }

            if highlight_numbers
                && ((c.is_ascii_digit() && (prev_sep || prev_hl == HlAttr::Number))
                    || (c == b'.' && prev_hl == HlAttr::Number))
            {
                self.hl[i] = HlAttr::Number;
                i += 1;
                prev_sep = false;
                continue;
            }

            if prev_sep {
                if let Some((kw_len, secondary)) = syntax.match_keyword(&self.render, i) {
                    let attr = if secondary { HlAttr::Keyword2 } else { HlAttr::Keyword1 };
                    for h in &mut self.hl[i..i + kw_len] {
                        *h = attr;
                    }
                    i += kw_len;
                    prev_sep = false;
                    continue;
                }
            }

            prev_sep = is_separator(c);
            i += 1;
        }

        HlState::from_bool(in_comment)
    }

    /// Convert a raw byte offset (cursor `x` position) to a render-column.
    pub fn cx_to_rx(&self, cx: usize) -> usize { self.cx2rx[cx.min(self.cx2rx.len() - 1)] }

    /// Convert a render-column (e.g. a search match offset) to a raw byte offset.
    pub fn rx_to_cx(&self, rx: usize) -> usize { self.rx2cx[rx.min(self.rx2cx.len() - 1)] }

    /// Draw the visible slice `render[coloff..coloff + screen_cols]` into `buffer`, switching
    /// ANSI colour only when the highlight attribute changes, and rendering control bytes as
    /// `@`+byte in reverse video without persisting the current colour across them.
    pub fn draw(&self, coloff: usize, screen_cols: usize, buffer: &mut String) {
        if coloff >= self.render.len() {
            return;
        }
        let end = (coloff + screen_cols).min(self.render.len());
        let mut current_color: Option<u8> = None;
        for j in coloff..end {
            let c = self.render[j];
            let attr = self.effective_attr(j);

            if c.is_ascii_control() {
                let sym = if c <= 26 { (b'@' + c) as char } else { '?' };
                buffer.push_str(REVERSE_VIDEO);
                buffer.push(sym);
                buffer.push_str(RESET_FMT);
                if let Some(color) = current_color {
                    buffer.push_str(&set_color(color));
                }
                continue;
            }

            match attr.ansi_color() {
                None => {
                    if current_color.is_some() {
                        buffer.push_str(&set_color(COLOR_DEFAULT));
                        current_color = None;
                    }
                }
                Some(color) => {
                    if current_color != Some(color) {
                        buffer.push_str(&set_color(color));
                        current_color = Some(color);
                    }
                }
            }
            buffer.push(c as char);
        }
        buffer.push_str(&set_color(COLOR_DEFAULT));
    }

    /// The highlight attribute effective at render position `j`, overlaying [`Row::match_segment`]
    /// on top of the syntax highlight computed by [`Row::update`].
    fn effective_attr(&self, j: usize) -> HlAttr {
        match &self.match_segment {
            Some(range) if range.contains(&j) => HlAttr::Match,
            _ => self.hl[j],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_syntax() -> SyntaxConf { SyntaxConf::get("x.c").unwrap().unwrap() }

    #[test]
    fn tab_expands_to_next_multiple_of_tab_stop() {
        let mut row = Row::new(0, b"\tx".to_vec());
        row.update(None, HlState::Normal, 8);
        assert_eq!(row.render, b"        x");
        assert_eq!(row.cx_to_rx(1), 8);
    }

    #[test]
    fn keyword_number_and_string_highlighting() {
        let mut row = Row::new(0, b"int x = 42;".to_vec());
        row.update(Some(&c_syntax()), HlState::Normal, 8);
        assert_eq!(row.hl[0], HlAttr::Keyword2); // int
        assert_eq!(row.hl[4], HlAttr::Normal); // x
        assert_eq!(row.hl[8], HlAttr::Number); // 42
    }

    #[test]
    fn multiline_comment_cascades_across_rows() {
        let syntax = c_syntax();
        let mut rows: Vec<Row> = ["/* a", "b", "c */", "d"]
            .iter()
            .enumerate()
            .map(|(i, s)| Row::new(i, s.as_bytes().to_vec()))
            .collect();
        let mut state = HlState::Normal;
        for row in &mut rows {
            state = row.update(Some(&syntax), state, 8);
        }
        assert!(rows[0].hl.iter().all(|h| *h == HlAttr::MultilineComment));
        assert!(rows[1].hl.iter().all(|h| *h == HlAttr::MultilineComment));
        assert!(rows[2].hl.iter().all(|h| *h == HlAttr::MultilineComment));
        assert_eq!(rows[3].hl[0], HlAttr::Normal);
    }

    #[test]
    fn render_byte_and_highlight_lengths_stay_parallel() {
        let mut row = Row::new(0, b"\t\tmix\"str\"".to_vec());
        row.update(Some(&c_syntax()), HlState::Normal, 4);
        assert_eq!(row.render.len(), row.hl.len());
    }
}
