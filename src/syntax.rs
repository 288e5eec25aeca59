//! # Syntax
//!
//! The compiled-in syntax highlighting table. Configurability beyond this table (e.g. loading
//! user-supplied syntax definitions from disk) is out of scope for this editor.

use crate::Error;

/// Keywords whose spelling ends with this sentinel byte are "secondary" keywords (`Keyword2`);
/// all others are "primary" (`Keyword1`). The sentinel itself is stripped before matching.
const SECONDARY_SENTINEL: u8 = b'|';

/// Feature flags for a [`SyntaxConf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HlFlags(u8);

impl HlFlags {
    pub const HIGHLIGHT_NUMBERS: Self = Self(0b01);
    pub const HIGHLIGHT_STRINGS: Self = Self(0b10);

    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }
}

/// Syntax highlighting configuration for a single language.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxConf {
    /// Displayed in the status bar (e.g. "c").
    pub name: &'static str,
    /// File extensions (leading `.`) or filename substrings that select this profile.
    pub file_match: &'static [&'static str],
    /// Keywords, primary first; secondary keywords end with [`SECONDARY_SENTINEL`].
    pub keywords: &'static [&'static str],
    pub singleline_comment_start: &'static str,
    pub multiline_comment_start: &'static str,
    pub multiline_comment_end: &'static str,
    pub flags: HlFlags,
}

impl SyntaxConf {
    /// Look up the syntax profile matching a file extension (without the leading dot) or, for
    /// profiles whose `file_match` entries are not extensions, a filename substring.
    ///
    /// Returns `None` if no compiled-in profile matches. The `Result` wrapper mirrors the shape
    /// a profile lookup would have if it were allowed to fail (e.g. reading a user-supplied
    /// definition from disk); the compiled-in table cannot fail to parse.
    pub fn get(filename: &str) -> Option<Result<Self, Error>> {
        SYNTAX_TABLE.iter().find(|conf| conf.matches(filename)).copied().map(Ok)
    }

    fn matches(&self, filename: &str) -> bool {
        self.file_match.iter().any(|pat| {
            if let Some(ext) = pat.strip_prefix('.') {
                filename.rsplit('.').next().is_some_and(|e| e == ext)
            } else {
                filename.contains(pat)
            }
        })
    }

    /// Whether the separator-bounded keyword at `render[pos..]` is a match, and if so its byte
    /// length in `render` and whether it is a secondary keyword.
    pub(crate) fn match_keyword(&self, render: &[u8], pos: usize) -> Option<(usize, bool)> {
        self.keywords.iter().find_map(|kw| {
            let (spelling, secondary) = match kw.as_bytes() {
                [rest @ .., last] if *last == SECONDARY_SENTINEL => (rest, true),
                full => (full, false),
            };
            let len = spelling.len();
            if render[pos..].starts_with(spelling)
                && render.get(pos + len).map_or(true, |b| is_separator(*b))
            {
                Some((len, secondary))
            } else {
                None
            }
        })
    }
}

/// The separator set used to bound keywords and numbers: whitespace, NUL, and punctuation.
pub fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0 || b",.()+-/*=~%<>[];".contains(&b)
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|",
];

/// The compiled-in syntax table: one entry for C/C++ headers and sources.
static SYNTAX_TABLE: &[SyntaxConf] = &[SyntaxConf {
    name: "c",
    file_match: &[".c", ".h", ".cpp"],
    keywords: C_KEYWORDS,
    singleline_comment_start: "//",
    multiline_comment_start: "/*",
    multiline_comment_end: "*/",
    flags: HlFlags::HIGHLIGHT_NUMBERS.union(HlFlags::HIGHLIGHT_STRINGS),
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_c_extensions() {
        assert!(SyntaxConf::get("main.c").is_some());
        assert!(SyntaxConf::get("header.h").is_some());
        assert!(SyntaxConf::get("impl.cpp").is_some());
        assert!(SyntaxConf::get("readme.md").is_none());
    }

    #[test]
    fn keyword_sentinel_marks_secondary() {
        let conf = SyntaxConf::get("x.c").unwrap().unwrap();
        let (len, secondary) = conf.match_keyword(b"int x;", 0).unwrap();
        assert_eq!(len, 3);
        assert!(secondary);
        let (len, secondary) = conf.match_keyword(b"if (x)", 0).unwrap();
        assert_eq!(len, 2);
        assert!(!secondary);
    }

    #[test]
    fn is_separator_matches_c_set() {
        assert!(is_separator(b' '));
        assert!(is_separator(b';'));
        assert!(is_separator(0));
        assert!(!is_separator(b'a'));
    }
}
