//! Minimal lexical scanner shared by the statement builders.
//!
//! Tracks just enough state to know whether a character sits in plain code or
//! inside a comment, string, quoted identifier, or dollar-quoted body. Not a
//! SQL parser.

use tm_db::DbKind;

#[derive(Debug, Clone, PartialEq)]
enum State {
    Plain,
    LineComment,
    /// Block comment with nesting depth (PostgreSQL and CockroachDB nest).
    BlockComment(u32),
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    /// Dollar-quoted body; holds the full `$tag$` delimiter.
    DollarQuote(String),
}

pub(crate) struct Scanner {
    kind: DbKind,
    state: State,
}

impl Scanner {
    pub fn new(kind: DbKind) -> Self {
        Self {
            kind,
            state: State::Plain,
        }
    }

    /// True when the scanner is outside any comment, string, or quoted span.
    pub fn is_plain(&self) -> bool {
        self.state == State::Plain
    }

    /// Close a line-comment state at end of input line. Callers feeding the
    /// scanner line-by-line (without newlines) must call this between lines.
    pub fn end_line(&mut self) {
        if self.state == State::LineComment {
            self.state = State::Plain;
        }
    }

    fn nests_block_comments(&self) -> bool {
        matches!(self.kind, DbKind::PostgreSql | DbKind::CockroachDb)
    }

    fn dollar_quotes(&self) -> bool {
        matches!(self.kind, DbKind::PostgreSql | DbKind::CockroachDb)
    }

    /// Scan `text`, calling `on_code(byte_idx, ch)` for every character in
    /// plain code (including quote openers, excluding comment delimiters).
    pub fn feed<F: FnMut(usize, char)>(&mut self, text: &str, mut on_code: F) {
        let mut iter = text.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            match &self.state {
                State::LineComment => {
                    if c == '\n' {
                        self.state = State::Plain;
                    }
                }
                State::BlockComment(depth) => {
                    if c == '*' && text[i + c.len_utf8()..].starts_with('/') {
                        iter.next();
                        let depth = depth - 1;
                        self.state = if depth == 0 {
                            State::Plain
                        } else {
                            State::BlockComment(depth)
                        };
                    } else if self.nests_block_comments()
                        && c == '/'
                        && text[i + c.len_utf8()..].starts_with('*')
                    {
                        iter.next();
                        self.state = State::BlockComment(depth + 1);
                    }
                }
                State::SingleQuote => {
                    if c == '\'' {
                        if text[i + 1..].starts_with('\'') {
                            // Doubled quote: escaped, stay in string.
                            iter.next();
                        } else {
                            self.state = State::Plain;
                        }
                    }
                }
                State::DoubleQuote => {
                    if c == '"' {
                        if text[i + 1..].starts_with('"') {
                            iter.next();
                        } else {
                            self.state = State::Plain;
                        }
                    }
                }
                State::Backtick => {
                    if c == '`' {
                        self.state = State::Plain;
                    }
                }
                State::Bracket => {
                    if c == ']' {
                        self.state = State::Plain;
                    }
                }
                State::DollarQuote(delim) => {
                    if c == '$' && text[i..].starts_with(delim.as_str()) {
                        let skip = delim.chars().count() - 1;
                        for _ in 0..skip {
                            iter.next();
                        }
                        self.state = State::Plain;
                    }
                }
                State::Plain => {
                    let rest = &text[i + c.len_utf8()..];
                    match c {
                        '-' if rest.starts_with('-') => {
                            iter.next();
                            self.state = State::LineComment;
                        }
                        '/' if self.kind == DbKind::Cassandra && rest.starts_with('/') => {
                            iter.next();
                            self.state = State::LineComment;
                        }
                        '/' if rest.starts_with('*') => {
                            iter.next();
                            self.state = State::BlockComment(1);
                        }
                        _ => {
                            on_code(i, c);
                            match c {
                                '\'' => self.state = State::SingleQuote,
                                '"' => self.state = State::DoubleQuote,
                                '`' if self.kind == DbKind::MySql => {
                                    self.state = State::Backtick
                                }
                                '[' if self.kind == DbKind::SqlServer => {
                                    self.state = State::Bracket
                                }
                                '$' if self.dollar_quotes() => {
                                    if let Some(delim) = dollar_delimiter(&text[i..]) {
                                        let skip = delim.chars().count() - 1;
                                        for _ in 0..skip {
                                            iter.next();
                                        }
                                        self.state = State::DollarQuote(delim);
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Match a `$tag$` opener at the start of `text` (tag may be empty, otherwise
/// identifier characters only). Returns the full delimiter including both `$`.
fn dollar_delimiter(text: &str) -> Option<String> {
    debug_assert!(text.starts_with('$'));
    for (i, c) in text.char_indices().skip(1) {
        if c == '$' {
            return Some(text[..=i].to_string());
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
    }
    None
}
