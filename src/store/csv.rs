//! Minimal CSV codec for the quote file
//!
//! Quote-aware and CRLF tolerant. Handles both layouts the quote file has
//! carried over time: a `text,author` file with a header row, and the older
//! headerless `author,text` file.

use std::mem::take;

/// Column names that mark the first row as a header
const HEADER_TOKENS: &[&str] = &[
    "quote", "text", "content", "hitokoto", "author", "from", "source",
];

const TEXT_COLUMNS: &[&str] = &["text", "quote", "content", "hitokoto"];
const AUTHOR_COLUMNS: &[&str] = &["author", "from", "source"];

/// Column positions of the two quote fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub text: usize,
    pub author: usize,
}

impl Columns {
    /// Layout written by this crate
    pub const CANONICAL: Columns = Columns { text: 0, author: 1 };

    /// Headerless layout of older quote files
    pub const LEGACY: Columns = Columns { text: 1, author: 0 };
}

/// Splits CSV text into rows of fields, dropping blank lines.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                push_row(&mut rows, take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a final newline (or with unterminated quotes)
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}

/// Checks the first row for known column names.
///
/// Returns the column layout to use and whether the first row is a header.
/// Without a header the legacy `author,text` layout is assumed.
pub fn detect_header(rows: &[Vec<String>]) -> (Columns, bool) {
    let Some(first) = rows.first() else {
        return (Columns::CANONICAL, false);
    };

    let header: Vec<String> = first.iter().map(|c| c.trim().to_lowercase()).collect();
    if !header.iter().any(|c| HEADER_TOKENS.contains(&c.as_str())) {
        return (Columns::LEGACY, false);
    }

    let find = |names: &[&str]| header.iter().position(|c| names.contains(&c.as_str()));
    let text = find(TEXT_COLUMNS);
    let author = find(AUTHOR_COLUMNS);

    let columns = match (text, author) {
        (Some(text), Some(author)) => Columns { text, author },
        (Some(text), None) => Columns {
            text,
            author: if text == 0 { 1 } else { 0 },
        },
        (None, Some(author)) => Columns {
            text: if author == 0 { 1 } else { 0 },
            author,
        },
        (None, None) => Columns::CANONICAL,
    };

    (columns, true)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Appends a single row to `out`, quoting fields where required.
pub fn write_row(out: &mut String, row: &[&str]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
