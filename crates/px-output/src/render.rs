//! Line serializer for the PX target format.
//!
//! Each metadata entry becomes one logical line
//! `KEYWORD[lang]("variable","cell")=value,value;` which is then folded
//! into physical lines shorter than the configured maximum. Only the first
//! physical line of an entry carries the keyword token; folds fall between
//! list tokens, and a single quoted token too long for any line continues
//! as adjacent quoted segments. The data section follows as `DATA=`, one
//! line per cube row and a closing `;`.

use px_core::compare_entries;
use px_model::{Catalog, ConvertOptions, CubeCell, DataCube, MetadataEntry, ValueStyle};

/// Shortest line length folding will honour.
pub const MIN_LINE_LENGTH: usize = 16;

/// Literal line that opens the data section.
pub const DATA_KEYWORD: &str = "DATA=";

/// One rendered value token before folding.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueToken {
    /// Written between double quotes; text holds the content only.
    Quoted(String),
    /// Written as is.
    Bare(String),
}

impl ValueToken {
    fn quoted(text: &str) -> Self {
        Self::Quoted(text.replace('"', "'"))
    }

    fn render(&self) -> String {
        match self {
            Self::Quoted(text) => format!("\"{text}\""),
            Self::Bare(text) => text.clone(),
        }
    }
}

/// Render the catalog and cube into physical lines, without terminators.
pub fn render_lines(catalog: &Catalog, cube: &DataCube, options: &ConvertOptions) -> Vec<String> {
    let max = options.max_line_length.max(MIN_LINE_LENGTH);
    let mut entries: Vec<&MetadataEntry> = catalog.entries().iter().collect();
    entries.sort_by(|a, b| compare_entries(catalog, a, b));

    let mut lines = Vec::new();
    for entry in entries {
        let token = keyword_token(entry, &catalog.main_language);
        let values = value_tokens(entry);
        lines.extend(fold(&token, &values, max));
    }

    lines.push(DATA_KEYWORD.to_string());
    for row in cube.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| data_token(cell, &options.missing_marker))
            .collect();
        lines.push(cells.join(" "));
    }
    lines.push(";".to_string());

    tracing::info!(lines = lines.len(), "Rendered PX lines");
    lines
}

/// Render to one string using the configured line ending, with a trailing
/// terminator after the last line.
pub fn render_to_string(catalog: &Catalog, cube: &DataCube, options: &ConvertOptions) -> String {
    let ending = options.line_ending.as_str();
    let lines = render_lines(catalog, cube, options);
    let capacity = lines.iter().map(|line| line.len() + ending.len()).sum();
    let mut text = String::with_capacity(capacity);
    for line in &lines {
        text.push_str(line);
        text.push_str(ending);
    }
    text
}

/// `KEYWORD`, `[lang]` for language-dependent keywords outside the main
/// language, and `("variable")` or `("variable","cell")` qualifiers.
pub fn keyword_token(entry: &MetadataEntry, main_language: &str) -> String {
    let mut token = entry.keyword.name().to_string();
    if entry.keyword.is_language_dependent() && entry.language != main_language {
        token.push('[');
        token.push_str(&entry.language);
        token.push(']');
    }
    if let Some(variable) = &entry.variable {
        token.push_str("(\"");
        token.push_str(&variable.replace('"', "'"));
        token.push('"');
        if let Some(cell) = &entry.cell {
            token.push_str(",\"");
            token.push_str(&cell.replace('"', "'"));
            token.push('"');
        }
        token.push(')');
    }
    token
}

fn value_tokens(entry: &MetadataEntry) -> Vec<ValueToken> {
    let style = entry.keyword.style();
    let single = match entry.value.as_slice() {
        [only] => Some(only.trim()),
        _ => None,
    };
    match (style, single) {
        (ValueStyle::Boolean, Some(value))
            if value.eq_ignore_ascii_case("YES") || value.eq_ignore_ascii_case("NO") =>
        {
            return vec![ValueToken::Bare(value.to_ascii_uppercase())];
        }
        (ValueStyle::Integer, Some(value))
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) =>
        {
            return vec![ValueToken::Bare(value.to_string())];
        }
        _ => {}
    }

    let mut tokens: Vec<ValueToken> = Vec::with_capacity(entry.value.len().max(1));
    let mut values = entry.value.iter();
    if style == ValueStyle::TimeList {
        if let Some(head) = values.next() {
            tokens.push(ValueToken::Bare(head.trim().to_string()));
        }
    }
    tokens.extend(values.map(|value| ValueToken::quoted(value)));
    if tokens.is_empty() {
        tokens.push(ValueToken::Quoted(String::new()));
    }
    tokens
}

/// Fold one logical line. Every returned line is shorter than `max`
/// characters unless it holds a single bare token that cannot be split.
/// A quoted token is only split when it cannot fit on a line by itself.
fn fold(keyword: &str, values: &[ValueToken], max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = format!("{keyword}=");
    let mut has_value = false;

    for (index, token) in values.iter().enumerate() {
        let separator = if index + 1 == values.len() { ";" } else { "," };
        let piece = format!("{}{separator}", token.render());
        if char_len(&current) + char_len(&piece) < max {
            current.push_str(&piece);
            has_value = true;
            continue;
        }
        if char_len(&piece) < max {
            // Fits on a line of its own; a first token leaves `KEYWORD=` alone.
            lines.push(std::mem::take(&mut current));
            current.push_str(&piece);
            has_value = true;
            continue;
        }
        if has_value {
            lines.push(std::mem::take(&mut current));
            has_value = false;
        }
        match token {
            ValueToken::Bare(_) => {
                current.push_str(&piece);
                has_value = true;
            }
            ValueToken::Quoted(text) => {
                split_quoted(text, separator, max, &mut current, &mut lines);
                has_value = true;
            }
        }
    }
    lines.push(current);
    lines
}

/// Emit an over-long quoted string as adjacent quoted segments, each on its
/// own line. The final segment carries the separator and stays in `current`.
fn split_quoted(
    text: &str,
    separator: &str,
    max: usize,
    current: &mut String,
    lines: &mut Vec<String>,
) {
    let mut rest: Vec<char> = text.chars().collect();
    loop {
        let used = char_len(current);
        let room = max.saturating_sub(1 + used + 2);
        if rest.len() + separator.len() <= room {
            current.push('"');
            current.extend(rest.iter());
            current.push('"');
            current.push_str(separator);
            return;
        }
        if room == 0 {
            lines.push(std::mem::take(current));
            continue;
        }
        let tail = rest.split_off(room.min(rest.len()));
        current.push('"');
        current.extend(rest.iter());
        current.push('"');
        lines.push(std::mem::take(current));
        rest = tail;
    }
}

fn data_token(cell: &CubeCell, missing_marker: &str) -> String {
    match cell {
        CubeCell::Figure(value) if is_numeric_figure(value) => value.clone(),
        CubeCell::Figure(value) => ValueToken::quoted(value).render(),
        CubeCell::Missing => ValueToken::quoted(missing_marker).render(),
    }
}

/// Plain decimal number: optional sign, digits, optional fraction.
pub fn is_numeric_figure(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let has_digits = !whole.is_empty() || fraction.is_some_and(|f| !f.is_empty());
    has_digits && digits(whole) && fraction.is_none_or(|f| !f.is_empty() && digits(f))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
