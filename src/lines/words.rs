//! Word boundary detection within a single line
//!
//! Columns are character indices, matching the rest of the line store.

/// Character categories for word movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Whitespace characters (space, tab, etc.)
    Whitespace,
    /// Alphanumeric characters and underscore
    Alphanumeric,
    /// Symbols and punctuation
    Symbol,
}

/// Classify a character for word boundary detection
pub fn classify_char(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Alphanumeric
    } else {
        CharClass::Symbol
    }
}

/// Column of the start of the next word, or the line length when there is none
///
/// ```
/// use monster_weft::lines::words::next_word;
///
/// assert_eq!(next_word("hello world", 0), 6);
/// assert_eq!(next_word("foo->bar", 0), 3);
/// ```
pub fn next_word(text: &str, start: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if start >= len {
        return len;
    }

    let mut pos = start;
    let start_class = classify_char(chars[pos]);

    while pos < len && classify_char(chars[pos]) == start_class {
        pos += 1;
    }

    if start_class != CharClass::Whitespace {
        while pos < len && classify_char(chars[pos]) == CharClass::Whitespace {
            pos += 1;
        }
    }

    pos
}

/// Column of the start of the word before `start`
///
/// ```
/// use monster_weft::lines::words::prev_word;
///
/// assert_eq!(prev_word("hello world", 11), 6);
/// assert_eq!(prev_word("foo->bar", 8), 5);
/// ```
pub fn prev_word(text: &str, start: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let start = start.min(chars.len());
    if start == 0 {
        return 0;
    }

    let mut pos = start - 1;

    while pos > 0 && classify_char(chars[pos]) == CharClass::Whitespace {
        pos -= 1;
    }

    let target_class = classify_char(chars[pos]);
    if target_class == CharClass::Whitespace {
        return pos + 1;
    }

    while pos > 0 && classify_char(chars[pos - 1]) == target_class {
        pos -= 1;
    }

    pos
}

/// Column of the first non-whitespace character (or the line length)
pub fn first_non_blank(text: &str) -> usize {
    text.chars()
        .take_while(|c| classify_char(*c) == CharClass::Whitespace)
        .count()
}

/// Bounds `(start, end)` of the run of same-class characters touching `col`.
/// At the end of a line the run before the column is used.
pub fn word_bounds(text: &str, col: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len == 0 {
        return (0, 0);
    }

    let anchor = col.min(len - 1);
    let class = classify_char(chars[anchor]);

    let mut start = anchor;
    while start > 0 && classify_char(chars[start - 1]) == class {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < len && classify_char(chars[end]) == class {
        end += 1;
    }
    (start, end)
}
