use std::sync::OnceLock;

use regex::Regex;

static ISBN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn isbn_pattern() -> &'static Regex {
    ISBN_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:ISBN(?:-1[03])?:?\s*)?((?:97[89][-\s]?)?\d{1,5}[-\s]?\d{1,7}[-\s]?\d{1,7}[-\s]?[\dX])",
        )
        .expect("ISBN pattern compiles")
    })
}

/// Removes the separators an ISBN may carry (hyphens and whitespace).
pub fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// The canonical ISBN-shape predicate: after separator removal, exactly 13
/// digits, or 10 characters where the first 9 are digits and the last is a
/// digit or the `X` check character. Both extraction and catalog dispatch use
/// this one check.
pub fn is_isbn_shaped(text: &str) -> bool {
    let clean = strip_separators(text);
    match clean.len() {
        13 => clean.bytes().all(|b| b.is_ascii_digit()),
        10 => {
            let bytes = clean.as_bytes();
            bytes[..9].iter().all(|b| b.is_ascii_digit())
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X' || bytes[9] == b'x')
        }
        _ => false,
    }
}

/// Extracts an ISBN from free-form text (pasted store URL, labeled ISBN,
/// bare digit run). Candidates that do not pass `is_isbn_shaped` after
/// separator removal are skipped, so short digit runs inside a title such as
/// "1984" never count as an ISBN.
pub fn extract_isbn(text: &str) -> Option<String> {
    for captures in isbn_pattern().captures_iter(text) {
        let Some(group) = captures.get(1) else {
            continue;
        };
        let candidate = strip_separators(group.as_str());
        if is_isbn_shaped(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// The search key used downstream: the extracted ISBN when one is present,
/// otherwise the trimmed input unchanged. Never fails.
pub fn normalize_query(text: &str) -> String {
    extract_isbn(text).unwrap_or_else(|| text.trim().to_string())
}
