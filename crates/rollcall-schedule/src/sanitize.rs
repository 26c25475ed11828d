//! Title cleanup: strip every date/time fragment and keep the rest.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::{DATE_PATTERNS, TIME_PATTERNS};

/// Title used when nothing but date/time fragments was written.
pub const UNNAMED_EVENT: &str = "未命名活動";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove all date and time matches (every pattern, in priority order, whether
/// or not it contributed to the parse), collapse whitespace, trim. Never
/// returns an empty title.
pub fn sanitize(text: &str) -> String {
    let mut cleaned = text.to_string();

    for pattern in DATE_PATTERNS {
        let stripped = blank_out(
            &cleaned,
            pattern.captures(&cleaned).iter().filter_map(|c| c.get(0)),
        );
        cleaned = stripped;
    }
    for pattern in TIME_PATTERNS {
        let stripped = pattern.regex().replace_all(&cleaned, " ").into_owned();
        cleaned = stripped;
    }

    let title = WHITESPACE_RUN.replace_all(&cleaned, " ").trim().to_string();
    if title.is_empty() {
        UNNAMED_EVENT.to_string()
    } else {
        title
    }
}

fn blank_out<'t>(text: &'t str, matches: impl Iterator<Item = regex::Match<'t>>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in matches {
        out.push_str(&text[last..m.start()]);
        out.push(' ');
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}
