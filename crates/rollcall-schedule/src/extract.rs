//! Date/time extraction from casual scheduling messages.
//!
//! Recognition is an ordered list of independent matchers, first match wins.
//! New idioms are added as a new [`DatePattern`] or [`TimePattern`] variant
//! and a slot in the corresponding order array.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ============================================================================
// Static Regexes
// ============================================================================

static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})").unwrap());

/// Must not be followed by another digit; see [`guarded_captures`].
static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})[-/]([0-9]{1,2})").unwrap());

static MONTH_DAY_IDEOGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})\s*月\s*([0-9]{1,2})\s*日").unwrap());

static COLON_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(上午|下午|AM|PM)?\s*([0-9]{1,2})[:：]([0-9]{2})").unwrap());

static MARKER_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(上午|下午)?\s*([0-9]{1,2})\s*(?:點|時)\s*(?:([0-9]{1,2})\s*分?)?").unwrap()
});

/// Date matchers in priority order.
pub const DATE_PATTERNS: [DatePattern; 3] = [
    DatePattern::YearMonthDay,
    DatePattern::MonthDay,
    DatePattern::MonthDayIdeograph,
];

/// Time matchers in priority order. Colon forms win by order, not position.
pub const TIME_PATTERNS: [TimePattern; 2] = [TimePattern::Colon, TimePattern::HourMarker];

/// 12-hour clock disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_uppercase().as_str() {
            "AM" | "上午" => Some(Meridiem::Am),
            "PM" | "下午" => Some(Meridiem::Pm),
            _ => None,
        }
    }
}

/// A clock reading as written, before meridiem resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    /// Hour on a 24-hour clock. PM adds 12 below noon, AM maps 12 to 0, no
    /// marker keeps the hour as written.
    pub fn hour24(&self) -> u32 {
        match self.meridiem {
            Some(Meridiem::Pm) if self.hour < 12 => self.hour + 12,
            Some(Meridiem::Am) if self.hour == 12 => 0,
            _ => self.hour,
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub date: NaiveDate,
    pub time: Option<ClockTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `2024-09-10`, `2024/9/10`
    YearMonthDay,
    /// `9/10`, `09-10`; year comes from the reference date.
    MonthDay,
    /// `9月10日`
    MonthDayIdeograph,
}

impl DatePattern {
    pub fn regex(&self) -> &'static Regex {
        match self {
            DatePattern::YearMonthDay => &YEAR_MONTH_DAY,
            DatePattern::MonthDay => &MONTH_DAY,
            DatePattern::MonthDayIdeograph => &MONTH_DAY_IDEOGRAPH,
        }
    }

    /// All non-overlapping matches, left to right.
    pub fn captures<'t>(&self, text: &'t str) -> Vec<Captures<'t>> {
        match self {
            DatePattern::MonthDay => guarded_captures(self.regex(), text),
            _ => self.regex().captures_iter(text).collect(),
        }
    }

    /// `None` when the pattern does not occur. `Some(None)` when it occurs
    /// but names an impossible date such as `2/30`.
    pub fn find(&self, text: &str, reference_year: i32) -> Option<Option<NaiveDate>> {
        let caps = self.captures(text).into_iter().next()?;
        let date = match self {
            DatePattern::YearMonthDay => {
                let year = number(&caps, 1)?;
                NaiveDate::from_ymd_opt(year as i32, number(&caps, 2)?, number(&caps, 3)?)
            }
            DatePattern::MonthDay | DatePattern::MonthDayIdeograph => {
                NaiveDate::from_ymd_opt(reference_year, number(&caps, 1)?, number(&caps, 2)?)
            }
        };
        Some(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePattern {
    /// `19:30`, `下午3:00`, `pm 7:15`
    Colon,
    /// `7點`, `下午3點20分`, `8時`
    HourMarker,
}

impl TimePattern {
    pub fn regex(&self) -> &'static Regex {
        match self {
            TimePattern::Colon => &COLON_TIME,
            TimePattern::HourMarker => &MARKER_TIME,
        }
    }

    pub fn find(&self, text: &str) -> Option<ClockTime> {
        let caps = self.regex().captures(text)?;
        let meridiem = caps
            .get(1)
            .and_then(|m| Meridiem::from_marker(m.as_str()));
        let hour = number(&caps, 2)?;
        let minute = match self {
            TimePattern::Colon => number(&caps, 3)?,
            TimePattern::HourMarker => number(&caps, 3).unwrap_or(0),
        };
        Some(ClockTime {
            hour,
            minute,
            meridiem,
        })
    }
}

/// Locate a date and an optional time in `text`. Month-day forms take their
/// year from `reference`, so the same text can parse differently either side
/// of New Year. Time search runs over the whole original text.
pub fn extract(text: &str, reference: NaiveDate) -> Option<Extraction> {
    for pattern in DATE_PATTERNS {
        match pattern.find(text, reference.year()) {
            None => continue,
            Some(None) => {
                tracing::debug!("{pattern:?} matched an impossible date in {text:?}");
                return None;
            }
            Some(Some(date)) => {
                return Some(Extraction {
                    date,
                    time: extract_time(text),
                });
            }
        }
    }
    None
}

pub fn extract_time(text: &str) -> Option<ClockTime> {
    TIME_PATTERNS.iter().find_map(|p| p.find(text))
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// Matches of `re` whose end is not immediately followed by an ASCII digit.
/// A rejected candidate is retried one byte later, which reproduces a
/// `(?!\d)` lookahead for patterns that start on a digit.
fn guarded_captures<'t>(re: &Regex, text: &'t str) -> Vec<Captures<'t>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let followed_by_digit = text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if followed_by_digit {
            pos = whole.start() + 1;
            continue;
        }
        pos = whole.end().max(whole.start() + 1);
        out.push(caps);
    }
    out
}
