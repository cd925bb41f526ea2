//! Relative and absolute date resolution
//!
//! Resolves phrases like "tomorrow", "next friday" or "in 3 days" against an
//! injected [`Clock`], falling back to a scan for explicit calendar dates.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use concierge_core::{AppointmentField, Clock, SystemClock, ValidationError, ValidationResult};

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static IN_N_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"in\s+(\d+)\s+days?").expect("in-N-days pattern"));

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("ISO date pattern")
});

static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("US date pattern"));

// "january 5", "jan. 5th, 2025"
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({MONTHS})\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("month-day pattern")
});

// "5 january", "5th of jan 2025"
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("day-month pattern")
});

static WEEKDAY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday pattern")
});

/// A resolved calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedDate {
    pub date: NaiveDate,
}

impl ResolvedDate {
    /// `YYYY-MM-DD`, the stored form
    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Human form used in acknowledgments, e.g. "January 05, 2025"
    pub fn long_form(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

/// Date resolver anchored to a clock
#[derive(Clone)]
pub struct DateResolver {
    clock: Arc<dyn Clock>,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl DateResolver {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Resolve free text to a calendar date.
    ///
    /// Rules are tried in order; the first that applies decides:
    /// 1. `today`, 2. `tomorrow` (exact match only)
    /// 3. `next week` (+7), 4. `next month` (+30)
    /// 5. `next <weekday>` / `coming <weekday>`, strictly after today
    /// 6. `in N days`
    /// 7. an explicit date or bare weekday anywhere in the text
    pub fn resolve(&self, text: &str) -> ValidationResult<ResolvedDate> {
        let today = self.clock.today();
        let lower = text.trim().to_lowercase();

        resolve_relative(&lower, today)
            .or_else(|| scan_explicit(&lower, today))
            .map(|date| ResolvedDate { date })
            .ok_or_else(|| unparseable(text))
    }
}

fn resolve_relative(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    if lower == "today" {
        return Some(today);
    }
    if lower == "tomorrow" {
        return add_days(today, 1);
    }
    if lower.contains("next week") {
        return add_days(today, 7);
    }
    if lower.contains("next month") {
        return add_days(today, 30);
    }

    for (name, weekday) in WEEKDAYS {
        if lower.contains(&format!("next {}", name))
            || lower.contains(&format!("coming {}", name))
        {
            let ahead = days_until(today.weekday(), weekday);
            return add_days(today, if ahead == 0 { 7 } else { ahead });
        }
    }

    if lower.contains("in") && lower.contains("day") {
        if let Some(caps) = IN_N_DAYS.captures(lower) {
            // Too many digits for u64 is as unresolvable as calendar overflow
            let n: u64 = caps[1].parse().ok()?;
            return add_days(today, n);
        }
    }

    None
}

/// First date-shaped token that forms a real calendar date
fn scan_explicit(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    let year = today.year();

    first_valid(&ISO_DATE, lower, |c| ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?))
        .or_else(|| first_valid(&US_DATE, lower, |c| ymd(num(c, 3)?, num(c, 1)?, num(c, 2)?)))
        .or_else(|| {
            first_valid(&MONTH_DAY, lower, |c| {
                let y = c.get(3).map_or(Some(year), |m| m.as_str().parse().ok())?;
                ymd(y, month_number(&c[1])?, num(c, 2)?)
            })
        })
        .or_else(|| {
            first_valid(&DAY_MONTH, lower, |c| {
                let y = c.get(3).map_or(Some(year), |m| m.as_str().parse().ok())?;
                ymd(y, month_number(&c[2])?, num(c, 1)?)
            })
        })
        .or_else(|| {
            let caps = WEEKDAY_NAME.captures(lower)?;
            let weekday = WEEKDAYS
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, w)| *w)?;
            add_days(today, days_until(today.weekday(), weekday))
        })
}

fn first_valid<F>(pattern: &Regex, text: &str, build: F) -> Option<NaiveDate>
where
    F: Fn(&Captures<'_>) -> Option<NaiveDate>,
{
    pattern.captures_iter(text).find_map(|caps| build(&caps))
}

fn num<T: std::str::FromStr>(caps: &Captures<'_>, idx: usize) -> Option<T> {
    caps.get(idx)?.as_str().parse().ok()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Days from `from` forward to the next `to`, 0 when they coincide
fn days_until(from: Weekday, to: Weekday) -> u64 {
    let diff = to.num_days_from_monday() as i64 - from.num_days_from_monday() as i64;
    diff.rem_euclid(7) as u64
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

fn unparseable(text: &str) -> ValidationError {
    ValidationError::new(
        AppointmentField::Date,
        format!(
            "Could not parse date from '{}'. Please try formats like 'next Monday', 'tomorrow', 'in 3 days', or 'YYYY-MM-DD'.",
            text
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::FixedClock;

    // Monday
    fn resolver() -> DateResolver {
        DateResolver::new(Arc::new(FixedClock::ymd(2025, 1, 6).unwrap()))
    }

    fn iso(text: &str) -> String {
        resolver().resolve(text).unwrap().iso()
    }

    #[test]
    fn test_exact_keywords() {
        assert_eq!(iso("today"), "2025-01-06");
        assert_eq!(iso("  Tomorrow "), "2025-01-07");
    }

    #[test]
    fn test_next_week_and_month() {
        assert_eq!(iso("sometime next week"), "2025-01-13");
        assert_eq!(iso("next month please"), "2025-02-05");
    }

    #[test]
    fn test_next_weekday_strictly_after_today() {
        assert_eq!(iso("next Monday"), "2025-01-13");
        assert_eq!(iso("next friday"), "2025-01-10");
        assert_eq!(iso("this coming wednesday"), "2025-01-08");
        assert_eq!(iso("next sunday"), "2025-01-12");
    }

    #[test]
    fn test_in_n_days() {
        assert_eq!(iso("in 3 days"), "2025-01-09");
        assert_eq!(iso("maybe in 1 day"), "2025-01-07");
        assert_eq!(iso("in 0 days"), "2025-01-06");
    }

    #[test]
    fn test_in_days_without_number_falls_through() {
        assert!(resolver().resolve("in a few days").is_err());
        // Falls through to the explicit scan
        assert_eq!(iso("in two days, say 2025-01-09"), "2025-01-09");
    }

    #[test]
    fn test_day_overflow_is_error() {
        assert!(resolver().resolve("in 99999999999 days").is_err());
        assert!(resolver().resolve("in 999999999999999999999999 days").is_err());
    }

    #[test]
    fn test_explicit_numeric_dates() {
        assert_eq!(iso("2025-03-15"), "2025-03-15");
        assert_eq!(iso("on 2025/3/5 at noon"), "2025-03-05");
        assert_eq!(iso("03/15/2025"), "2025-03-15");
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(iso("January 5"), "2025-01-05");
        assert_eq!(iso("Jan 5th 2026"), "2026-01-05");
        assert_eq!(iso("march 14, 2025"), "2025-03-14");
        assert_eq!(iso("the 5th of Feb"), "2025-02-05");
        assert_eq!(iso("12 December 2025"), "2025-12-12");
    }

    #[test]
    fn test_bare_weekday_on_or_after_today() {
        assert_eq!(iso("monday"), "2025-01-06");
        assert_eq!(iso("on friday"), "2025-01-10");
    }

    #[test]
    fn test_invalid_calendar_dates_rejected() {
        assert!(resolver().resolve("2025-02-30").is_err());
        assert!(resolver().resolve("13/01/2025").is_err());
        assert!(resolver().resolve("february 31").is_err());
    }

    #[test]
    fn test_non_date_text() {
        for text in [
            "My name is John Doe",
            "Email is john.doe@example.com and phone 555-123-4567",
            "I want to book an appointment",
            "",
        ] {
            let err = resolver().resolve(text).unwrap_err();
            assert_eq!(err.field, AppointmentField::Date);
        }
    }

    #[test]
    fn test_error_message() {
        let err = resolver().resolve("whenever").unwrap_err();
        assert_eq!(
            err.message,
            "Could not parse date from 'whenever'. Please try formats like 'next Monday', 'tomorrow', 'in 3 days', or 'YYYY-MM-DD'."
        );
    }

    #[test]
    fn test_long_form() {
        let date = resolver().resolve("january 5").unwrap();
        assert_eq!(date.long_form(), "January 05, 2025");
        assert_eq!(date.to_string(), "2025-01-05");
    }
}
