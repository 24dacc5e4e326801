//! Card date formatting and validation.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex_lite::Regex;

use crate::error::UserInputError;

static CARD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})\.(\d{2})\.(\d{2})(?: \(([A-Za-z]{3})\))?$").expect("valid date pattern")
});

/// `26.10.14 (Wed)`
pub fn format_card_date(date: NaiveDate) -> String {
    date.format("%y.%m.%d (%a)").to_string()
}

/// Parse `YY.MM.DD` or `YY.MM.DD (Ddd)`. The weekday suffix is not checked
/// against the date; it is rewritten on normalization.
pub fn parse_card_date(text: &str) -> Result<NaiveDate, UserInputError> {
    let text = text.trim();
    let invalid = || UserInputError::InvalidDate(text.to_string());
    let caps = CARD_DATE.captures(text).ok_or_else(invalid)?;
    let field = |i: usize| -> Result<u32, UserInputError> {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(invalid)
    };
    let year = 2000 + i32::try_from(field(1)?).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?).ok_or_else(invalid)
}

/// Validate and rewrite into the full `YY.MM.DD (Ddd)` form.
pub fn normalize_card_date(text: &str) -> Result<String, UserInputError> {
    parse_card_date(text).map(format_card_date)
}

/// Sunday-to-Saturday week containing `today`, e.g. `Oct 11 - Oct 17, 2026`.
pub fn week_badge(today: NaiveDate) -> String {
    let from_sunday = u64::from(today.weekday().num_days_from_sunday());
    let start = today.checked_sub_days(Days::new(from_sunday)).unwrap_or(today);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    format!(
        "{} - {}, {}",
        start.format("%b %-d"),
        end.format("%b %-d"),
        end.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(format_card_date(day(2026, 10, 14)), "26.10.14 (Wed)");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_card_date("26.10.14").unwrap(), day(2026, 10, 14));
        assert_eq!(parse_card_date(" 26.10.14 (Wed) ").unwrap(), day(2026, 10, 14));
        assert_eq!(normalize_card_date("26.10.15").unwrap(), "26.10.15 (Thu)");
    }

    #[test]
    fn test_rejects_invalid() {
        for bad in ["2026-10-14", "26.13.01", "26.02.30", "26.10.14 Wed", ""] {
            assert!(
                matches!(parse_card_date(bad), Err(UserInputError::InvalidDate(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_week_badge() {
        assert_eq!(week_badge(day(2026, 10, 14)), "Oct 11 - Oct 17, 2026");
        assert_eq!(week_badge(day(2026, 10, 11)), "Oct 11 - Oct 17, 2026");
        assert_eq!(week_badge(day(2026, 12, 31)), "Dec 27 - Jan 2, 2027");
    }
}
