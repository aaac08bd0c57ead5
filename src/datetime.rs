//! Natural-language dates for the event forms ("tomorrow 6pm", "sat noon").

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

const DAY_AND_MONTH_NAMES: [&str; 19] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "january",
    "february",
    "march",
    "april",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "may",
];

/// Shortest prefix accepted as an abbreviation ("sat", "sept", "thurs").
const MIN_ABBREVIATION_LEN: usize = 3;

/// Expand day and month abbreviations, which fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            if word.len() < MIN_ABBREVIATION_LEN {
                return word.to_string();
            }
            DAY_AND_MONTH_NAMES
                .iter()
                .find(|name| name.starts_with(word))
                .map_or_else(|| word.to_string(), |name| name.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the input names a time of day (am/pm, HH:MM, noon, midnight, "at 3").
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    let bytes = lower.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        // "6pm", "6 pm"
        if (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm') {
            if i > 0 && bytes[i - 1].is_ascii_digit() {
                return true;
            }
            if i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit() {
                return true;
            }
        }
        // "15:00"
        if b == b':'
            && i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
    }

    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

fn to_utc(local: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("{} does not exist in the local time zone", local))
}

/// Parse a natural-language date/time in local time.
///
/// Input without a time of day means the start of that day.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

    if has_time_component(input) {
        to_utc(dt)
    } else {
        to_utc(dt.date().and_time(NaiveTime::MIN))
    }
}

/// Format for display in the local time zone.
pub fn format_local(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format("%a %b %-d %Y, %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn time_component_am_pm() {
        assert!(has_time_component("tomorrow 6pm"));
        assert!(has_time_component("sat 3 pm"));
        assert!(has_time_component("9AM"));
    }

    #[test]
    fn time_component_colon_and_keywords() {
        assert!(has_time_component("march 20 9:30"));
        assert!(has_time_component("tomorrow noon"));
        assert!(has_time_component("friday at 15"));
        assert!(has_time_component("at 9"));
    }

    #[test]
    fn no_time_component() {
        assert!(!has_time_component("tomorrow"));
        assert!(!has_time_component("next friday"));
        assert!(!has_time_component("december"));
        assert!(!has_time_component("camp"));
    }

    #[test]
    fn expands_abbreviations() {
        assert_eq!(expand_abbreviations("Sat 3pm"), "saturday 3pm");
        assert_eq!(expand_abbreviations("sept 5"), "september 5");
        assert_eq!(expand_abbreviations("thurs noon"), "thursday noon");
        assert_eq!(expand_abbreviations("next friday"), "next friday");
    }

    #[test]
    fn short_and_unrelated_words_are_kept() {
        assert_eq!(expand_abbreviations("at 9 on mar 3"), "at 9 on march 3");
        assert_eq!(expand_abbreviations("now"), "now");
        assert_eq!(expand_abbreviations("tomorrow 6pm"), "tomorrow 6pm");
    }

    #[test]
    fn date_only_is_local_midnight() {
        let dt = parse_datetime("march 20").unwrap().with_timezone(&Local);
        assert_eq!((dt.month(), dt.day()), (3, 20));
        assert_eq!((dt.hour(), dt.minute()), (0, 0));
    }

    #[test]
    fn timed_input_keeps_time() {
        let dt = parse_datetime("tomorrow 3pm").unwrap().with_timezone(&Local);
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn invalid_input() {
        assert!(parse_datetime("not a date at all xyz").is_err());
    }
}
