pub mod gallery;

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};

pub use gallery::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownContent(pub String);

/// Timezone in which card dates are shown.
///
/// `Local` follows the system timezone. A fixed zone comes from `UTC`, `JST`
/// or a `+HH:MM` / `-HH:MM` offset.
///
/// # Example
/// ```
/// use repo_gallery::formatter::DisplayTimezone;
///
/// assert_eq!(
///     DisplayTimezone::parse("JST"),
///     DisplayTimezone::parse("+09:00")
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTimezone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayTimezone {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "local" | "Local" => Some(Self::Local),
            "UTC" | "utc" | "Z" => FixedOffset::east_opt(0).map(Self::Fixed),
            "JST" => FixedOffset::east_opt(9 * 3600).map(Self::Fixed),
            offset => offset.parse::<FixedOffset>().ok().map(Self::Fixed),
        }
    }
}

/// Calendar date of `instant` in year/month/day order without zero padding,
/// e.g. `2024/1/2`
pub fn format_card_date(instant: DateTime<Utc>, timezone: DisplayTimezone) -> String {
    const CARD_DATE_FORMAT: &str = "%Y/%-m/%-d";

    match timezone {
        DisplayTimezone::Local => instant.with_timezone(&Local).format(CARD_DATE_FORMAT),
        DisplayTimezone::Fixed(offset) => instant.with_timezone(&offset).format(CARD_DATE_FORMAT),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(
            DisplayTimezone::parse("JST"),
            Some(DisplayTimezone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap()))
        );
        assert_eq!(
            DisplayTimezone::parse("-05:30"),
            Some(DisplayTimezone::Fixed(
                FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap()
            ))
        );
        assert_eq!(DisplayTimezone::parse("local"), Some(DisplayTimezone::Local));
        assert_eq!(DisplayTimezone::parse("Mars/Olympus"), None);
    }

    #[test]
    fn test_card_date_is_unpadded_and_follows_timezone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let utc = DisplayTimezone::parse("UTC").unwrap();
        let jst = DisplayTimezone::parse("JST").unwrap();

        assert_eq!(format_card_date(instant, utc), "2024/1/1");
        assert_eq!(format_card_date(instant, jst), "2024/1/2");

        let december = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(format_card_date(december, utc), "2023/12/25");
    }
}
