//! Specifies how purchase dates are written to and read from JSON and query strings.
//!
//! Dates are always written as "YYYY-MM-DD". Clients may send either
//! "MM/DD/YYYY" or "YYYY-MM-DD".

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// The format dates are written in, e.g. "2024-03-01".
pub const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The month first format clients send, e.g. "03/01/2024".
pub const US_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[month]/[day]/[year]");

/// Parse a date in either of the accepted formats.
///
/// # Errors
///
/// Returns the error from the ISO parser if neither format matches.
pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    let text = text.trim();

    Date::parse(text, US_DATE_FORMAT).or_else(|_| Date::parse(text, ISO_DATE_FORMAT))
}

/// Write `date` as "YYYY-MM-DD".
pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date
        .format(ISO_DATE_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// Read a date in either of the accepted formats.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_date(&text).map_err(|_| {
        serde::de::Error::custom(format!(
            "invalid date \"{text}\", expected MM/DD/YYYY or YYYY-MM-DD"
        ))
    })
}

/// The same formats for optional dates, e.g. in query strings.
pub mod option {
    use serde::{Deserialize, Deserializer};
    use time::Date;

    /// Read an optional date. Blank strings count as missing.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => super::parse_date(&text).map(Some).map_err(|_| {
                serde::de::Error::custom(format!(
                    "invalid date \"{text}\", expected MM/DD/YYYY or YYYY-MM-DD"
                ))
            }),
            None => Ok(None),
        }
    }
}
