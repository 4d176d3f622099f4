use chrono::NaiveDate;
use tracing::debug;

/// Text stamped onto images whose metadata carries no capture date.
pub const NO_DATE_TEXT: &str = "no date information";

/// Turn a raw EXIF datetime ("2005:07:30 07:22:46") into display text ("2005-07-30").
///
/// Never fails: absent input yields [`NO_DATE_TEXT`], otherwise the date part
/// comes back as written with `:` swapped for `-`.
pub fn parse_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NO_DATE_TEXT.to_string();
    };

    let date_part = raw.split(' ').next().unwrap_or_default();
    if NaiveDate::parse_from_str(date_part, "%Y:%m:%d").is_err() {
        debug!("Capture date {:?} is not a calendar date", date_part);
    }

    date_part.replace(':', "-")
}
