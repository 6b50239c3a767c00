use chrono::NaiveDate;

/// Current date from the browser clock.
///
/// This is the only place the client reads the wall clock; everything in
/// the aggregation engine takes the date as a parameter instead.
pub fn today() -> NaiveDate {
    use js_sys::Date;
    let now = Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1, // JavaScript months are 0-indexed
        now.get_date(),
    )
    .unwrap_or_default()
}

/// Format a date the way `<input type="date">` and the backend expect it.
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        assert_eq!(format_iso(date), "2025-06-05");
    }

    #[test]
    fn test_format_iso_round_trips_with_parse() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(shared::parse_calendar_date(&format_iso(date)), Some(date));
    }
}
