use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};

/// Dashboard reporting window, resolved from the `period` query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days7,
    Days30,
    Days90,
    Months6,
    Months12,
}

impl Period {
    /// Unrecognized or missing tokens fall back to the 30-day window.
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("7days") => Period::Days7,
            Some("90days") => Period::Days90,
            Some("6months") => Period::Months6,
            Some("12months") => Period::Months12,
            _ => Period::Days30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Days7 => "7days",
            Period::Days30 => "30days",
            Period::Days90 => "90days",
            Period::Months6 => "6months",
            Period::Months12 => "12months",
        }
    }

    /// Start of the window in epoch millis, at day granularity (00:00 UTC).
    ///
    /// Day windows include today, so `7days` starts at the beginning of the
    /// day six days back. Month windows keep the day-of-month.
    pub fn window_start(&self, now: DateTime<Utc>) -> i64 {
        let today = now.date_naive();
        let start_day = match self {
            Period::Days7 => today.checked_sub_days(Days::new(6)),
            Period::Days30 => today.checked_sub_days(Days::new(29)),
            Period::Days90 => today.checked_sub_days(Days::new(89)),
            Period::Months6 => today.checked_sub_months(Months::new(6)),
            Period::Months12 => today.checked_sub_months(Months::new(12)),
        }
        .unwrap_or(today);

        start_day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
    }
}

/// Parse a `from`/`to` filter value as RFC 3339 or a bare `YYYY-MM-DD`
/// (midnight UTC). Anything else is ignored by the caller.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    value
        .parse::<NaiveDate>()
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn unknown_tokens_fall_back_to_thirty_days() {
        assert_eq!(Period::parse(None), Period::Days30);
        assert_eq!(Period::parse(Some("fortnight")), Period::Days30);
        assert_eq!(Period::parse(Some("7days")), Period::Days7);
        assert_eq!(Period::parse(Some("12months")), Period::Months12);
    }

    #[test]
    fn seven_day_window_starts_six_days_back_at_midnight() {
        let now = at(2024, 3, 15, 17);
        let start = Period::Days7.window_start(now);
        assert_eq!(start, at(2024, 3, 9, 0).timestamp_millis());
    }

    #[test]
    fn month_windows_keep_day_of_month() {
        let now = at(2024, 8, 15, 9);
        let start = Period::Months6.window_start(now);
        assert_eq!(start, at(2024, 2, 15, 0).timestamp_millis());
    }

    #[test]
    fn month_window_clamps_missing_day() {
        // Aug 31 minus six months lands on Feb 29 in a leap year
        let now = at(2024, 8, 31, 12);
        let start = Period::Months6.window_start(now);
        assert_eq!(start, at(2024, 2, 29, 0).timestamp_millis());
    }

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        assert_eq!(
            parse_timestamp("2024-01-02T03:04:05Z"),
            Some(at(2024, 1, 2, 3).timestamp_millis() + 4 * 60_000 + 5_000)
        );
        assert_eq!(
            parse_timestamp("2024-01-02"),
            Some(at(2024, 1, 2, 0).timestamp_millis())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
