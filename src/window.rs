//! Time windows for range queries.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::error::GatewayError;

/// Look-back used when the request does not carry a `days` parameter.
pub const DEFAULT_DAYS_BACK: u32 = 7;

/// A closed interval `[start, end]`, always `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(serialize_with = "iso8601")]
    start: DateTime<Utc>,
    #[serde(serialize_with = "iso8601")]
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// The window covering the `days_back` days that end at `end`.
    pub fn ending_at(end: DateTime<Utc>, days_back: u32) -> Result<Self, GatewayError> {
        let start = TimeDelta::try_days(i64::from(days_back))
            .and_then(|delta| end.checked_sub_signed(delta))
            .ok_or_else(|| {
                GatewayError::Validation(format!("days out of range: {days_back}"))
            })?;
        Ok(Self { start, end })
    }

    /// The window covering the last `days_back` days.
    pub fn last_days(days_back: u32) -> Result<Self, GatewayError> {
        Self::ending_at(Utc::now(), days_back)
    }

    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }

    /// `start` as sent to the store and echoed in the envelope.
    pub fn start_iso(&self) -> String { format_iso(self.start) }

    /// `end` as sent to the store and echoed in the envelope.
    pub fn end_iso(&self) -> String { format_iso(self.end) }
}

/// Parses the raw `days` query value. Absent means [`DEFAULT_DAYS_BACK`].
pub fn parse_days(raw: Option<&str>) -> Result<u32, GatewayError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_DAYS_BACK);
    };
    raw.trim().parse::<u32>().map_err(|_| {
        GatewayError::Validation(format!(
            "invalid `days` parameter `{raw}`: expected a non-negative integer"
        ))
    })
}

fn format_iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso8601<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_iso(*t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_spans_exactly_the_requested_days() {
        for days in [0, 1, 3, 7, 365, 10_000] {
            let w = TimeWindow::ending_at(noon(), days).unwrap();
            assert!(w.start() <= w.end());
            assert_eq!(w.end() - w.start(), TimeDelta::days(i64::from(days)));
        }
    }

    #[test]
    fn zero_days_is_a_point() {
        let w = TimeWindow::ending_at(noon(), 0).unwrap();
        assert_eq!(w.start(), w.end());
    }

    #[test]
    fn huge_look_back_is_rejected() {
        let err = TimeWindow::ending_at(noon(), u32::MAX).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn serializes_as_iso8601() {
        let w = TimeWindow::ending_at(noon(), 3).unwrap();
        let json = serde_json::to_value(w).unwrap();
        assert_eq!(json["start"], "2024-03-07T12:00:00.000Z");
        assert_eq!(json["end"], "2024-03-10T12:00:00.000Z");
        assert_eq!(w.start_iso(), "2024-03-07T12:00:00.000Z");
    }

    #[test]
    fn days_defaults_to_seven() {
        assert_eq!(parse_days(None).unwrap(), 7);
    }

    #[test]
    fn days_parses_integers() {
        assert_eq!(parse_days(Some("3")).unwrap(), 3);
        assert_eq!(parse_days(Some(" 365 ")).unwrap(), 365);
        assert_eq!(parse_days(Some("0")).unwrap(), 0);
    }

    #[test]
    fn malformed_days_fail_validation() {
        for raw in ["", "abc", "1.5", "-1", "7d", "99999999999"] {
            let err = parse_days(Some(raw)).unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)), "{raw}");
        }
    }
}
