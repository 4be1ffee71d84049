use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    // US order, month first
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
];

// %#z also takes hour-only offsets such as "+02"
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Time of a ping as found in the source file.
///
/// Unparseable values are kept instead of failing the row. They order after
/// every valid time, which puts them at the end of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    Valid(DateTime<Utc>),
    Invalid,
}

impl Timestamp {
    /// Parse with a handful of common layouts. Times without an offset are
    /// taken as UTC.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|x| !x.is_empty()) else {
            return Self::Invalid;
        };

        if let Ok(x) = DateTime::parse_from_rfc3339(raw) {
            return Self::Valid(x.with_timezone(&Utc));
        }
        if let Ok(x) = DateTime::parse_from_rfc2822(raw) {
            return Self::Valid(x.with_timezone(&Utc));
        }
        for format in OFFSET_FORMATS {
            if let Ok(x) = DateTime::parse_from_str(raw, format) {
                return Self::Valid(x.with_timezone(&Utc));
            }
        }
        // trailing Z without the T separator, e.g. "2024-01-01 10:00:00Z"
        let naive = raw.strip_suffix('Z').unwrap_or(raw);
        for format in NAIVE_FORMATS {
            if let Ok(x) = NaiveDateTime::parse_from_str(naive, format) {
                return Self::Valid(x.and_utc());
            }
        }
        for format in DATE_FORMATS {
            if let Ok(x) = NaiveDate::parse_from_str(raw, format) {
                if let Some(x) = x.and_hms_opt(0, 0, 0) {
                    return Self::Valid(x.and_utc());
                }
            }
        }

        Self::Invalid
    }

    pub fn valid(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid(x) => Some(x),
            Self::Invalid => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(h: u32, m: u32, s: u32) -> Timestamp {
        Timestamp::Valid(Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap())
    }

    #[test]
    fn layouts() {
        assert_eq!(Timestamp::parse(Some("2024-03-01T10:00:00Z")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01T12:00:00+02:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01 10:00:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01 10:00:00Z")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01 12:00:00+02:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01T10:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024/03/01 10:05:30")), utc(10, 5, 30));
        assert_eq!(Timestamp::parse(Some("Fri, 01 Mar 2024 10:00:00 +0000")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01")), utc(0, 0, 0));
    }

    #[test]
    fn month_first() {
        assert_eq!(Timestamp::parse(Some("03/01/2024 10:00:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("03/01/2024 10:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("03/01/2024")), utc(0, 0, 0));
        assert_eq!(Timestamp::parse(Some("Mar 1, 2024 10:00:00")), utc(10, 0, 0));
        assert_eq!(Timestamp::parse(Some("Mar 01, 2024 10:05")), utc(10, 5, 0));
    }

    #[test]
    fn short_offsets() {
        assert_eq!(Timestamp::parse(Some("2024-03-01 10:00:00+02")), utc(8, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01 10:00:00-01")), utc(11, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01T10:00:00+0200")), utc(8, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01T10:00:00+02")), utc(8, 0, 0));
        assert_eq!(Timestamp::parse(Some("2024-03-01 10:00:00+0200")), utc(8, 0, 0));
    }

    #[test]
    fn fractional_seconds() {
        let x = Timestamp::parse(Some("2024-03-01 10:00:00.250")).valid().unwrap();
        assert_eq!(x.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn invalid() {
        assert_eq!(Timestamp::parse(None), Timestamp::Invalid);
        assert_eq!(Timestamp::parse(Some("")), Timestamp::Invalid);
        assert_eq!(Timestamp::parse(Some("yesterday")), Timestamp::Invalid);
        assert_eq!(Timestamp::parse(Some("2024-13-01 10:00:00")), Timestamp::Invalid);
    }

    #[test]
    fn invalid_sorts_last() {
        let mut xs = vec![Timestamp::Invalid, utc(10, 0, 0), utc(9, 0, 0)];
        xs.sort();
        assert_eq!(xs, vec![utc(9, 0, 0), utc(10, 0, 0), Timestamp::Invalid]);
    }
}
