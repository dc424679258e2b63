use super::ScheduleError;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// a time of day or an offset from a trip's departure, in whole seconds.
/// written as "HH:MM:SS", where hours may exceed 24 for trips running past midnight.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOffset(pub u32);

impl TimeOffset {
    /// saturates at the largest representable offset.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> TimeOffset {
        TimeOffset::checked_from_hms(hours, minutes, seconds).unwrap_or(TimeOffset(u32::MAX))
    }

    /// None when the offset does not fit in a u32 of seconds.
    pub fn checked_from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<TimeOffset> {
        let total = hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;
        Some(TimeOffset(total))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn minutes(&self) -> f64 {
        self.0 as f64 / 60.0
    }
}

impl std::ops::Add for TimeOffset {
    type Output = TimeOffset;

    fn add(self, rhs: TimeOffset) -> TimeOffset {
        TimeOffset(self.0.saturating_add(rhs.0))
    }
}

impl FromStr for TimeOffset {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());
        let parts = s
            .trim()
            .split(':')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let offset = match parts.as_slice() {
            [h, m, sec] if *m < 60 && *sec < 60 => TimeOffset::checked_from_hms(*h, *m, *sec),
            [h, m] if *m < 60 => TimeOffset::checked_from_hms(*h, *m, 0),
            _ => None,
        };
        offset.ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOffset {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeOffset::from_str(&value)
    }
}

impl From<TimeOffset> for String {
    fn from(value: TimeOffset) -> Self {
        value.to_string()
    }
}

impl Display for TimeOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::TimeOffset;

    #[test]
    fn test_parse_past_midnight() {
        let t: TimeOffset = "25:01:30".parse().unwrap();
        assert_eq!(t.seconds(), 25 * 3600 + 90);
        assert_eq!(t.to_string(), "25:01:30");
    }

    #[test]
    fn test_reject_malformed() {
        assert!("12:60:00".parse::<TimeOffset>().is_err());
        assert!("noon".parse::<TimeOffset>().is_err());
        assert!("1:2:3:4".parse::<TimeOffset>().is_err());
    }

    #[test]
    fn test_out_of_range_hours_rejected() {
        assert!("1193047:00:00".parse::<TimeOffset>().is_err());
        assert!("1193046:28:16".parse::<TimeOffset>().is_err());
        let max: TimeOffset = "1193046:28:15".parse().unwrap();
        assert_eq!(max.seconds(), u32::MAX);
        let result = serde_json::from_str::<TimeOffset>("\"4000000:00:00\"");
        assert!(result.is_err());
        assert_eq!(TimeOffset::from_hms(u32::MAX, 0, 0), TimeOffset(u32::MAX));
    }
}
