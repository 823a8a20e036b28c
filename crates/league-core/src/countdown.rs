//! Countdown to a league's end time.
//!
//! Pure function of `(end_time, now)`. Whoever displays it is expected to
//! re-evaluate it at least once per second while it is visible.

use std::fmt;

use serde::Serialize;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimeRemaining {
    Ended,
    Running {
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: u64,
    },
}

impl TimeRemaining {
    pub fn until(end_time: u64, now_seconds: u64) -> Self {
        match end_time.checked_sub(now_seconds) {
            None | Some(0) => Self::Ended,
            Some(remaining) => Self::Running {
                days: remaining / SECONDS_PER_DAY,
                hours: remaining % SECONDS_PER_DAY / SECONDS_PER_HOUR,
                minutes: remaining % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
                seconds: remaining % SECONDS_PER_MINUTE,
            },
        }
    }

    pub fn has_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ended => write!(f, "Ended"),
            Self::Running {
                days,
                hours,
                minutes,
                seconds,
            } => {
                if *days > 0 {
                    write!(f, "{days}d ")?;
                }
                write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
            }
        }
    }
}

pub fn format_countdown(end_time: u64, now_seconds: u64) -> String {
    TimeRemaining::until(end_time, now_seconds).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_ended() {
        assert_eq!(format_countdown(1000, 1000), "Ended");
        assert_eq!(format_countdown(1000, 5000), "Ended");
        assert!(TimeRemaining::until(0, 0).has_ended());
    }

    #[test]
    fn test_countdown_with_days() {
        assert_eq!(format_countdown(1_090_061, 1_000_000), "1d 01:01:01");
    }

    #[test]
    fn test_countdown_without_days() {
        assert_eq!(format_countdown(100, 99), "00:00:01");
        assert_eq!(format_countdown(86_399, 0), "23:59:59");
        assert_eq!(format_countdown(86_400, 0), "1d 00:00:00");
        assert_eq!(format_countdown(10 * 86_400 + 3_600, 0), "10d 01:00:00");
    }
}
