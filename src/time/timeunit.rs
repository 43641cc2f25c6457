use crate::time::error::Error;
use core::str::FromStr;
use lazy_static::*;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref DURATION_REGEX: Regex =
        Regex::new(r"^(?P<value>\d+)\s*(?P<unit>[a-z]+)$").expect("Regex compilation error");
}

/// A duration written as a number and a unit, e.g. `30s` or `200ms`.
#[derive(Debug, PartialEq)]
pub struct DurationUnit {
    value: u64,
    unit: TimeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl FromStr for DurationUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = DURATION_REGEX
            .captures(s.trim())
            .ok_or_else(|| Error::Syntax(s.to_owned()))?;
        let value = caps["value"]
            .parse()
            .map_err(|_| Error::Syntax(s.to_owned()))?;
        let unit = caps["unit"].parse::<TimeUnit>()?;
        Ok(Self { value, unit })
    }
}

impl DurationUnit {
    /// `None` when the value does not fit a `Duration` in seconds.
    pub fn to_duration(&self) -> Option<Duration> {
        let secs = match self.unit {
            TimeUnit::Millisecond => return Some(Duration::from_millis(self.value)),
            TimeUnit::Second => self.value,
            TimeUnit::Minute => self.value.checked_mul(60)?,
            TimeUnit::Hour => self.value.checked_mul(60 * 60)?,
        };
        Some(Duration::from_secs(secs))
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Millisecond),
            "s" | "sec" | "secs" | "seconds" => Ok(TimeUnit::Second),
            "m" | "min" | "mins" | "minutes" => Ok(TimeUnit::Minute),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hour),
            _ => Err(Error::UnitNotSupported(s.to_owned())),
        }
    }
}

/// Parser for command line arguments and manifest values.
pub fn parse_duration(s: &str) -> Result<Duration, Error> {
    s.parse::<DurationUnit>()?
        .to_duration()
        .ok_or_else(|| Error::Syntax(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_supported_units() {
        assert_eq!(parse_duration("200ms").unwrap(), Duration::from_millis(200));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2 min").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert_eq!(
            parse_duration("5d"),
            Err(Error::UnitNotSupported("d".to_owned()))
        );
    }

    #[test]
    fn test_rejects_malformed_value() {
        assert_eq!(parse_duration("soon"), Err(Error::Syntax("soon".to_owned())));
        assert_eq!(parse_duration("-5s"), Err(Error::Syntax("-5s".to_owned())));
    }

    #[test]
    fn test_rejects_value_too_large_for_duration() {
        assert_eq!(
            parse_duration("10000000000000000h"),
            Err(Error::Syntax("10000000000000000h".to_owned()))
        );
        assert_eq!(
            parse_duration("400000000000000000m"),
            Err(Error::Syntax("400000000000000000m".to_owned()))
        );
        assert_eq!(
            parse_duration("18446744073709551615ms").unwrap(),
            Duration::from_millis(u64::MAX)
        );
    }
}
