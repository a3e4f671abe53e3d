//! Duration values written the way operators type them (`30s`, `1m30s`, `250ms`)

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A non-negative time span with a compact textual form.
///
/// Formatting always picks the largest units first and keeps zero minutes
/// once hours are present (`1h0m0s`), so values printed by the program can be
/// fed back to it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Interval(Duration);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct ParseIntervalError {
    input: String,
    reason: &'static str,
}

impl Interval {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(Duration::from_nanos(nanos))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < NANOS_PER_SEC {
            let (unit, scale) = if nanos < 1_000 {
                ("ns", 1)
            } else if nanos < 1_000_000 {
                ("µs", 1_000)
            } else {
                ("ms", 1_000_000)
            };
            return write!(f, "{}{}", decimal(nanos, scale), unit);
        }

        let total_secs = nanos / NANOS_PER_SEC;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let secs = total_secs % 60;

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        let sub_minute = secs * NANOS_PER_SEC + nanos % NANOS_PER_SEC;
        write!(f, "{}s", decimal(sub_minute, NANOS_PER_SEC))
    }
}

/// Render `value / scale` with the fractional part trimmed of trailing zeros.
fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let digits = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseIntervalError { input: input.to_string(), reason };

        let mut rest = input.trim();
        if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped;
        } else if rest.starts_with('-') {
            return Err(fail("negative durations are not supported"));
        }
        if rest.is_empty() {
            return Err(fail("empty value"));
        }
        if rest == "0" {
            return Ok(Self::default());
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let whole_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            let (whole, tail) = rest.split_at(whole_len);

            let (frac, tail) = match tail.strip_prefix('.') {
                Some(after_dot) => {
                    let frac_len =
                        after_dot.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_dot.len());
                    after_dot.split_at(frac_len)
                }
                None => ("", tail),
            };
            if whole.is_empty() && frac.is_empty() {
                return Err(fail("expected a number"));
            }

            let unit_len =
                tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);
            if unit.is_empty() {
                return Err(fail("missing unit"));
            }
            let scale = unit_nanos(unit).ok_or_else(|| fail("unknown unit"))?;

            let whole_value: u128 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| fail("number out of range"))?
            };
            let mut value =
                whole_value.checked_mul(scale).ok_or_else(|| fail("number out of range"))?;

            // Digits beyond nanosecond precision cannot change the result.
            let frac = &frac[..frac.len().min(18)];
            if !frac.is_empty() {
                let frac_value: u128 = frac.parse().map_err(|_| fail("number out of range"))?;
                value += frac_value * scale / 10u128.pow(frac.len() as u32);
            }

            total = total.checked_add(value).ok_or_else(|| fail("number out of range"))?;
            rest = tail;
        }

        let nanos = u64::try_from(total).map_err(|_| fail("number out of range"))?;
        Ok(Self(Duration::from_nanos(nanos)))
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct IntervalVisitor;

impl<'de> Visitor<'de> for IntervalVisitor {
    type Value = Interval;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"30s\" or \"1m30s\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Interval, E> {
        value.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    // Bare integers count nanoseconds.
    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Interval, E> {
        Ok(Interval::from_nanos(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Interval, E> {
        u64::try_from(value)
            .map(Interval::from_nanos)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntervalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_conventional_form() {
        assert_eq!(Interval::from_secs(0).to_string(), "0s");
        assert_eq!(Interval::from_secs(30).to_string(), "30s");
        assert_eq!(Interval::from_secs(60).to_string(), "1m0s");
        assert_eq!(Interval::from_secs(90).to_string(), "1m30s");
        assert_eq!(Interval::from_secs(3600).to_string(), "1h0m0s");
        assert_eq!(Interval::from_millis(1500).to_string(), "1.5s");
        assert_eq!(Interval::from_millis(250).to_string(), "250ms");
        assert_eq!(Interval::from_nanos(1_500).to_string(), "1.5µs");
        assert_eq!(Interval::from_nanos(42).to_string(), "42ns");
    }

    #[test]
    fn test_parse_compound_values() {
        assert_eq!("30s".parse::<Interval>().expect("parse"), Interval::from_secs(30));
        assert_eq!("1m30s".parse::<Interval>().expect("parse"), Interval::from_secs(90));
        assert_eq!("1h0m0s".parse::<Interval>().expect("parse"), Interval::from_secs(3600));
        assert_eq!("1.5s".parse::<Interval>().expect("parse"), Interval::from_millis(1500));
        assert_eq!(".5s".parse::<Interval>().expect("parse"), Interval::from_millis(500));
        assert_eq!("250ms".parse::<Interval>().expect("parse"), Interval::from_millis(250));
        assert_eq!("2us".parse::<Interval>().expect("parse"), Interval::from_nanos(2_000));
        assert_eq!("0".parse::<Interval>().expect("parse"), Interval::default());
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for bad in ["", "30", "abc", "-5s", "5x", "1.s.", "s"] {
            assert!(bad.parse::<Interval>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_printed_values_parse_back() {
        for secs in [1, 59, 61, 3599, 3661, 86_400] {
            let interval = Interval::from_secs(secs);
            assert_eq!(interval.to_string().parse::<Interval>().expect("parse"), interval);
        }
    }

    #[test]
    fn test_serde_accepts_strings_and_nanosecond_integers() {
        let from_text: Interval = serde_yaml::from_str("45s").expect("text");
        assert_eq!(from_text, Interval::from_secs(45));

        let from_int: Interval = serde_yaml::from_str("1000000000").expect("int");
        assert_eq!(from_int, Interval::from_secs(1));

        let err = serde_yaml::from_str::<Interval>("soon").expect_err("invalid");
        assert!(err.to_string().contains("a duration"));

        assert_eq!(serde_yaml::to_string(&Interval::from_secs(90)).expect("ser"), "1m30s\n");
    }
}
