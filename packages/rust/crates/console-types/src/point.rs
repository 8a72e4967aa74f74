//! Execution points: positions inside one linear recording.
//!
//! Points are decimal integers that routinely exceed 64 bits, so they are kept
//! as normalized digit strings and compared on magnitude (length first, then
//! digits). For normalized strings this is exact integer comparison.

use std::cmp::Ordering;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionPointError;

/// A position within a single recording.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionPoint(String);

impl ExecutionPoint {
    /// Parse a decimal point string, stripping leading zeros.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionPointError`] when the input is empty or contains a
    /// character other than an ASCII digit.
    pub fn parse(raw: &str) -> Result<Self, ExecutionPointError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExecutionPointError::Empty);
        }
        if let Some(bad) = trimmed.chars().find(|ch| !ch.is_ascii_digit()) {
            return Err(ExecutionPointError::InvalidDigit {
                point: trimmed.to_string(),
                found: bad,
            });
        }
        let digits = trimmed.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero());
        }
        Ok(Self(digits.to_string()))
    }

    /// The start of the recording.
    #[must_use]
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Normalized digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ExecutionPoint {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for ExecutionPoint {
    type Error = ExecutionPointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExecutionPoint> for String {
    fn from(point: ExecutionPoint) -> Self {
        point.0
    }
}

impl fmt::Display for ExecutionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for ExecutionPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_points(self, other)
    }
}

impl PartialOrd for ExecutionPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric-magnitude comparison of two execution points.
///
/// A nine digit point is always greater than an eight digit one, whatever the
/// leading characters are.
#[must_use]
pub fn compare_points(a: &ExecutionPoint, b: &ExecutionPoint) -> Ordering {
    a.0.len()
        .cmp(&b.0.len())
        .then_with(|| a.0.as_bytes().cmp(b.0.as_bytes()))
}

/// Where the replay is currently paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PausePoint {
    /// Paused execution point.
    pub execution_point: ExecutionPoint,
    /// Wall-clock estimate of the paused moment, in milliseconds.
    pub time: f64,
}

impl PausePoint {
    /// Build a pause anchor.
    #[must_use]
    pub fn new(execution_point: ExecutionPoint, time: f64) -> Self {
        Self {
            execution_point,
            time,
        }
    }
}

/// Synthetic ordering anchor for a message without its own execution point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastExecutionPoint {
    /// Anchor point copied from the pause or the last message with a real point.
    pub point: ExecutionPoint,
    /// Anchor time.
    pub time: f64,
    /// Cohort counter among messages sharing this anchor, starting at 1.
    pub message_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(raw: &str) -> ExecutionPoint {
        ExecutionPoint::parse(raw).unwrap()
    }

    #[test]
    fn longer_points_are_greater_regardless_of_digits() {
        assert_eq!(
            compare_points(&point("100000000"), &point("99999999")),
            Ordering::Greater
        );
        assert_eq!(compare_points(&point("9"), &point("10")), Ordering::Less);
    }

    #[test]
    fn points_beyond_u64_compare_exactly() {
        let a = point("340282366920938463463374607431768211456");
        let b = point("340282366920938463463374607431768211457");
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_are_normalized() {
        assert_eq!(point("000123"), point("123"));
        assert_eq!(point("0000"), ExecutionPoint::zero());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(matches!(
            ExecutionPoint::parse("12a"),
            Err(ExecutionPointError::InvalidDigit { found: 'a', .. })
        ));
        assert!(matches!(
            ExecutionPoint::parse("  "),
            Err(ExecutionPointError::Empty)
        ));
    }

    #[test]
    fn serde_round_trips_through_string() {
        let parsed: ExecutionPoint = serde_json::from_str("\"0042\"").unwrap();
        assert_eq!(parsed.as_str(), "42");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"42\"");
        assert!(serde_json::from_str::<ExecutionPoint>("\"-1\"").is_err());
    }
}
