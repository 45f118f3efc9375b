//! Field-level normalization helpers
//!
//! Every helper returns `None` for values that are null, empty or
//! whitespace-only, so no mapped text field is ever blank.

/// Delimiter used inside carrier fields
pub const CARRIER_DELIMITER: char = '^';

/// Urgency code reserved for PRN (as needed)
pub const URGENCY_PRN: i64 = 1;

/// Urgency code reserved for STAT (immediately)
pub const URGENCY_STAT: i64 = 2;

/// Trims a value, treating blank as absent
///
/// ```
/// use rxsync::core::mapping::fields::text;
///
/// assert_eq!(text(Some("  A01 ")), Some("A01".to_string()));
/// assert_eq!(text(Some("   ")), None);
/// assert_eq!(text(None), None);
/// ```
pub fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Combines a date column and a time column into one value
///
/// An absent date makes the whole pair absent; an absent time yields the
/// date alone.
pub fn date_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = text(date)?;
    match text(time) {
        Some(time) => Some(format!("{date} {time}")),
        None => Some(date),
    }
}

/// Splits a carrier field into exactly `N` positional values
///
/// Positions beyond the split length, and blank sub-values, are absent.
///
/// ```
/// use rxsync::core::mapping::fields::carrier;
///
/// let [ward, room, bed] = carrier::<3>(Some("W5^ 512 "));
/// assert_eq!(ward.as_deref(), Some("W5"));
/// assert_eq!(room.as_deref(), Some("512"));
/// assert_eq!(bed, None);
/// ```
pub fn carrier<const N: usize>(value: Option<&str>) -> [Option<String>; N] {
    let mut parts: [Option<String>; N] = std::array::from_fn(|_| None);
    if let Some(raw) = value {
        for (slot, part) in parts.iter_mut().zip(raw.split(CARRIER_DELIMITER)) {
            *slot = text(Some(part));
        }
    }
    parts
}

/// Decodes the stored sex code
pub fn sex(value: Option<&str>) -> String {
    match text(value).as_deref() {
        None => "U",
        Some("0") => "M",
        Some(_) => "F",
    }
    .to_string()
}

/// Decodes the combined urgency code into `(prn_flag, stat_flag)`
pub fn urgency(value: Option<&str>) -> (String, String) {
    let code = integer(value);
    let flag = |reserved: i64| {
        if code == Some(reserved) {
            "1".to_string()
        } else {
            "0".to_string()
        }
    };
    (flag(URGENCY_PRN), flag(URGENCY_STAT))
}

/// Parses a decimal, falling back to absent
pub fn decimal(value: Option<&str>) -> Option<f64> {
    text(value)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses an integer, accepting integral decimals such as `"3.0"`
///
/// Values outside the `i64` range are absent rather than clamped.
pub fn integer(value: Option<&str>) -> Option<i64> {
    let raw = text(value)?;
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        .filter(|v| *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None => None ; "null")]
    #[test_case(Some("") => None ; "empty")]
    #[test_case(Some(" \t ") => None ; "whitespace")]
    #[test_case(Some(" x ") => Some("x".to_string()) ; "padded")]
    fn test_text(value: Option<&str>) -> Option<String> {
        text(value)
    }

    #[test_case(Some("2025-03-01"), Some("08:30") => Some("2025-03-01 08:30".to_string()) ; "both")]
    #[test_case(Some("2025-03-01"), Some("  ") => Some("2025-03-01".to_string()) ; "no time")]
    #[test_case(None, Some("08:30") => None ; "no date")]
    #[test_case(Some(" "), Some("08:30") => None ; "blank date")]
    fn test_date_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
        date_time(date, time)
    }

    #[test_case(None => "U" ; "absent")]
    #[test_case(Some("  ") => "U" ; "blank")]
    #[test_case(Some("0") => "M" ; "zero")]
    #[test_case(Some(" 0 ") => "M" ; "padded zero")]
    #[test_case(Some("1") => "F" ; "one")]
    #[test_case(Some("X") => "F" ; "other")]
    fn test_sex(value: Option<&str>) -> String {
        sex(value)
    }

    #[test_case(Some("1") => ("1".to_string(), "0".to_string()) ; "prn")]
    #[test_case(Some("2") => ("0".to_string(), "1".to_string()) ; "stat")]
    #[test_case(Some("2.0") => ("0".to_string(), "1".to_string()) ; "stat decimal")]
    #[test_case(Some("0") => ("0".to_string(), "0".to_string()) ; "routine")]
    #[test_case(Some("3") => ("0".to_string(), "0".to_string()) ; "unknown")]
    #[test_case(Some("abc") => ("0".to_string(), "0".to_string()) ; "garbage")]
    #[test_case(None => ("0".to_string(), "0".to_string()) ; "absent")]
    fn test_urgency(value: Option<&str>) -> (String, String) {
        urgency(value)
    }

    #[test_case(Some("9223372036854775807") => Some(i64::MAX) ; "max")]
    #[test_case(Some("-9223372036854775808") => Some(i64::MIN) ; "min")]
    #[test_case(Some("9223372036854775808") => None ; "one past max")]
    #[test_case(Some("9223372036854775808.0") => None ; "one past max as decimal")]
    #[test_case(Some("1e19") => None ; "far past max")]
    #[test_case(Some("-1e19") => None ; "far past min")]
    fn test_integer_range(value: Option<&str>) -> Option<i64> {
        integer(value)
    }

    #[test]
    fn test_carrier_positions() {
        let [a, b, c] = carrier::<3>(Some("A^^C^D"));
        assert_eq!(a.as_deref(), Some("A"));
        assert_eq!(b, None);
        assert_eq!(c.as_deref(), Some("C"));

        let [a, b] = carrier::<2>(None);
        assert!(a.is_none() && b.is_none());

        let [a, b] = carrier::<2>(Some("   "));
        assert!(a.is_none() && b.is_none());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(decimal(Some(" 2.5 ")), Some(2.5));
        assert_eq!(decimal(Some("NaN")), None);
        assert_eq!(decimal(Some("1/2")), None);
        assert_eq!(integer(Some("14")), Some(14));
        assert_eq!(integer(Some("3.0")), Some(3));
        assert_eq!(integer(Some("3.5")), None);
        assert_eq!(integer(Some("")), None);
    }
}
