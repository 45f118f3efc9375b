//! Target date for a sync run
//!
//! The target date selects pending work and scopes reconciliation. Rows store
//! their record date as text, so the target is matched as a string prefix
//! rendered with the configured format.

use chrono::NaiveDate;
use std::fmt;

/// Calendar day a run operates on
///
/// # Examples
///
/// ```
/// use rxsync::domain::TargetDate;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let target = TargetDate::new(date, "%Y%m%d");
/// assert_eq!(target.prefix(), "20250301");
/// assert_eq!(target.like_pattern(), "20250301%");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDate {
    date: NaiveDate,
    prefix: String,
}

impl TargetDate {
    /// Creates a target date rendered with a chrono format string
    pub fn new(date: NaiveDate, format: &str) -> Self {
        Self {
            date,
            prefix: date.format(format).to_string(),
        }
    }

    /// Parses an ISO `YYYY-MM-DD` date, as given on the command line
    pub fn parse_iso(value: &str, format: &str) -> Result<Self, String> {
        let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{value}' (expected YYYY-MM-DD): {e}"))?;
        Ok(Self::new(date, format))
    }

    /// Today in local time
    pub fn today(format: &str) -> Self {
        Self::new(chrono::Local::now().date_naive(), format)
    }

    /// The calendar day
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Stored-text prefix of rows on this date
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// SQL `LIKE` pattern matching rows on this date
    ///
    /// `%`, `_` and `\` in the prefix are escaped with PostgreSQL's default
    /// `LIKE` escape character, so the pattern matches exactly what
    /// [`TargetDate::matches`] accepts.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.prefix.len() + 1);
        for c in self.prefix.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Whether a stored record date falls on this day
    pub fn matches(&self, record_date: &str) -> bool {
        record_date.starts_with(&self.prefix)
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso() {
        let target = TargetDate::parse_iso("2025-03-01", "%Y-%m-%d").unwrap();
        assert_eq!(target.prefix(), "2025-03-01");
        assert_eq!(target.to_string(), "2025-03-01");
        assert!(target.matches("2025-03-01 08:15:00"));
        assert!(!target.matches("2025-03-02 08:15:00"));
    }

    #[test]
    fn test_parse_iso_invalid() {
        assert!(TargetDate::parse_iso("03/01/2025", "%Y-%m-%d").is_err());
        assert!(TargetDate::parse_iso("", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let target = TargetDate::new(date, "%Y_%m_%d");
        assert_eq!(target.prefix(), "2025_03_01");
        assert_eq!(target.like_pattern(), r"2025\_03\_01%");
        assert!(target.matches("2025_03_01 08:00"));
        assert!(!target.matches("2025-03-01 08:00"));

        let target = TargetDate::new(date, "%Y%m%d%%");
        assert_eq!(target.like_pattern(), r"20250301\%%");

        let target = TargetDate::new(date, r"%Y\%m");
        assert_eq!(target.like_pattern(), r"2025\\03%");
    }

    #[test]
    fn test_compact_format() {
        let target = TargetDate::parse_iso("2025-12-31", "%Y%m%d").unwrap();
        assert_eq!(target.like_pattern(), "20251231%");
        assert_eq!(target.to_string(), "2025-12-31");
    }
}
