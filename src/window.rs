use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::date_util::last_day_of_month;
use crate::error::{Error, Result};

static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// The calendar months the dashboard presents as fixed presets.
const MONTH_PRESETS: [(i32, u32); 4] = [(2025, 8), (2025, 9), (2025, 10), (2025, 11)];

/// A date window the dashboard aggregates over.
///
/// Rolling windows resolve relative to a supplied "today"; month windows
/// are fixed calendar months. Both resolve to inclusive date ranges at
/// date-only granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Last N days, ending today.
    Rolling(u32),
    /// A calendar month: (year, month).
    Month(i32, u32),
}

impl Window {
    /// Parse a window string.
    ///
    /// Supported formats:
    /// - `30d` — rolling last N days
    /// - `2025-08` — calendar month
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.ends_with('d') || s.ends_with('D') {
            if let Ok(n) = s[..s.len() - 1].parse::<u32>() {
                if n > 0 {
                    return Ok(Window::Rolling(n));
                }
            }
        }

        if let Some(caps) = RE_MONTH.captures(s) {
            let year: i32 = caps[1].parse().unwrap();
            let month: u32 = caps[2].parse().unwrap();
            if (1..=12).contains(&month) {
                return Ok(Window::Month(year, month));
            }
        }

        Err(Error::WindowParse(format!("unrecognized window: {s}")))
    }

    /// Get the date range (inclusive start, inclusive end) for this window.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Window::Rolling(n) => (today - Duration::days(*n as i64), today),
            Window::Month(y, m) => (
                NaiveDate::from_ymd_opt(*y, *m, 1).unwrap(),
                last_day_of_month(*y, *m),
            ),
        }
    }

    /// Canonical cache key: `"{start}_{end}"` with ISO dates.
    pub fn cache_key(&self, today: NaiveDate) -> String {
        let (start, end) = self.date_range(today);
        format!("{}_{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
    }

    /// Human-readable name for logs and CLI output, e.g. `last_30`
    /// or `august_2025`.
    pub fn label(&self) -> String {
        match self {
            Window::Rolling(n) => format!("last_{n}"),
            Window::Month(y, m) => {
                let month_name = NaiveDate::from_ymd_opt(*y, *m, 1)
                    .unwrap()
                    .format("%B")
                    .to_string()
                    .to_lowercase();
                format!("{month_name}_{y}")
            }
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The fixed set of windows every run computes, in serialization order:
/// rolling 30/60/90 followed by the month presets.
pub fn default_plan() -> Vec<Window> {
    let mut plan = vec![Window::Rolling(30), Window::Rolling(60), Window::Rolling(90)];
    plan.extend(MONTH_PRESETS.iter().map(|&(y, m)| Window::Month(y, m)));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rolling() {
        assert_eq!(Window::parse("30d").unwrap(), Window::Rolling(30));
        assert_eq!(Window::parse("7D").unwrap(), Window::Rolling(7));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(Window::parse("2025-08").unwrap(), Window::Month(2025, 8));
        assert_eq!(Window::parse("2025-12").unwrap(), Window::Month(2025, 12));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Window::parse("garbage").is_err());
        assert!(Window::parse("2025-13").is_err());
        assert!(Window::parse("0d").is_err());
        assert!(Window::parse("2025-8").is_err());
    }

    #[test]
    fn test_date_range_rolling() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let (start, end) = Window::Rolling(30).date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 10, 31).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn test_date_range_month() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let (start, end) = Window::Month(2025, 2).date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_cache_key_month() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        assert_eq!(
            Window::Month(2025, 8).cache_key(today),
            "2025-08-01_2025-08-31"
        );
        assert_eq!(
            Window::Month(2025, 11).cache_key(today),
            "2025-11-01_2025-11-30"
        );
    }

    #[test]
    fn test_cache_key_rolling() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(
            Window::Rolling(30).cache_key(today),
            "2025-10-31_2025-11-30"
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(Window::Rolling(30).label(), "last_30");
        assert_eq!(Window::Month(2025, 8).label(), "august_2025");
        assert_eq!(Window::Month(2025, 11).label(), "november_2025");
    }

    #[test]
    fn test_default_plan_order() {
        let plan = default_plan();
        assert_eq!(plan.len(), 7);
        assert_eq!(plan[0], Window::Rolling(30));
        assert_eq!(plan[1], Window::Rolling(60));
        assert_eq!(plan[2], Window::Rolling(90));
        assert_eq!(plan[3], Window::Month(2025, 8));
        assert_eq!(plan[6], Window::Month(2025, 11));
    }

    #[test]
    fn test_plan_keys_unique() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let keys: Vec<String> = default_plan().iter().map(|w| w.cache_key(today)).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }
}
