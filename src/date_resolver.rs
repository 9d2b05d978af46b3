//! Year/month extraction from filenames.
//!
//! A [`DateResolver`] holds an ordered list of compiled regular expressions.
//! Each pattern may expose the date through named groups `year` and `month`,
//! through its first two capture groups, or through any 4-digit and 2-digit
//! numeric captures. The first pattern that yields a valid pair wins.

use regex::{Captures, Regex};

/// A resolved date bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket {
    /// Four-digit year, e.g. "2024".
    pub year: String,
    /// Year followed by the two-digit month, e.g. "202401".
    pub year_month: String,
}

/// Ordered, compiled date patterns.
#[derive(Debug, Clone, Default)]
pub struct DateResolver {
    patterns: Vec<Regex>,
}

impl DateResolver {
    /// Creates a resolver from already compiled patterns, kept in order.
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when no pattern is configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Resolves `filename` to a date bucket.
    ///
    /// Returns `None` when no pattern matches with a 4-character year and a
    /// 2-character month.
    pub fn resolve(&self, filename: &str) -> Option<DateBucket> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(filename)?;
            let (year, month) = extract_year_month(&caps);
            if year.len() == 4 && month.len() == 2 {
                Some(DateBucket {
                    year_month: format!("{year}{month}"),
                    year: year.to_string(),
                })
            } else {
                None
            }
        })
    }
}

/// Named groups first, then the first two positional groups, then a scan.
fn extract_year_month<'h>(caps: &Captures<'h>) -> (&'h str, &'h str) {
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let named = |name: &str| caps.name(name).map_or("", |m| m.as_str());

    let mut year = named("year");
    let mut month = named("month");

    if year.is_empty() && caps.len() >= 3 {
        year = group(1);
        month = group(2);
    }

    if year.is_empty() || month.is_empty() {
        (year, month) = scan_year_month((0..caps.len()).map(group));
    }

    (year, month)
}

/// First 4-digit token becomes the year, first 2-digit token the month.
///
/// The whole match (group 0) takes part in the scan.
fn scan_year_month<'h>(groups: impl Iterator<Item = &'h str>) -> (&'h str, &'h str) {
    let mut year = "";
    let mut month = "";

    for token in groups {
        if year.is_empty() && token.len() == 4 && all_digits(token) {
            year = token;
            continue;
        }
        if month.is_empty() && token.len() == 2 && all_digits(token) {
            month = token;
        }
        if !year.is_empty() && !month.is_empty() {
            break;
        }
    }

    (year, month)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(patterns: &[&str]) -> DateResolver {
        DateResolver::new(patterns.iter().map(|p| Regex::new(p).unwrap()).collect())
    }

    fn bucket(year: &str, year_month: &str) -> Option<DateBucket> {
        Some(DateBucket {
            year: year.to_string(),
            year_month: year_month.to_string(),
        })
    }

    #[test]
    fn test_named_groups() {
        let r = resolver(&[r"(?P<year>\d{4})-(?P<month>\d{2})-\d{2}"]);
        assert_eq!(r.resolve("2024-01-31_photo.jpg"), bucket("2024", "202401"));
    }

    #[test]
    fn test_named_groups_take_precedence_over_position() {
        // The month group comes first positionally.
        let r = resolver(&[r"(?P<month>\d{2})_(?P<year>\d{4})"]);
        assert_eq!(r.resolve("07_2023.mp4"), bucket("2023", "202307"));
    }

    #[test]
    fn test_positional_groups() {
        let r = resolver(&[r"IMG_(\d{4})(\d{2})\d{2}"]);
        assert_eq!(r.resolve("IMG_20230715_video.mp4"), bucket("2023", "202307"));
    }

    #[test]
    fn test_positional_groups_beat_scan() {
        // Positional extraction yields a 2-character "year", which is invalid,
        // even though a scan would have found a valid pair.
        let r = resolver(&[r"(\d{2})(\d{4})"]);
        assert_eq!(r.resolve("x122024"), None);
    }

    #[test]
    fn test_scan_single_group() {
        let r = resolver(&[r"shot-(\d{4})"]);
        // Only one capture: the scan finds the year but no 2-digit token.
        assert_eq!(r.resolve("shot-2022"), None);
    }

    #[test]
    fn test_scan_uses_whole_match() {
        // The whole match "2019" is the year, the single group "20" the month.
        let r = resolver(&[r"(\d{2})\d{2}"]);
        assert_eq!(r.resolve("2019"), bucket("2019", "201920"));

        // A lone year capture never yields a month.
        let r = resolver(&[r"(\d{4})\d{2}"]);
        assert_eq!(r.resolve("201905"), None);
    }

    #[test]
    fn test_scan_when_named_month_missing() {
        let r = resolver(&[r"(?P<year>\d{4})(?:-(?P<month>\d{2}))?.*?(\d{2})$"]);
        assert_eq!(r.resolve("2021_x_05"), bucket("2021", "202105"));
    }

    #[test]
    fn test_first_valid_pattern_wins() {
        let r = resolver(&[
            r"(?P<year>\d{4})-(?P<month>\d{2})",
            r"(?P<year>\d{4})(?P<month>\d{2})",
        ]);
        assert_eq!(r.resolve("2020-03_20210405"), bucket("2020", "202003"));
    }

    #[test]
    fn test_invalid_pattern_result_falls_through() {
        let r = resolver(&[r"(?P<year>\d{2})(?P<month>\d{2})", r"(\d{4})(\d{2})"]);
        assert_eq!(r.resolve("199912"), bucket("1999", "199912"));
    }

    #[test]
    fn test_no_match() {
        let r = resolver(&[r"(?P<year>\d{4})-(?P<month>\d{2})"]);
        assert_eq!(r.resolve("picture.jpg"), None);
    }

    #[test]
    fn test_no_patterns() {
        let r = DateResolver::default();
        assert!(r.is_empty());
        assert_eq!(r.resolve("2024-01-31.jpg"), None);
    }
}
