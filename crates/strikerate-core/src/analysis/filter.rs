// Optional innings predicates applied before metrics are computed.

use std::fmt;

use crate::data::innings::InningsRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    /// The merged-schema Home/Away flag value.
    pub fn flag(self) -> u8 {
        match self {
            Venue::Home => 1,
            Venue::Away => 0,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => f.write_str("Home"),
            Venue::Away => f.write_str("Away"),
        }
    }
}

/// Inclusive range of calendar years. `start <= end` is checked by the
/// prompt parser before one is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

/// The filters offered by the comparison menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    HomeAway,
    YearRange,
    Opposition,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [
        FilterKind::HomeAway,
        FilterKind::YearRange,
        FilterKind::Opposition,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::HomeAway => "Home/Away",
            FilterKind::YearRange => "Year Range",
            FilterKind::Opposition => "Opposition",
        }
    }
}

/// Conjunction of the active predicates. An empty filter keeps every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InningsFilter {
    pub venue: Option<Venue>,
    pub years: Option<YearRange>,
    /// Matched as a case-insensitive literal substring of Opposition.
    pub opposition: Option<String>,
}

impl InningsFilter {
    pub fn matches(&self, row: &InningsRecord) -> bool {
        if let Some(venue) = self.venue {
            if row.home_away != venue.flag() {
                return false;
            }
        }
        if let Some(years) = self.years {
            if !years.contains(row.year) {
                return false;
            }
        }
        if let Some(needle) = &self.opposition {
            if !row
                .opposition
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
            {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[InningsRecord]) -> Vec<InningsRecord> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// A filter keeping only the year predicate, used for the trend chart.
    pub fn years_only(&self) -> InningsFilter {
        InningsFilter {
            years: self.years,
            ..InningsFilter::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::tests::innings;

    fn rows() -> Vec<InningsRecord> {
        let mut a = innings(10, 1, 2015);
        a.opposition = "v india".into();
        a.home_away = 1;
        let mut b = innings(20, 2, 2018);
        b.opposition = "v australia".into();
        b.home_away = 0;
        let mut c = innings(30, 1, 2020);
        c.opposition = "v india".into();
        c.home_away = 0;
        vec![a, b, c]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = InningsFilter::default();
        assert_eq!(filter.apply(&rows()).len(), 3);
    }

    #[test]
    fn venue_and_years_combine() {
        let filter = InningsFilter {
            venue: Some(Venue::Away),
            years: Some(YearRange { start: 2016, end: 2020 }),
            opposition: None,
        };
        let kept = filter.apply(&rows());
        assert_eq!(kept.iter().map(|r| r.runs).collect::<Vec<_>>(), vec![20, 30]);
    }

    #[test]
    fn year_range_is_inclusive() {
        let filter = InningsFilter {
            years: Some(YearRange { start: 2015, end: 2018 }),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows()).len(), 2);
    }

    #[test]
    fn opposition_is_case_insensitive_substring() {
        let filter = InningsFilter {
            opposition: Some("  INDIA ".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows()).len(), 2);

        let literal = InningsFilter {
            opposition: Some("ind.a".into()),
            ..Default::default()
        };
        assert!(literal.apply(&rows()).is_empty());
    }

    #[test]
    fn years_only_drops_other_predicates() {
        let filter = InningsFilter {
            venue: Some(Venue::Home),
            years: Some(YearRange { start: 2014, end: 2019 }),
            opposition: Some("india".into()),
        };
        let trend = filter.years_only();
        assert_eq!(trend.venue, None);
        assert_eq!(trend.opposition, None);
        assert_eq!(trend.apply(&rows()).len(), 2);
    }

    #[test]
    fn venue_flags() {
        assert_eq!(Venue::Home.flag(), 1);
        assert_eq!(Venue::Away.flag(), 0);
        assert_eq!(Venue::Away.to_string(), "Away");
    }
}
