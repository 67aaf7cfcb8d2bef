// Per-player aggregate batting metrics over a set of innings.

use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::round2;
use crate::data::innings::InningsRecord;

// ---------------------------------------------------------------------------
// Metric catalog
// ---------------------------------------------------------------------------

/// A comparable batting metric. Declaration order is menu and report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    TotalRuns,
    BattingAverage,
    StrikeRate,
    FirstInningsAverage,
    SecondInningsAverage,
    ThirdInningsAverage,
    FourthInningsAverage,
    FiftyPlusScores,
    HalfCenturies,
    Centuries,
    DoubleCenturies,
    Boundaries,
    PeakYear,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::TotalRuns,
        Metric::BattingAverage,
        Metric::StrikeRate,
        Metric::FirstInningsAverage,
        Metric::SecondInningsAverage,
        Metric::ThirdInningsAverage,
        Metric::FourthInningsAverage,
        Metric::FiftyPlusScores,
        Metric::HalfCenturies,
        Metric::Centuries,
        Metric::DoubleCenturies,
        Metric::Boundaries,
        Metric::PeakYear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalRuns => "Total Runs",
            Metric::BattingAverage => "Batting Average",
            Metric::StrikeRate => "Strike Rate",
            Metric::FirstInningsAverage => "First Innings Average",
            Metric::SecondInningsAverage => "Second Innings Average",
            Metric::ThirdInningsAverage => "Third Innings Average",
            Metric::FourthInningsAverage => "Fourth Innings Average",
            Metric::FiftyPlusScores => "Fifty Plus Scores",
            Metric::HalfCenturies => "Half Centuries",
            Metric::Centuries => "Centuries",
            Metric::DoubleCenturies => "Double Centuries",
            Metric::Boundaries => "Boundaries (4s + 6s)",
            Metric::PeakYear => "Peak Year",
        }
    }

    /// Configuration key (snake_case) for this metric.
    pub fn key(self) -> &'static str {
        match self {
            Metric::TotalRuns => "total_runs",
            Metric::BattingAverage => "batting_average",
            Metric::StrikeRate => "strike_rate",
            Metric::FirstInningsAverage => "first_innings_average",
            Metric::SecondInningsAverage => "second_innings_average",
            Metric::ThirdInningsAverage => "third_innings_average",
            Metric::FourthInningsAverage => "fourth_innings_average",
            Metric::FiftyPlusScores => "fifty_plus_scores",
            Metric::HalfCenturies => "half_centuries",
            Metric::Centuries => "centuries",
            Metric::DoubleCenturies => "double_centuries",
            Metric::Boundaries => "boundaries",
            Metric::PeakYear => "peak_year",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Match innings number (1-4) for the per-innings averages.
    pub fn innings_number(self) -> Option<u8> {
        match self {
            Metric::FirstInningsAverage => Some(1),
            Metric::SecondInningsAverage => Some(2),
            Metric::ThirdInningsAverage => Some(3),
            Metric::FourthInningsAverage => Some(4),
            _ => None,
        }
    }

    /// Batting average and the per-innings averages.
    pub fn is_average(self) -> bool {
        self == Metric::BattingAverage || self.innings_number().is_some()
    }

    /// Whether the metric contributes to the ranking score.
    pub fn is_scored(self) -> bool {
        self != Metric::PeakYear
    }

    /// Whether the metric counts milestone innings.
    pub fn is_milestone(self) -> bool {
        matches!(
            self,
            Metric::FiftyPlusScores
                | Metric::HalfCenturies
                | Metric::Centuries
                | Metric::DoubleCenturies
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// The calendar year with the most runs, with that year's totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakYear {
    pub year: i32,
    pub runs: u64,
    /// Mean runs per innings in that year, rounded to 2 dp.
    pub average: f64,
}

impl fmt::Display for PeakYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Runs: {}, Avg: {})", self.year, self.runs, round2(self.average))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Count(u64),
    Rate(f64),
    /// `None` when there were no innings to choose a year from.
    Peak(Option<PeakYear>),
}

impl MetricValue {
    /// Numeric value for scoring and charts; `None` for Peak Year.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Count(n) => Some(*n as f64),
            MetricValue::Rate(r) => Some(*r),
            MetricValue::Peak(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{n}"),
            MetricValue::Rate(r) => write!(f, "{r:.2}"),
            MetricValue::Peak(Some(peak)) => write!(f, "{peak}"),
            MetricValue::Peak(None) => f.write_str("n/a"),
        }
    }
}

/// Selected metrics for one player, ordered by the metric catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricResult {
    values: BTreeMap<Metric, MetricValue>,
}

impl MetricResult {
    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.values.get(&metric)
    }

    pub fn numeric(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).and_then(MetricValue::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricValue)> {
        self.values.iter().map(|(m, v)| (*m, v))
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.values.keys().copied()
    }
}

/// A cohort player's metric results.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMetrics {
    pub player: String,
    pub metrics: MetricResult,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn total_runs(rows: &[InningsRecord]) -> u64 {
    rows.iter().map(|r| r.runs as u64).sum()
}

fn mean_runs(rows: &[&InningsRecord]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: u64 = rows.iter().map(|r| r.runs as u64).sum();
    round2(sum as f64 / rows.len() as f64)
}

fn count_runs_in(rows: &[InningsRecord], low: u32, high: Option<u32>) -> u64 {
    rows.iter()
        .filter(|r| r.runs >= low && high.map_or(true, |h| r.runs < h))
        .count() as u64
}

/// Summed runs per calendar year, in year order.
pub fn yearly_runs(rows: &[InningsRecord]) -> BTreeMap<i32, u64> {
    let mut by_year = BTreeMap::new();
    for row in rows {
        *by_year.entry(row.year).or_insert(0) += row.runs as u64;
    }
    by_year
}

/// The year with the highest run total; the earliest such year on ties.
pub fn peak_year(rows: &[InningsRecord]) -> Option<PeakYear> {
    let mut best: Option<(i32, u64)> = None;
    for (year, runs) in yearly_runs(rows) {
        if best.map_or(true, |(_, top)| runs > top) {
            best = Some((year, runs));
        }
    }
    let (year, runs) = best?;
    let in_year: Vec<&InningsRecord> = rows.iter().filter(|r| r.year == year).collect();
    Some(PeakYear {
        year,
        runs,
        average: mean_runs(&in_year),
    })
}

/// Compute one value for each selected metric. Every selected metric is
/// present in the result; empty inputs yield zeros (and no peak year).
pub fn compute_metrics(rows: &[InningsRecord], selected: &[Metric]) -> MetricResult {
    let mut values = BTreeMap::new();
    for &metric in selected {
        let value = match metric {
            Metric::TotalRuns => MetricValue::Count(total_runs(rows)),
            Metric::BattingAverage => {
                let all: Vec<&InningsRecord> = rows.iter().collect();
                MetricValue::Rate(mean_runs(&all))
            }
            Metric::StrikeRate => {
                let balls: f64 = rows.iter().map(|r| r.balls_faced).sum();
                let rate = if balls > 0.0 {
                    round2(total_runs(rows) as f64 / balls * 100.0)
                } else {
                    0.0
                };
                MetricValue::Rate(rate)
            }
            Metric::FirstInningsAverage
            | Metric::SecondInningsAverage
            | Metric::ThirdInningsAverage
            | Metric::FourthInningsAverage => {
                let n = metric.innings_number().unwrap_or_default();
                let in_innings: Vec<&InningsRecord> =
                    rows.iter().filter(|r| r.match_inning == n).collect();
                MetricValue::Rate(mean_runs(&in_innings))
            }
            Metric::FiftyPlusScores => MetricValue::Count(count_runs_in(rows, 50, None)),
            Metric::HalfCenturies => MetricValue::Count(count_runs_in(rows, 50, Some(100))),
            Metric::Centuries => MetricValue::Count(count_runs_in(rows, 100, Some(200))),
            Metric::DoubleCenturies => MetricValue::Count(count_runs_in(rows, 200, None)),
            Metric::Boundaries => {
                let fours: u64 = rows.iter().map(|r| r.fours as u64).sum();
                let sixes: u64 = rows.iter().map(|r| r.sixes as u64).sum();
                MetricValue::Count(fours + sixes)
            }
            Metric::PeakYear => MetricValue::Peak(peak_year(rows)),
        };
        values.insert(metric, value);
    }
    MetricResult { values }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn innings(runs: u32, inning: u8, year: i32) -> InningsRecord {
        InningsRecord {
            player_name: "Test".into(),
            runs,
            minutes: 0.0,
            balls_faced: runs as f64 * 2.0,
            fours: runs / 10,
            sixes: runs / 50,
            strike_rate: 50.0,
            match_inning: inning,
            opposition: "v india".into(),
            ground: "Lord's".into(),
            year,
            home_away: 1,
            nationality: "England".into(),
        }
    }

    #[test]
    fn milestone_example() {
        let rows = vec![innings(45, 1, 2019), innings(102, 2, 2019), innings(60, 3, 2020)];
        let result = compute_metrics(&rows, &Metric::ALL);
        assert_eq!(result.get(Metric::FiftyPlusScores), Some(&MetricValue::Count(2)));
        assert_eq!(result.get(Metric::Centuries), Some(&MetricValue::Count(1)));
        assert_eq!(result.get(Metric::HalfCenturies), Some(&MetricValue::Count(1)));
        assert_eq!(result.get(Metric::DoubleCenturies), Some(&MetricValue::Count(0)));
    }

    #[test]
    fn milestone_bands_partition_fifty_plus() {
        let runs = [0, 49, 50, 99, 100, 150, 199, 200, 201, 400, 12];
        let rows: Vec<InningsRecord> = runs.iter().map(|&r| innings(r, 1, 2018)).collect();
        let result = compute_metrics(&rows, &Metric::ALL);
        let count = |m| result.numeric(m).unwrap();
        assert_eq!(
            count(Metric::HalfCenturies) + count(Metric::Centuries) + count(Metric::DoubleCenturies),
            count(Metric::FiftyPlusScores)
        );
        assert_eq!(count(Metric::HalfCenturies), 2.0);
        assert_eq!(count(Metric::Centuries), 3.0);
        assert_eq!(count(Metric::DoubleCenturies), 3.0);
    }

    #[test]
    fn averages_and_strike_rate() {
        let rows = vec![innings(45, 1, 2019), innings(102, 2, 2019), innings(60, 1, 2020)];
        let result = compute_metrics(&rows, &Metric::ALL);

        assert_eq!(result.get(Metric::TotalRuns), Some(&MetricValue::Count(207)));
        let avg = result.numeric(Metric::BattingAverage).unwrap();
        assert_eq!(avg, 69.0);
        assert!((avg * rows.len() as f64 - 207.0).abs() < 0.01 * rows.len() as f64);

        // balls are 2x runs
        assert_eq!(result.numeric(Metric::StrikeRate), Some(50.0));
        assert_eq!(result.numeric(Metric::FirstInningsAverage), Some(52.5));
        assert_eq!(result.numeric(Metric::SecondInningsAverage), Some(102.0));
        assert_eq!(result.numeric(Metric::ThirdInningsAverage), Some(0.0));

        // fours = runs/10, sixes = runs/50: (4+10+6) + (0+2+1)
        assert_eq!(result.get(Metric::Boundaries), Some(&MetricValue::Count(23)));
    }

    #[test]
    fn batting_average_rounds_to_two_places() {
        let rows = vec![innings(10, 1, 2019), innings(11, 1, 2019), innings(11, 1, 2019)];
        let result = compute_metrics(&rows, &[Metric::BattingAverage]);
        assert_eq!(result.numeric(Metric::BattingAverage), Some(10.67));
    }

    #[test]
    fn peak_year_picks_highest_total() {
        let rows = vec![
            innings(45, 1, 2019),
            innings(102, 2, 2019),
            innings(120, 1, 2020),
            innings(20, 2, 2020),
            innings(30, 3, 2021),
        ];
        let peak = peak_year(&rows).unwrap();
        assert_eq!(peak.year, 2019);
        assert_eq!(peak.runs, 147);
        assert_eq!(peak.average, 73.5);
        assert_eq!(peak.to_string(), "2019 (Runs: 147, Avg: 73.5)");

        let max_total = yearly_runs(&rows).values().copied().max().unwrap();
        assert_eq!(peak.runs, max_total);
    }

    #[test]
    fn peak_year_average_prints_shortest_rounded_form() {
        let whole = PeakYear { year: 2020, runs: 140, average: 70.0 };
        assert_eq!(whole.to_string(), "2020 (Runs: 140, Avg: 70)");
        let thirds = PeakYear { year: 2021, runs: 100, average: 100.0 / 3.0 };
        assert_eq!(thirds.to_string(), "2021 (Runs: 100, Avg: 33.33)");
    }

    #[test]
    fn peak_year_tie_prefers_earliest() {
        let rows = vec![innings(100, 1, 2021), innings(100, 1, 2018)];
        assert_eq!(peak_year(&rows).unwrap().year, 2018);
    }

    #[test]
    fn empty_innings_yield_zeroes() {
        let result = compute_metrics(&[], &Metric::ALL);
        assert_eq!(result.metrics().count(), Metric::ALL.len());
        assert_eq!(result.numeric(Metric::BattingAverage), Some(0.0));
        assert_eq!(result.numeric(Metric::StrikeRate), Some(0.0));
        assert_eq!(result.numeric(Metric::TotalRuns), Some(0.0));
        assert_eq!(result.get(Metric::PeakYear), Some(&MetricValue::Peak(None)));
        assert_eq!(result.get(Metric::PeakYear).unwrap().to_string(), "n/a");
    }

    #[test]
    fn only_selected_metrics_present() {
        let rows = vec![innings(45, 1, 2019)];
        let result = compute_metrics(&rows, &[Metric::PeakYear, Metric::Centuries]);
        let present: Vec<Metric> = result.metrics().collect();
        // Catalog order, not selection order
        assert_eq!(present, vec![Metric::Centuries, Metric::PeakYear]);
    }

    #[test]
    fn metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_key(metric.key()), Some(metric));
        }
        assert!(Metric::BattingAverage.is_average());
        assert!(Metric::FourthInningsAverage.is_average());
        assert!(!Metric::StrikeRate.is_average());
        assert!(!Metric::PeakYear.is_scored());
    }
}
