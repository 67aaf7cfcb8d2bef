// Terminal charts for a comparison run: bars per metric, grouped averages,
// peak years and the year-range trend. One chart per screen; any key
// advances.
//
// Chart construction is pure (`build_charts`); `render` draws one chart
// into a frame and `show` drives a real terminal.

use std::collections::BTreeMap;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType};
use ratatui::Frame;

use strikerate_core::analysis::filter::YearRange;
use strikerate_core::analysis::metrics::{Metric, MetricResult, MetricValue};

/// Map a configured colour name onto a terminal colour. Unknown names are gray.
pub fn colour(name: &str) -> Color {
    match name.trim().to_lowercase().as_str() {
        "red" => Color::Red,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "green" => Color::Green,
        "cyan" => Color::Cyan,
        "magenta" => Color::Magenta,
        "white" => Color::White,
        "grey" | "gray" => Color::Gray,
        _ => Color::Gray,
    }
}

/// What the charts need to know about one player.
#[derive(Debug, Clone)]
pub struct ChartPlayer<'a> {
    pub name: &'a str,
    pub colour: Color,
    pub metrics: &'a MetricResult,
    /// Runs per year within the chosen year range, when one was chosen.
    pub yearly_runs: Option<BTreeMap<i32, u64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarItem {
    pub label: String,
    pub value: f64,
    pub colour: Color,
    /// Shown above the bar instead of the value.
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub colour: Color,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bars {
        title: String,
        bars: Vec<BarItem>,
    },
    Lines {
        title: String,
        years: YearRange,
        series: Vec<LineSeries>,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bars { title, .. } | ChartSpec::Lines { title, .. } => title,
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

fn metric_bars(players: &[ChartPlayer<'_>], metric: Metric) -> ChartSpec {
    let bars = players
        .iter()
        .map(|p| BarItem {
            label: p.name.to_string(),
            value: p.metrics.numeric(metric).unwrap_or(0.0),
            colour: p.colour,
            note: None,
        })
        .collect();
    ChartSpec::Bars {
        title: metric.label().to_string(),
        bars,
    }
}

fn short_average_label(metric: Metric) -> &'static str {
    match metric {
        Metric::FirstInningsAverage => "First",
        Metric::SecondInningsAverage => "Second",
        Metric::ThirdInningsAverage => "Third",
        Metric::FourthInningsAverage => "Fourth",
        _ => "Average",
    }
}

fn averages_chart(players: &[ChartPlayer<'_>], averages: &[Metric]) -> ChartSpec {
    let mut bars = Vec::new();
    for p in players {
        for &metric in averages {
            bars.push(BarItem {
                label: format!("{} - {}", p.name, short_average_label(metric)),
                value: p.metrics.numeric(metric).unwrap_or(0.0),
                colour: p.colour,
                note: None,
            });
        }
    }
    ChartSpec::Bars {
        title: "Batting Averages".to_string(),
        bars,
    }
}

fn peak_year_chart(players: &[ChartPlayer<'_>]) -> Option<ChartSpec> {
    let bars: Vec<BarItem> = players
        .iter()
        .filter_map(|p| match p.metrics.get(Metric::PeakYear) {
            Some(MetricValue::Peak(Some(peak))) => Some(BarItem {
                label: p.name.to_string(),
                value: peak.runs as f64,
                colour: p.colour,
                note: Some(format!("Year: {}", peak.year)),
            }),
            _ => None,
        })
        .collect();
    if bars.is_empty() {
        return None;
    }
    Some(ChartSpec::Bars {
        title: "Peak Year (Runs) per Player".to_string(),
        bars,
    })
}

fn trend_chart(players: &[ChartPlayer<'_>], years: YearRange) -> ChartSpec {
    let series = players
        .iter()
        .map(|p| LineSeries {
            name: p.name.to_string(),
            colour: p.colour,
            points: p
                .yearly_runs
                .iter()
                .flatten()
                .map(|(&year, &runs)| (year as f64, runs as f64))
                .collect(),
        })
        .collect();
    ChartSpec::Lines {
        title: "Performance Over Years".to_string(),
        years,
        series,
    }
}

/// Every chart a run calls for, in display order.
pub fn build_charts(
    players: &[ChartPlayer<'_>],
    selected: &[Metric],
    years: Option<YearRange>,
) -> Vec<ChartSpec> {
    let has = |m: Metric| selected.contains(&m);
    let mut charts = Vec::new();

    if has(Metric::TotalRuns) {
        charts.push(metric_bars(players, Metric::TotalRuns));
    }
    let averages: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|m| m.is_average() && has(*m))
        .collect();
    if !averages.is_empty() {
        charts.push(averages_chart(players, &averages));
    }
    if has(Metric::StrikeRate) {
        charts.push(metric_bars(players, Metric::StrikeRate));
    }
    for metric in Metric::ALL.into_iter().filter(|m| m.is_milestone() && has(*m)) {
        charts.push(metric_bars(players, metric));
    }
    if has(Metric::Boundaries) {
        charts.push(metric_bars(players, Metric::Boundaries));
    }
    if has(Metric::PeakYear) {
        charts.extend(peak_year_chart(players));
    }
    if let Some(years) = years {
        charts.push(trend_chart(players, years));
    }
    charts
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn chart_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} (press any key) "))
}

fn render_bars(frame: &mut Frame, area: Rect, title: &str, items: &[BarItem]) {
    let bars: Vec<Bar> = items
        .iter()
        .map(|item| {
            let text = item
                .note
                .clone()
                .unwrap_or_else(|| format_value(item.value));
            Bar::default()
                .value((item.value.max(0.0) * 100.0).round() as u64)
                .text_value(text)
                .label(Line::from(item.label.clone()))
                .style(Style::default().fg(item.colour))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(item.colour)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let count = items.len().max(1) as u16;
    let inner = area.width.saturating_sub(2);
    let bar_width = (inner / count).saturating_sub(1).clamp(1, 20);

    let chart = BarChart::default()
        .block(chart_block(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    frame.render_widget(chart, area);
}

fn render_lines(frame: &mut Frame, area: Rect, title: &str, years: YearRange, series: &[LineSeries]) {
    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.colour))
                .data(&s.points)
        })
        .collect();

    let top = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(_, runs)| runs))
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let (start, end) = (years.start as f64, (years.end as f64).max(years.start as f64 + 1.0));

    let chart = Chart::new(datasets)
        .block(chart_block(title))
        .x_axis(
            Axis::default()
                .title("Year")
                .bounds([start, end])
                .labels(vec![years.start.to_string(), years.end.to_string()]),
        )
        .y_axis(
            Axis::default()
                .title("Total Runs")
                .bounds([0.0, top])
                .labels(vec!["0".to_string(), format!("{top:.0}")]),
        );
    frame.render_widget(chart, area);
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Draw one chart into `area`.
pub fn render(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    match chart {
        ChartSpec::Bars { title, bars } => render_bars(frame, area, title, bars),
        ChartSpec::Lines {
            title,
            years,
            series,
        } => render_lines(frame, area, title, *years, series),
    }
}

/// Show each chart full-screen, waiting for a key press between them.
pub fn show(charts: &[ChartSpec]) -> std::io::Result<()> {
    if charts.is_empty() {
        return Ok(());
    }
    let mut terminal = ratatui::init();
    let result = (|| -> std::io::Result<()> {
        for chart in charts {
            terminal.draw(|frame| render(frame, frame.area(), chart))?;
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    })();
    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
