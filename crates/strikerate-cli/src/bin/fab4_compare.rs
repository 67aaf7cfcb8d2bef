// Compare the cohort on user-selected metrics.
//
// Flow:
// 1. Choose metrics and optional filters (home/away, year range, opposition)
// 2. Compute metrics per player over the filtered innings
// 3. Normalize, score and rank; print the ranking
// 4. Optionally print the detailed breakdown and show charts

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use strikerate_cli::charts::{self, ChartPlayer};
use strikerate_cli::prompt::{self, Prompter};
use strikerate_cli::report;
use strikerate_core::analysis::filter::{FilterKind, InningsFilter};
use strikerate_core::analysis::metrics::{self, Metric, PlayerMetrics};
use strikerate_core::analysis::scoring;
use strikerate_core::config;
use strikerate_core::data::innings;

fn main() -> anyhow::Result<()> {
    strikerate_cli::logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    let mut prompter = Prompter::stdio();

    // 1. Metrics and filters
    prompter.say("Choose the Metrics you want to Compare (comma-separated):")?;
    let labels: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
    prompter.menu(&labels)?;
    let selected = prompter.ask("Enter Metric Numbers: ", prompt::parse_metric_selection)?;

    prompter.say("Choose Filters to Apply (comma-separated, enter 0 for none):")?;
    let filter_labels: Vec<String> = FilterKind::ALL
        .iter()
        .map(|f| format!("Filter by {}", f.label()))
        .collect();
    prompter.menu(&filter_labels)?;
    let kinds = prompter.ask("Enter Filter Numbers: ", prompt::parse_filter_selection)?;

    let mut filter = InningsFilter::default();
    for kind in &kinds {
        match kind {
            FilterKind::HomeAway => {
                filter.venue = Some(prompter.ask(
                    "Choose Home/Away (1 for Home, 0 for Away): ",
                    prompt::parse_venue,
                )?);
            }
            FilterKind::YearRange => {
                filter.years = Some(prompter.ask_year_range()?);
            }
            FilterKind::Opposition => {
                let team = prompter.ask("Enter Opposition Team: ", prompt::parse_text)?;
                filter.opposition = Some(team.to_lowercase());
            }
        }
    }
    info!(?selected, ?filter, "comparison requested");

    // 2. Metrics per player
    let mut run = Vec::new();
    let mut trends = HashMap::new();
    for player in &config.cohort.players {
        let rows = innings::load_merged(Path::new(&player.merged_csv))
            .with_context(|| format!("failed to load merged innings for {}", player.name))?;
        let kept = filter.apply(&rows);
        info!(player = %player.name, innings = kept.len(), "innings after filters");
        if filter.years.is_some() {
            let in_range = filter.years_only().apply(&rows);
            trends.insert(player.name.clone(), metrics::yearly_runs(&in_range));
        }
        run.push(PlayerMetrics {
            player: player.name.clone(),
            metrics: metrics::compute_metrics(&kept, &selected),
        });
    }

    // 3. Ranking
    let ranked = scoring::rank(run, &config.scoring);
    prompter.say("")?;
    prompter.say("Rankings Based on Selected Metrics:")?;
    for line in report::ranking_lines(&ranked) {
        prompter.say(&line)?;
    }

    // 4. Details and charts
    if prompter.ask_yes_no("Do You Want to see the Detailed Stats?")? {
        prompter.say("")?;
        prompter.say("Detailed Player Metrics with Scores:")?;
        for line in report::detail_lines(&ranked) {
            prompter.say(&line)?;
        }
    }

    if prompter.ask_yes_no("Do You Want to Display Graphs for the Selected Metrics?")? {
        let players: Vec<ChartPlayer> = config
            .cohort
            .players
            .iter()
            .filter_map(|p| {
                let result = ranked.iter().find(|r| r.player == p.name)?;
                Some(ChartPlayer {
                    name: &p.name,
                    colour: charts::colour(&p.colour),
                    metrics: &result.metrics,
                    yearly_runs: trends.get(&p.name).cloned(),
                })
            })
            .collect();
        let specs = charts::build_charts(&players, &selected, filter.years);
        charts::show(&specs).context("failed to draw charts")?;
    }

    Ok(())
}
