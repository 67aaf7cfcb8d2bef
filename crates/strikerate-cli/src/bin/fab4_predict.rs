// Predict a cohort player's runs in a future series against a chosen
// opposition, using the models written by fab4-train.

use std::path::Path;

use anyhow::Context;

use strikerate_cli::prompt::{self, Prompter};
use strikerate_cli::{logging, report};
use strikerate_core::config;
use strikerate_core::data::innings;
use strikerate_core::predict::series::{self, SeriesModel, SeriesRequest};

fn main() -> anyhow::Result<()> {
    logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    let model_dir = Path::new(&config.model.model_dir);
    let max_matches = config.prediction.max_series_matches;
    let players = &config.cohort.players;
    let mut prompter = Prompter::stdio();

    loop {
        prompter.say("Available players:")?;
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        prompter.menu(&names)?;
        let choice = prompter.ask("Enter the Number Corresponding to the Player: ", |s| {
            prompt::parse_bounded(s, 1, players.len() as i64)
        })?;
        let player = &players[(choice - 1) as usize];

        let rows = innings::load_merged(Path::new(&player.merged_csv))
            .with_context(|| format!("failed to load merged innings for {}", player.name))?;
        let valid = series::valid_oppositions(&rows);
        prompter.say("Available Oppositions:")?;
        for team in &valid {
            prompter.say(&format!("- {}", report::title_case(team)))?;
        }
        let opposition =
            prompter.ask("Enter Opposition Team: ", |s| prompt::parse_listed(s, &valid))?;
        let venue = prompter.ask("Enter 1 for Home, 0 for Away: ", prompt::parse_venue)?;
        let matches = prompter.ask(
            &format!("Enter Number of Matches to Predict (1 to {max_matches}): "),
            |s| prompt::parse_bounded(s, 1, max_matches as i64),
        )? as u32;

        let model = SeriesModel::load(model_dir, &player.name).with_context(|| {
            format!("no trained model for {}; run fab4-train first", player.name)
        })?;
        let request = SeriesRequest::new(&opposition, venue, matches, max_matches)?;
        let prediction = model.predict(&rows, &request, config.prediction.season_year)?;

        prompter.say("")?;
        prompter.say(&report::series_line(
            &player.name,
            &request.opposition,
            venue,
            matches,
            prediction.total,
        ))?;

        if !prompter.ask_yes_no("Would you Like to Predict for Another Player?")? {
            prompter.say("Exiting FAB4 Predictor")?;
            break;
        }
    }
    Ok(())
}
