// Forecast a player's career runs at a chosen innings count.
//
// Trains on the cleaned past snapshot, reports hold-out and cross-validation
// metrics, then answers lookups against both snapshots until told to stop.

use std::path::Path;

use anyhow::Context;

use strikerate_cli::prompt::{self, InputError, Prompter};
use strikerate_cli::{logging, report};
use strikerate_core::config;
use strikerate_core::data::career;
use strikerate_core::predict::career::{
    check_expected_innings, project_career, CareerLookup, CareerModel,
};

fn main() -> anyhow::Result<()> {
    logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    let paths = &config.career;

    let past = career::load_clean(Path::new(&paths.past_clean))
        .with_context(|| format!("failed to load {}", paths.past_clean))?;
    let latest = career::load_clean(Path::new(&paths.latest_clean))
        .with_context(|| format!("failed to load {}", paths.latest_clean))?;

    let model = CareerModel::train(&past, &config.model).context("failed to train career model")?;
    let mut prompter = Prompter::stdio();
    prompter.say("")?;
    for line in report::career_model_lines(&model.evaluation, &model.cross_validation) {
        prompter.say(&line)?;
    }

    let max_expected = config.prediction.max_expected_innings;
    loop {
        prompter.say("")?;
        let lookup = prompter.ask("Enter the Player's Name: ", |s| {
            let name = prompt::parse_text(s)?;
            CareerLookup::find(&past, &latest, &name).ok_or_else(|| {
                InputError::Rejected(format!("player `{name}` not found in either snapshot"))
            })
        })?;
        prompter.say(&lookup.describe(paths.past_year, paths.latest_year))?;

        let current = lookup.base().innings;
        let expected = prompter.ask("Enter Total Number of Expected Innings: ", |s| {
            let n = prompt::parse_bounded(s, 0, i64::from(u32::MAX))? as u32;
            check_expected_innings(n, current, max_expected)
                .map_err(|e| InputError::Rejected(e.to_string()))?;
            Ok(n)
        })?;

        let projection = project_career(&model, lookup, expected, max_expected, &config.growth)?;
        prompter.say("")?;
        for line in report::projection_lines(&projection) {
            prompter.say(&line)?;
        }

        if !prompter.ask_yes_no("Do You Want to Predict Stats for Another Player?")? {
            prompter.say("Exiting Predictor Model")?;
            break;
        }
    }
    Ok(())
}
