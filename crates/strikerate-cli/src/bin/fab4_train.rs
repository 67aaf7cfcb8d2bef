// Train and persist one series model per cohort player, reporting hold-out
// MAE and R².

use std::path::Path;

use anyhow::Context;
use tracing::info;

use strikerate_cli::{logging, report};
use strikerate_core::config;
use strikerate_core::data::innings;
use strikerate_core::predict::series::SeriesModel;

fn main() -> anyhow::Result<()> {
    logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    let model_dir = Path::new(&config.model.model_dir);

    for player in &config.cohort.players {
        let rows = innings::load_merged(Path::new(&player.merged_csv))
            .with_context(|| format!("failed to load merged innings for {}", player.name))?;
        let model = SeriesModel::train(&player.name, &rows, &config.model)
            .with_context(|| format!("failed to train model for {}", player.name))?;
        model
            .save(model_dir)
            .with_context(|| format!("failed to save model for {}", player.name))?;
        println!("{}", report::training_line(&player.name, &model.model.evaluation));
    }
    info!("models written to {}", model_dir.display());
    Ok(())
}
