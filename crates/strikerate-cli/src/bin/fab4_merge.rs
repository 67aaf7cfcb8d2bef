// Merge each cohort player's home and away innings exports into one
// cleaned CSV per player.

use anyhow::Context;
use tracing::info;

use strikerate_cli::logging;
use strikerate_core::config;
use strikerate_core::preprocess::merge;

fn main() -> anyhow::Result<()> {
    logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    info!("merging innings for {} players", config.cohort.players.len());

    for player in &config.cohort.players {
        let written = merge::merge_player_files(player)
            .with_context(|| format!("failed to merge innings for {}", player.name))?;
        println!("{}: {written} innings written to {}", player.name, player.merged_csv);
    }
    Ok(())
}
