// Clean the past and latest career snapshot tables into the shared
// career schema.

use anyhow::Context;

use strikerate_cli::logging;
use strikerate_core::config;
use strikerate_core::preprocess::career;

fn main() -> anyhow::Result<()> {
    logging::init_tracing()?;
    let config = config::load_config().context("failed to load configuration")?;
    let paths = &config.career;

    let (past, latest) =
        career::clean_snapshot_files(paths).context("failed to clean career snapshots")?;
    println!("{past} players written to {}", paths.past_clean);
    println!("{latest} players written to {}", paths.latest_clean);
    Ok(())
}
