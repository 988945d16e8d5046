//! Init command - create the report database.

use console::style;

use super::{load_config, open_store};

pub async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    println!(
        "{} Report database ready at {} ({} reports)",
        style("✓").green(),
        config.storage.database.display(),
        store.count()?
    );

    Ok(())
}
