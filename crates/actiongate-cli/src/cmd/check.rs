use actiongate_core::config::Config;
use anyhow::Result;
use std::path::Path;

/// Load and validate the configuration without serving anything.
pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let table = actiongate_server::prepare(&config)?;

    println!(
        "{}: {} route(s), {} item(s) skipped, listening address {}",
        config_path.display(),
        table.len(),
        table.skipped().len(),
        config.bind_addr()
    );
    for (identity, reason) in table.skipped() {
        println!("  skipped {identity}: {reason}");
    }
    Ok(())
}
