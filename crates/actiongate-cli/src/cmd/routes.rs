use crate::output::{print_json, print_table};
use actiongate_core::config::Config;
use anyhow::Result;
use std::path::Path;

/// Print the route table the daemon would serve.
pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let table = actiongate_server::prepare(&config)?;
    let routes = table.describe();

    if json {
        return print_json(&routes);
    }
    if routes.is_empty() {
        println!("No routes.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = routes
        .into_iter()
        .map(|r| vec![r.path, r.endpoint, r.action])
        .collect();
    print_table(&["PATH", "ENDPOINT", "ACTION"], &rows);
    Ok(())
}
