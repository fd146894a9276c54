use anyhow::Result;
use console::style;
use std::io::Write;
use std::path::Path;

use super::ConfigCommands;
use crate::config::{Config, CONFIG_KEYS};
use crate::error::NocMatchError;

/// Run a `nocmatch config` subcommand against the active config file
pub async fn handle_config_command(command: ConfigCommands) -> Result<()> {
    let path = Config::get_config_path()?;
    run_config_command(command, &path, &mut std::io::stdout())
}

fn run_config_command<W: Write>(command: ConfigCommands, path: &Path, out: &mut W) -> Result<()> {
    match command {
        ConfigCommands::Get { key } => {
            let value = Config::load_from(path)?.get(&key).ok_or_else(|| {
                NocMatchError::invalid_config(format!(
                    "'{key}' is not set in {}",
                    path.display()
                ))
            })?;
            writeln!(out, "{value}")?;
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(path)?;
            config.set(&key, value)?;
            config.save_to(path)?;
            writeln!(
                out,
                "{} {} saved to {}",
                style("✓").green(),
                style(&key).cyan(),
                style(path.display()).dim()
            )?;
        }
        ConfigCommands::Unset { key } => {
            let mut config = Config::load_from(path)?;
            config.unset(&key)?;
            config.save_to(path)?;
            writeln!(out, "{} {} removed", style("✓").green(), style(&key).cyan())?;
        }
        ConfigCommands::List => write_listing(&Config::load_from(path)?, path, out)?,
        ConfigCommands::Path => writeln!(out, "{}", path.display())?,
    }

    Ok(())
}

fn write_listing<W: Write>(config: &Config, path: &Path, out: &mut W) -> Result<()> {
    let items = config.list();

    if items.is_empty() {
        writeln!(out, "{}", style(format!("Nothing set in {}", path.display())).dim())?;
        writeln!(out, "Keys:")?;
        for key in CONFIG_KEYS {
            writeln!(out, "  {}", style(key).cyan())?;
        }
        return Ok(());
    }

    let width = items.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in items {
        writeln!(out, "{} = {value}", style(format!("{key:<width$}")).cyan())?;
    }

    Ok(())
}
