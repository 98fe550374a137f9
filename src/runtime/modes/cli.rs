//! One-shot commands that do not start the server

use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::StaticConfig;
use crate::utils::password::hash_password;

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

pub fn run_config_command(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());
            generate_config(&path, force)
        }
    }
}

pub fn generate_config(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path);
    }

    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Failed to write {}", path))?;

    println!("{} {}", "Sample configuration written to".green(), path.bold());
    Ok(())
}

pub fn run_hash_password(password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("password must not be empty");
    }
    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{}", hash);
    Ok(())
}
