use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

fn config_path(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Config::config_file(),
    }
}

pub async fn show_config(path: Option<&str>) -> Result<()> {
    let config_file = config_path(path)?;
    let mut config = Config::load_from(&config_file)?;
    if !config.auth.token.is_empty() {
        config.auth.token = "********".to_string();
    }
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration ({})", config_file.display());
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_file = config_path(path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());
    println!();
    println!("Set [auth] user_id and token to sync workouts");

    Ok(())
}
