use anyhow::Result;
use std::path::Path;
use std::process::Command;

use crate::config::Config;

pub async fn show_config(path: Option<&Path>) -> Result<()> {
    let config_file = Config::resolve_path(path)?;
    let config = Config::load_from(&config_file)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration ({})", config_file.display());
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn edit_config(path: Option<&Path>) -> Result<()> {
    let config_file = Config::resolve_path(path)?;

    // Ensure config file exists
    if !config_file.exists() {
        Config::default().save_to(&config_file)?;
    }

    // Open in default editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    Command::new(editor).arg(&config_file).status()?;

    // Validate the edited file
    Config::load_from(&config_file)?;

    println!("✓ Configuration saved!");

    Ok(())
}

pub async fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = Config::resolve_path(path)?;

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
    println!("You can edit it with: ai-coach config edit");

    Ok(())
}
