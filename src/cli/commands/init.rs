use std::path::Path;

use crate::config::Config;

pub fn cmd_init(config_path: &Path) -> anyhow::Result<()> {
    if Config::create_default_if_missing(config_path)? {
        println!("✓ Config file created at {}", config_path.display());
        println!("  Set api_url (and translation.api_token) and run again.");
    } else {
        println!("Config file already exists at {}", config_path.display());
    }
    Ok(())
}
