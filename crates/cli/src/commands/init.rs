//! `knowroute init`: Write a default config and an empty catalog.

use knowroute_config::AppConfig;
use knowroute_storage::Catalog;

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("🧭 KnowRoute Setup");
    println!("====================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("  Config file exists: {} (use --force to overwrite)", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Wrote config: {}", config_path.display());
    }

    let config = AppConfig::load_from(&config_path)?;
    let catalog_path = config.storage.resolved_catalog_path();
    if catalog_path.exists() {
        println!("  Catalog exists: {}", catalog_path.display());
    } else {
        if let Some(parent) = catalog_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&catalog_path, serde_json::to_string_pretty(&Catalog::default())?)?;
        println!("✅ Created empty catalog: {}", catalog_path.display());
    }

    println!();
    println!("  Next steps:");
    println!("    1. Set KNOWROUTE_API_KEY (or OPENAI_API_KEY / OPENROUTER_API_KEY)");
    println!("    2. Add users, collections and files to the catalog");
    println!("    3. Run `knowroute doctor`");

    Ok(())
}
