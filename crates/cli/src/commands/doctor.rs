//! `knowroute doctor`: Diagnose system health.

use knowroute_config::AppConfig;
use knowroute_storage::FileCatalogStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 KnowRoute Doctor: System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file: run `knowroute init` (using defaults)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured: set KNOWROUTE_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    let catalog_path = config.storage.resolved_catalog_path();
    match FileCatalogStore::open(&catalog_path) {
        Ok(_) if !catalog_path.exists() => {
            println!("  ⚠️  No catalog at {}: nothing to route to", catalog_path.display());
            issues += 1;
        }
        Ok(_) => println!("  ✅ Catalog readable: {}", catalog_path.display()),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    let providers = knowroute_providers::build_from_config(&config);
    match providers.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' answered but reports unhealthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        None => {
            println!("  ❌ Default provider '{}' not configured", config.default_provider);
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
