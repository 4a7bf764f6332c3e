pub mod candidates;
pub mod doctor;
pub mod init;
pub mod parse;
pub mod route;

use knowroute_config::AppConfig;
use knowroute_storage::FileCatalogStore;
use std::io::Read;
use std::path::PathBuf;

/// Read a file, or stdin when `source` is `-`.
pub fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Open the catalog named on the command line, or the configured one.
pub fn open_catalog(
    config: &AppConfig,
    path: Option<PathBuf>,
) -> Result<FileCatalogStore, Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(|| config.storage.resolved_catalog_path());
    Ok(FileCatalogStore::open(path)?)
}
