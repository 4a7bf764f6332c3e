//! `knowroute candidates`: List the collections a user may read.

use super::{load_config, open_catalog};
use knowroute_router::CandidateCatalog;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(user: &str, catalog: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let store = Arc::new(open_catalog(&config, catalog)?);
    let catalog = CandidateCatalog::new(store.clone(), store);

    let identity = catalog.resolve_identity(Some(user)).await?;
    let candidates = catalog.list(&identity).await?;

    println!("📚 Knowledge bases readable by {}", identity.id);
    println!();
    if candidates.is_empty() {
        println!("   (none)");
        return Ok(());
    }
    for c in &candidates {
        println!("  {:<24} {}", c.id, c.name);
        if !c.description.is_empty() {
            println!("  {:<24} {}", "", c.description);
        }
    }
    println!();
    println!("  {} candidate(s)", candidates.len());

    Ok(())
}
