use anyhow::Context;
use stagegate_core::config::{Config, StoreBackend};
use stagegate_core::store::RedbStore;
use stagegate_core::types::Division;
use stagegate_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, division: Option<&str>, backend: StoreBackend) -> anyhow::Result<()> {
    println!("Initializing stagegate in: {}", root.display());

    for dir in [paths::STAGEGATE_DIR, paths::PROJECTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config")?
    } else {
        let mut cfg = Config::new(division.map(Division::new).unwrap_or_default());
        cfg.store.backend = backend;
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    if config.store.backend == StoreBackend::Redb {
        let db_path = paths::status_db_path(root);
        let existed = db_path.exists();
        RedbStore::open(&db_path).context("failed to open status database")?;
        if existed {
            println!("  exists:  {}", paths::STATUS_DB_FILE);
        } else {
            println!("  created: {}", paths::STATUS_DB_FILE);
        }
    }

    println!(
        "\nDivision: {}  Store: {}",
        config.division, config.store.backend
    );
    Ok(())
}
