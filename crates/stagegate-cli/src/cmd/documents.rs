use super::{load_catalog, load_config_or_default};
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, division: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = load_config_or_default(root, division)?;
    let catalog = load_catalog(root, &config)?;

    let docs: Vec<serde_json::Value> = catalog
        .stages()
        .iter()
        .map(|s| {
            serde_json::json!({
                "stage": s.name,
                "url": s.document_url,
            })
        })
        .collect();

    if json {
        return print_json(&docs);
    }

    let rows = catalog
        .stages()
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.document_url.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["STAGE", "DOCUMENTS"], rows);
    Ok(())
}
