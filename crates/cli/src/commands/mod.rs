pub mod config_cmd;
pub mod project;
pub mod skills;
pub mod status;

use notewise_config::AppConfig;
use notewise_core::store::SkillStore;
use notewise_store::{FileSkillStore, InMemorySkillStore, SqliteSkillStore};
use std::sync::Arc;

/// Open the skill store selected by `[store]`.
pub async fn open_store(
    config: &AppConfig,
) -> Result<Arc<dyn SkillStore>, Box<dyn std::error::Error>> {
    let path = config.store.resolved_path();
    let store: Arc<dyn SkillStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(InMemorySkillStore::new()),
        "file" => Arc::new(FileSkillStore::new(path)),
        "sqlite" => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let url = format!("sqlite://{}", path.display());
            Arc::new(SqliteSkillStore::new(&url).await?)
        }
        other => return Err(format!("Unknown store backend: {other}").into()),
    };
    tracing::debug!(backend = store.name(), "Skill store opened");
    Ok(store)
}
