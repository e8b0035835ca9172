//! File-based skill store: a single JSON snapshot on disk.
//!
//! The whole catalog (projects, skills, id counters) is one pretty-printed
//! JSON document, loaded on creation and rewritten on every mutation.
//!
//! Storage location: `~/.notewise/skills.json`

use crate::catalog::SkillCatalog;
use async_trait::async_trait;
use chrono::Utc;
use notewise_core::error::StoreError;
use notewise_core::skill::{NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate};
use notewise_core::store::SkillStore;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed skill store.
///
/// Mutations are applied to a copy of the catalog and only committed in
/// memory once the snapshot has been written, so a failed write leaves both
/// the file and the in-memory view unchanged.
pub struct FileSkillStore {
    path: PathBuf,
    catalog: RwLock<SkillCatalog>,
}

impl FileSkillStore {
    /// Open a store at the given path.
    ///
    /// A missing file starts an empty catalog (the file is created on first
    /// write). An unreadable or corrupted file is logged and also starts empty.
    pub fn new(path: PathBuf) -> Self {
        let catalog = Self::load_from_disk(&path);
        debug!(path = %path.display(), "File skill store loaded");
        Self {
            path,
            catalog: RwLock::new(catalog),
        }
    }

    /// Default path: `~/.notewise/skills.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".notewise").join("skills.json")
    }

    fn load_from_disk(path: &Path) -> SkillCatalog {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return SkillCatalog::new(),
        };
        if content.trim().is_empty() {
            return SkillCatalog::new();
        }

        match serde_json::from_str::<SkillCatalog>(&content) {
            Ok(mut catalog) => {
                catalog.normalize();
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping corrupted skill snapshot");
                SkillCatalog::new()
            }
        }
    }

    fn flush(&self, catalog: &SkillCatalog) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create skill directory: {e}"))
            })?;
        }

        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize skills: {e}")))?;

        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::Storage(format!("Failed to write skill file: {e}")))
    }

    async fn mutate<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SkillCatalog) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        let out = op(&mut next)?;
        self.flush(&next)?;
        *catalog = next;
        Ok(out)
    }
}

#[async_trait]
impl SkillStore for FileSkillStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn global_auto_skills(&self) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.global_auto_skills())
    }

    async fn project_auto_skills(&self, project_id: ProjectId) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.project_auto_skills(project_id))
    }

    async fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        self.mutate(|c| c.create_project(name, Utc::now())).await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.catalog.read().await.project(id).cloned())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<usize, StoreError> {
        self.mutate(|c| c.delete_project(id)).await
    }

    async fn create_skill(&self, skill: NewSkill) -> Result<Skill, StoreError> {
        self.mutate(|c| c.create_skill(skill, Utc::now())).await
    }

    async fn update_skill(&self, id: SkillId, update: SkillUpdate) -> Result<Skill, StoreError> {
        self.mutate(|c| c.update_skill(id, update, Utc::now())).await
    }

    async fn get_skill(&self, id: SkillId) -> Result<Option<Skill>, StoreError> {
        Ok(self.catalog.read().await.skill(id).cloned())
    }

    async fn list_skills(&self, scope: Option<SkillScope>) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.list_skills(scope))
    }

    async fn delete_skill(&self, id: SkillId) -> Result<bool, StoreError> {
        self.mutate(|c| Ok(c.delete_skill(id))).await
    }
}
