//! In-memory store: useful for testing and ephemeral sessions.

use crate::catalog::SkillCatalog;
use async_trait::async_trait;
use chrono::Utc;
use notewise_core::error::StoreError;
use notewise_core::skill::{NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate};
use notewise_core::store::SkillStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory skill store.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemorySkillStore {
    catalog: Arc<RwLock<SkillCatalog>>,
}

impl InMemorySkillStore {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(RwLock::new(SkillCatalog::new())),
        }
    }
}

impl Default for InMemorySkillStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SkillStore for InMemorySkillStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn global_auto_skills(&self) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.global_auto_skills())
    }

    async fn project_auto_skills(&self, project_id: ProjectId) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.project_auto_skills(project_id))
    }

    async fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        self.catalog.write().await.create_project(name, Utc::now())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.catalog.read().await.project(id).cloned())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<usize, StoreError> {
        self.catalog.write().await.delete_project(id)
    }

    async fn create_skill(&self, skill: NewSkill) -> Result<Skill, StoreError> {
        self.catalog.write().await.create_skill(skill, Utc::now())
    }

    async fn update_skill(&self, id: SkillId, update: SkillUpdate) -> Result<Skill, StoreError> {
        self.catalog.write().await.update_skill(id, update, Utc::now())
    }

    async fn get_skill(&self, id: SkillId) -> Result<Option<Skill>, StoreError> {
        Ok(self.catalog.read().await.skill(id).cloned())
    }

    async fn list_skills(&self, scope: Option<SkillScope>) -> Result<Vec<Skill>, StoreError> {
        Ok(self.catalog.read().await.list_skills(scope))
    }

    async fn delete_skill(&self, id: SkillId) -> Result<bool, StoreError> {
        Ok(self.catalog.write().await.delete_skill(id))
    }
}
