//! Skill store trait: persistent storage for skills and their projects.
//!
//! The matching engine only reads through the two auto-skill retrieval
//! operations. The authoring operations exist for the CLI and for tests.

use crate::error::StoreError;
use crate::skill::{NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate};
use async_trait::async_trait;

/// The core SkillStore trait.
///
/// Implementations: SQLite, JSON file, in-memory (for testing).
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// The store name (e.g., "sqlite", "file", "in_memory").
    fn name(&self) -> &str;

    /// All auto-activating global skills.
    async fn global_auto_skills(&self) -> Result<Vec<Skill>, StoreError>;

    /// All auto-activating skills of one project.
    async fn project_auto_skills(&self, project_id: ProjectId)
    -> Result<Vec<Skill>, StoreError>;

    /// Create a project.
    async fn create_project(&self, name: &str) -> Result<Project, StoreError>;

    /// Get a project by ID.
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Delete a project and its project-scoped skills.
    ///
    /// Returns the number of skills removed by the cascade, or
    /// `ProjectNotFound` if there was no such project.
    async fn delete_project(&self, id: ProjectId) -> Result<usize, StoreError>;

    /// Create a skill, enforcing per-scope slug uniqueness.
    async fn create_skill(&self, skill: NewSkill) -> Result<Skill, StoreError>;

    /// Edit a skill's content or metadata.
    async fn update_skill(&self, id: SkillId, update: SkillUpdate) -> Result<Skill, StoreError>;

    /// Get a skill by ID.
    async fn get_skill(&self, id: SkillId) -> Result<Option<Skill>, StoreError>;

    /// List skills, optionally restricted to one scope. Ordered by id.
    async fn list_skills(&self, scope: Option<SkillScope>) -> Result<Vec<Skill>, StoreError>;

    /// Delete a skill by ID.
    async fn delete_skill(&self, id: SkillId) -> Result<bool, StoreError>;
}
