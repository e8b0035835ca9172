//! In-process skill catalog shared by the in-memory and file stores.
//!
//! Holds projects and skills in id order and enforces the store rules:
//! per-scope slug uniqueness, project existence for project skills, and
//! cascade deletion of a project's skills.

use chrono::{DateTime, Utc};
use notewise_core::error::StoreError;
use notewise_core::skill::{
    NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCatalog {
    #[serde(default)]
    projects: Vec<Project>,

    #[serde(default)]
    skills: Vec<Skill>,

    #[serde(default)]
    last_project_id: ProjectId,

    #[serde(default)]
    last_skill_id: SkillId,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repair id counters after loading a hand-edited snapshot.
    pub fn normalize(&mut self) {
        let max_project = self.projects.iter().map(|p| p.id).max().unwrap_or(0);
        let max_skill = self.skills.iter().map(|s| s.id).max().unwrap_or(0);
        self.last_project_id = self.last_project_id.max(max_project);
        self.last_skill_id = self.last_skill_id.max(max_skill);
        self.projects.sort_by_key(|p| p.id);
        self.skills.sort_by_key(|s| s.id);
    }

    pub fn global_auto_skills(&self) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| s.scope == SkillScope::Global && s.auto_activate)
            .cloned()
            .collect()
    }

    pub fn project_auto_skills(&self, project_id: ProjectId) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| {
                s.scope == SkillScope::Project
                    && s.project_id == Some(project_id)
                    && s.auto_activate
            })
            .cloned()
            .collect()
    }

    pub fn create_project(&mut self, name: &str, now: DateTime<Utc>) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Storage("project name must not be empty".into()));
        }
        self.last_project_id += 1;
        let project = Project {
            id: self.last_project_id,
            name: name.to_string(),
            created_at: now,
        };
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Remove a project and every skill scoped to it.
    pub fn delete_project(&mut self, id: ProjectId) -> Result<usize, StoreError> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(StoreError::ProjectNotFound(id));
        }
        let skills_before = self.skills.len();
        self.skills
            .retain(|s| !(s.scope == SkillScope::Project && s.project_id == Some(id)));
        Ok(skills_before - self.skills.len())
    }

    pub fn create_skill(&mut self, draft: NewSkill, now: DateTime<Utc>) -> Result<Skill, StoreError> {
        draft.validate()?;
        if let Some(project_id) = draft.project_id {
            if self.project(project_id).is_none() {
                return Err(StoreError::ProjectNotFound(project_id));
            }
        }
        let slug = draft.resolved_slug();
        if self.slug_taken(draft.scope, draft.project_id, &slug, None) {
            return Err(StoreError::SlugConflict {
                slug,
                scope: draft.scope,
            });
        }
        self.last_skill_id += 1;
        let skill = draft.into_skill(self.last_skill_id, now);
        self.skills.push(skill.clone());
        Ok(skill)
    }

    pub fn update_skill(
        &mut self,
        id: SkillId,
        update: SkillUpdate,
        now: DateTime<Utc>,
    ) -> Result<Skill, StoreError> {
        let current = self.skill(id).ok_or(StoreError::SkillNotFound(id))?;
        let mut edited = current.clone();
        update.apply(&mut edited, now)?;
        if edited.slug != current.slug
            && self.slug_taken(edited.scope, edited.project_id, &edited.slug, Some(id))
        {
            return Err(StoreError::SlugConflict {
                slug: edited.slug,
                scope: edited.scope,
            });
        }
        if let Some(slot) = self.skills.iter_mut().find(|s| s.id == id) {
            *slot = edited.clone();
        }
        Ok(edited)
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn list_skills(&self, scope: Option<SkillScope>) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| scope.is_none_or(|wanted| s.scope == wanted))
            .cloned()
            .collect()
    }

    pub fn delete_skill(&mut self, id: SkillId) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s.id != id);
        self.skills.len() < before
    }

    /// Whether `slug` is already used in the given scope.
    ///
    /// Global slugs are compared among global skills only; project slugs
    /// among the skills of the same project only.
    fn slug_taken(
        &self,
        scope: SkillScope,
        project_id: Option<ProjectId>,
        slug: &str,
        except: Option<SkillId>,
    ) -> bool {
        self.skills.iter().any(|s| {
            Some(s.id) != except
                && s.scope == scope
                && s.project_id == project_id
                && s.slug == slug
        })
    }
}
