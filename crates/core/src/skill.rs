//! Skill domain model: reusable instruction snippets injected into prompts.
//!
//! A skill belongs to exactly one scope: `global` (applies to every project)
//! or `project` (applies to one project). Slugs are unique per scope, never
//! globally, so a global skill and a project skill may share a slug.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Skill identifier, assigned by the store at creation.
pub type SkillId = i64;

/// Project identifier.
pub type ProjectId = i64;

/// Where a skill applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillScope {
    Global,
    Project,
}

impl SkillScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for SkillScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SkillScope {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "project" => Ok(Self::Project),
            other => Err(StoreError::InvalidSkill(format!("unknown scope '{other}'"))),
        }
    }
}

/// A reusable instruction snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,

    /// Display name, not unique
    pub name: String,

    /// URL-safe identifier, unique within its scope
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Instruction body (markdown)
    #[serde(default)]
    pub content: String,

    pub scope: SkillScope,

    /// Owning project; `Some` exactly when `scope` is `Project`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// Words or phrases used for matching. Malformed values decode as empty.
    #[serde(default, deserialize_with = "lenient_keywords")]
    pub trigger_keywords: Vec<String>,

    /// Manual-only skills never take part in automatic matching
    #[serde(default = "default_true")]
    pub auto_activate: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Skill {
    pub fn is_project_scoped(&self) -> bool {
        self.scope == SkillScope::Project
    }
}

/// A project that owns project-scoped skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a skill. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewSkill {
    pub name: String,
    /// Explicit slug; derived from `name` when absent
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub scope: SkillScope,
    pub project_id: Option<ProjectId>,
    pub trigger_keywords: Vec<String>,
    pub auto_activate: bool,
}

impl NewSkill {
    pub fn global(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            description: None,
            content: content.into(),
            scope: SkillScope::Global,
            project_id: None,
            trigger_keywords: Vec::new(),
            auto_activate: true,
        }
    }

    pub fn project(
        project_id: ProjectId,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            scope: SkillScope::Project,
            project_id: Some(project_id),
            ..Self::global(name, content)
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Exclude the skill from automatic matching.
    pub fn manual(mut self) -> Self {
        self.auto_activate = false;
        self
    }

    /// The slug this skill will be stored under.
    pub fn resolved_slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.name))
    }

    /// Check name and scope/project consistency. Project existence and slug
    /// uniqueness are the store's job.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidSkill("name must not be empty".into()));
        }
        match (self.scope, self.project_id) {
            (SkillScope::Global, Some(_)) => Err(StoreError::InvalidSkill(
                "global skills cannot reference a project".into(),
            )),
            (SkillScope::Project, None) => Err(StoreError::InvalidSkill(
                "project skills require a project id".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Materialize into a stored skill.
    pub fn into_skill(self, id: SkillId, now: DateTime<Utc>) -> Skill {
        let slug = self.resolved_slug();
        Skill {
            id,
            name: self.name.trim().to_string(),
            slug,
            description: self.description,
            content: self.content,
            scope: self.scope,
            project_id: self.project_id,
            trigger_keywords: self.trigger_keywords,
            auto_activate: self.auto_activate,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial edit. Scope cannot change after creation.
#[derive(Debug, Clone, Default)]
pub struct SkillUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub trigger_keywords: Option<Vec<String>>,
    pub auto_activate: Option<bool>,
}

impl SkillUpdate {
    /// The slug after the update, if the update changes it.
    pub fn resolved_slug(&self) -> Option<String> {
        self.slug.as_deref().map(slugify)
    }

    /// Apply the edit in place and bump `updated_at`.
    pub fn apply(self, skill: &mut Skill, now: DateTime<Utc>) -> Result<(), StoreError> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StoreError::InvalidSkill("name must not be empty".into()));
        }
        if let Some(slug) = self.resolved_slug() {
            skill.slug = slug;
        }
        if let Some(name) = self.name {
            skill.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            skill.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(content) = self.content {
            skill.content = content;
        }
        if let Some(keywords) = self.trigger_keywords {
            skill.trigger_keywords = keywords;
        }
        if let Some(auto) = self.auto_activate {
            skill.auto_activate = auto;
        }
        skill.updated_at = now;
        Ok(())
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, keeps ASCII alphanumerics, collapses every other run of
/// characters into a single `-`. An empty result becomes `"skill"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "skill".to_string()
    } else {
        slug
    }
}

/// Decode a trigger-keyword value as leniently as possible.
///
/// Arrays keep their string elements; a string holding a JSON array is
/// decoded; anything else yields an empty list.
pub fn decode_keywords(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        serde_json::Value::String(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn lenient_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(decode_keywords(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Status Update!"), "status-update");
        assert_eq!(slugify("  Weekly -- Sync  "), "weekly-sync");
        assert_eq!(slugify("API v2 Notes"), "api-v2-notes");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify(""), "skill");
        assert_eq!(slugify("???"), "skill");
    }

    #[test]
    fn scope_parses_case_insensitively() {
        assert_eq!("Project".parse::<SkillScope>().unwrap(), SkillScope::Project);
        assert_eq!(" global ".parse::<SkillScope>().unwrap(), SkillScope::Global);
        assert!("team".parse::<SkillScope>().is_err());
    }

    #[test]
    fn decode_keywords_accepts_arrays_and_json_text() {
        assert_eq!(decode_keywords(&json!(["status", 3, "update"])), vec!["status", "update"]);
        assert_eq!(decode_keywords(&json!("[\"chat\"]")), vec!["chat"]);
    }

    #[test]
    fn decode_keywords_malformed_is_empty() {
        assert!(decode_keywords(&json!(null)).is_empty());
        assert!(decode_keywords(&json!(12)).is_empty());
        assert!(decode_keywords(&json!({"a": "b"})).is_empty());
        assert!(decode_keywords(&json!("status, update")).is_empty());
    }

    #[test]
    fn skill_deserializes_with_missing_keywords() {
        let skill: Skill = serde_json::from_value(json!({
            "id": 1,
            "name": "Notes",
            "slug": "notes",
            "content": "Write notes",
            "scope": "global",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(skill.trigger_keywords.is_empty());
        assert!(skill.auto_activate);
    }

    #[test]
    fn skill_deserializes_with_malformed_keywords() {
        let skill: Skill = serde_json::from_value(json!({
            "id": 2,
            "name": "Notes",
            "slug": "notes",
            "content": "",
            "scope": "project",
            "projectId": 7,
            "triggerKeywords": {"not": "a list"},
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(skill.trigger_keywords.is_empty());
        assert_eq!(skill.project_id, Some(7));
    }

    #[test]
    fn new_skill_validation() {
        assert!(NewSkill::global("Notes", "x").validate().is_ok());
        assert!(NewSkill::project(1, "Notes", "x").validate().is_ok());
        assert!(NewSkill::global("  ", "x").validate().is_err());

        let mut bad = NewSkill::global("Notes", "x");
        bad.project_id = Some(3);
        assert!(bad.validate().is_err());

        let mut orphan = NewSkill::project(1, "Notes", "x");
        orphan.project_id = None;
        assert!(orphan.validate().is_err());
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let draft = NewSkill::global("Notes", "x").with_slug("My Notes");
        assert_eq!(draft.resolved_slug(), "my-notes");
    }

    #[test]
    fn update_bumps_timestamp_and_keeps_scope() {
        let created = "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let later = "2025-02-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut skill = NewSkill::project(4, "Notes", "old").into_skill(9, created);

        SkillUpdate {
            content: Some("new".into()),
            trigger_keywords: Some(vec!["notes".into()]),
            ..SkillUpdate::default()
        }
        .apply(&mut skill, later)
        .unwrap();

        assert_eq!(skill.content, "new");
        assert_eq!(skill.trigger_keywords, vec!["notes"]);
        assert_eq!(skill.scope, SkillScope::Project);
        assert_eq!(skill.created_at, created);
        assert_eq!(skill.updated_at, later);
    }
}
