//! Skill engine: fetches candidates and runs the ranking pipeline.
//!
//! Per message: Matcher → Precedence → Budgeter → Formatter. The store is
//! awaited once, up front; everything after that is synchronous and owns its
//! data, so concurrent selections share nothing but the store handle.

use crate::budget::{AcceptedSkill, DroppedSkill, allocate};
use crate::format::format_context;
use crate::matcher::{MessageIndex, match_skills};
use crate::precedence::order;
use notewise_config::{DEFAULT_TOKEN_BUDGET, SkillsConfig};
use notewise_core::error::Result;
use notewise_core::skill::{ProjectId, Skill, SkillId, SkillScope};
use notewise_core::store::SkillStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One incoming chat message to select skills for.
#[derive(Debug, Clone)]
pub struct SkillRequest {
    pub message: String,
    /// Project whose skills are eligible alongside global ones
    pub project_id: Option<ProjectId>,
    /// Overrides the engine's default budget
    pub token_budget: Option<usize>,
}

impl SkillRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            project_id: None,
            token_budget: None,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.token_budget = Some(budget);
        self
    }
}

/// An accepted skill as reported to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub id: SkillId,
    pub name: String,
    pub slug: String,
    pub scope: SkillScope,
    pub score: u32,
    /// Explanations such as `word:"chat"`
    pub matches: Vec<String>,
    pub estimated_tokens: usize,
    pub compressed: bool,
    pub reason: String,
}

impl From<&AcceptedSkill> for SkillMatch {
    fn from(entry: &AcceptedSkill) -> Self {
        let skill = &entry.scored.skill;
        let matched = entry.scored.matches.len();
        let noun = if matched == 1 { "keyword" } else { "keywords" };
        Self {
            id: skill.id,
            name: skill.name.clone(),
            slug: skill.slug.clone(),
            scope: skill.scope,
            score: entry.scored.score,
            matches: entry.scored.matches.iter().map(ToString::to_string).collect(),
            estimated_tokens: entry.estimated_tokens,
            compressed: entry.compressed,
            reason: format!("Matched {matched} {noun} with score {}", entry.scored.score),
        }
    }
}

/// Outcome of one selection: accepted skills in priority order plus the
/// rendered context block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSelection {
    pub matches: Vec<SkillMatch>,
    pub context: String,
    pub used_tokens: usize,
    pub budget: usize,
    /// Matched skills the budget left out
    pub dropped: Vec<DroppedSkill>,
}

impl SkillSelection {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Rank candidate skills against a message within a token budget.
///
/// Pure and deterministic: the same inputs always give the same selection.
/// `candidates` may be unfiltered (e.g. a full `list_skills` result):
/// manual-only skills are removed here, not only by the store queries.
pub fn rank_skills(message: &str, candidates: Vec<Skill>, budget: usize) -> SkillSelection {
    let index = MessageIndex::new(message);
    let candidates: Vec<Skill> = candidates.into_iter().filter(|s| s.auto_activate).collect();
    let considered = candidates.len();

    let ordered = order(match_skills(&index, candidates));
    debug!(considered, matched = ordered.len(), "Scored skill candidates");

    let outcome = allocate(ordered, budget);
    let context = format_context(&outcome.accepted);

    SkillSelection {
        matches: outcome.accepted.iter().map(SkillMatch::from).collect(),
        context,
        used_tokens: outcome.used_tokens,
        budget,
        dropped: outcome.dropped,
    }
}

/// Selects skills for chat messages from a skill store.
pub struct SkillEngine {
    store: Arc<dyn SkillStore>,
    default_budget: usize,
}

impl SkillEngine {
    pub fn new(store: Arc<dyn SkillStore>) -> Self {
        Self {
            store,
            default_budget: DEFAULT_TOKEN_BUDGET,
        }
    }

    /// Build from the `[skills]` config section.
    pub fn from_config(store: Arc<dyn SkillStore>, config: &SkillsConfig) -> Self {
        Self::new(store).with_default_budget(config.token_budget)
    }

    pub fn with_default_budget(mut self, budget: usize) -> Self {
        self.default_budget = budget;
        self
    }

    pub fn default_budget(&self) -> usize {
        self.default_budget
    }

    /// Fetch eligible skills and rank them for `request`.
    ///
    /// A store failure is returned as an error, never as an empty selection.
    pub async fn select(&self, request: &SkillRequest) -> Result<SkillSelection> {
        let budget = request.token_budget.unwrap_or(self.default_budget);

        let mut candidates = self.store.global_auto_skills().await?;
        if let Some(project_id) = request.project_id {
            candidates.extend(self.store.project_auto_skills(project_id).await?);
        }

        let selection = rank_skills(&request.message, candidates, budget);
        info!(
            store = self.store.name(),
            project = ?request.project_id,
            accepted = selection.matches.len(),
            dropped = selection.dropped.len(),
            used_tokens = selection.used_tokens,
            budget,
            "Skill selection complete"
        );
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use notewise_core::error::{Error, StoreError};
    use notewise_core::skill::{NewSkill, Project, SkillUpdate};
    use notewise_store::InMemorySkillStore;

    fn skill(id: i64, scope: SkillScope, keywords: &[&str], tokens: usize) -> Skill {
        let now = Utc::now();
        Skill {
            id,
            name: format!("Skill {id}"),
            slug: format!("skill-{id}"),
            description: None,
            content: "x".repeat(tokens * 4),
            scope,
            project_id: (scope == SkillScope::Project).then_some(1),
            trigger_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            auto_activate: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn reason_counts_keywords() {
        let selection = rank_skills(
            "help me write a status update",
            vec![skill(1, SkillScope::Global, &["status", "update"], 10)],
            2000,
        );
        assert_eq!(selection.matches[0].reason, "Matched 2 keywords with score 4");
        assert_eq!(selection.matches[0].matches, vec!["word:\"status\"", "word:\"update\""]);
    }

    #[test]
    fn reason_singular_keyword() {
        let selection = rank_skills(
            "I need to chat about this",
            vec![skill(1, SkillScope::Global, &["chat"], 10)],
            2000,
        );
        assert_eq!(selection.matches[0].reason, "Matched 1 keyword with score 2");
    }

    #[test]
    fn manual_skills_never_match() {
        let mut manual = skill(1, SkillScope::Global, &["status"], 10);
        manual.auto_activate = false;
        let selection = rank_skills("status", vec![manual], 2000);
        assert!(selection.is_empty());
        assert_eq!(selection.context, "");
    }

    #[test]
    fn serializes_camel_case() {
        let selection = rank_skills(
            "status",
            vec![skill(1, SkillScope::Project, &["status"], 10)],
            2000,
        );
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["matches"][0]["estimatedTokens"], 10);
        assert_eq!(json["matches"][0]["scope"], "project");
        assert_eq!(json["usedTokens"], 10);
    }

    #[tokio::test]
    async fn select_merges_global_and_project_skills() {
        let store = Arc::new(InMemorySkillStore::new());
        let project = store.create_project("Acme").await.unwrap();
        store
            .create_skill(NewSkill::global("Basics", "Global guidance.").with_keywords(["status"]))
            .await
            .unwrap();
        store
            .create_skill(
                NewSkill::project(project.id, "Acme Format", "Project guidance.")
                    .with_keywords(["status"]),
            )
            .await
            .unwrap();

        let engine = SkillEngine::new(store);
        let with_project = engine
            .select(&SkillRequest::new("status please").with_project(project.id))
            .await
            .unwrap();
        assert_eq!(with_project.matches.len(), 2);
        assert_eq!(with_project.matches[0].name, "Acme Format");

        let global_only = engine.select(&SkillRequest::new("status please")).await.unwrap();
        assert_eq!(global_only.matches.len(), 1);
        assert_eq!(global_only.matches[0].name, "Basics");
    }

    #[tokio::test]
    async fn select_uses_default_budget_unless_overridden() {
        let store = Arc::new(InMemorySkillStore::new());
        let engine = SkillEngine::new(store).with_default_budget(300);
        let selection = engine.select(&SkillRequest::new("anything")).await.unwrap();
        assert_eq!(selection.budget, 300);

        let selection = engine
            .select(&SkillRequest::new("anything").with_budget(50))
            .await
            .unwrap();
        assert_eq!(selection.budget, 50);
    }

    struct BrokenStore;

    #[async_trait]
    impl SkillStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }
        async fn global_auto_skills(&self) -> std::result::Result<Vec<Skill>, StoreError> {
            Err(StoreError::QueryFailed("database is locked".into()))
        }
        async fn project_auto_skills(
            &self,
            _project_id: ProjectId,
        ) -> std::result::Result<Vec<Skill>, StoreError> {
            Ok(vec![])
        }
        async fn create_project(&self, _name: &str) -> std::result::Result<Project, StoreError> {
            Err(StoreError::Storage("read-only".into()))
        }
        async fn get_project(
            &self,
            _id: ProjectId,
        ) -> std::result::Result<Option<Project>, StoreError> {
            Ok(None)
        }
        async fn delete_project(&self, id: ProjectId) -> std::result::Result<usize, StoreError> {
            Err(StoreError::ProjectNotFound(id))
        }
        async fn create_skill(&self, _skill: NewSkill) -> std::result::Result<Skill, StoreError> {
            Err(StoreError::Storage("read-only".into()))
        }
        async fn update_skill(
            &self,
            id: SkillId,
            _update: SkillUpdate,
        ) -> std::result::Result<Skill, StoreError> {
            Err(StoreError::SkillNotFound(id))
        }
        async fn get_skill(&self, _id: SkillId) -> std::result::Result<Option<Skill>, StoreError> {
            Ok(None)
        }
        async fn list_skills(
            &self,
            _scope: Option<SkillScope>,
        ) -> std::result::Result<Vec<Skill>, StoreError> {
            Ok(vec![])
        }
        async fn delete_skill(&self, _id: SkillId) -> std::result::Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let engine = SkillEngine::new(Arc::new(BrokenStore));
        let err = engine.select(&SkillRequest::new("status")).await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::QueryFailed(_))));
    }
}
