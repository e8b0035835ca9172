//! SQLite skill store.
//!
//! Uses a single SQLite database file with two tables:
//! - `projects`: projects that own project-scoped skills
//! - `skills`: skill records; `project_id` cascades on project delete
//!
//! Per-scope slug uniqueness is enforced by two partial unique indexes:
//! one over global skills, one over `(project_id, slug)` for project skills.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notewise_core::error::StoreError;
use notewise_core::skill::{
    NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate, decode_keywords,
};
use notewise_core::store::SkillStore;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A SQLite skill store.
pub struct SqliteSkillStore {
    pool: SqlitePool,
}

impl SqliteSkillStore {
    /// Open (or create) a SQLite store.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Every connection to `:memory:` is a separate database, so keep one
        // connection alive for the lifetime of the pool.
        let in_memory = path.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 4 })
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite skill store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("projects table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skills (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                name              TEXT NOT NULL,
                slug              TEXT NOT NULL,
                description       TEXT,
                content           TEXT NOT NULL DEFAULT '',
                scope             TEXT NOT NULL CHECK (scope IN ('global', 'project')),
                project_id        INTEGER REFERENCES projects(id) ON DELETE CASCADE,
                trigger_keywords  TEXT NOT NULL DEFAULT '[]',
                auto_activate     INTEGER NOT NULL DEFAULT 1,
                created_at        TEXT NOT NULL,
                updated_at        TEXT NOT NULL,
                CHECK ((scope = 'global' AND project_id IS NULL)
                    OR (scope = 'project' AND project_id IS NOT NULL))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("skills table: {e}")))?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_skills_global_slug \
             ON skills(slug) WHERE scope = 'global'",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("global slug index: {e}")))?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_skills_project_slug \
             ON skills(project_id, slug) WHERE scope = 'project'",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("project slug index: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_skills_project ON skills(project_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("project index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Unparseable timestamps read as the Unix epoch, so a corrupt row sorts
    /// as the oldest and reads back identically every time.
    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!(value = raw, error = %e, "Malformed timestamp, using the Unix epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }
        }
    }

    /// Parse a `Skill` from a SQLite row.
    fn row_to_skill(row: &sqlx::sqlite::SqliteRow) -> Result<Skill, StoreError> {
        let column =
            |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));

        let id: i64 = row.try_get("id").map_err(|e| column("id", e))?;
        let name: String = row.try_get("name").map_err(|e| column("name", e))?;
        let slug: String = row.try_get("slug").map_err(|e| column("slug", e))?;
        let description: Option<String> =
            row.try_get("description").map_err(|e| column("description", e))?;
        let content: String = row.try_get("content").map_err(|e| column("content", e))?;
        let scope_str: String = row.try_get("scope").map_err(|e| column("scope", e))?;
        let project_id: Option<i64> =
            row.try_get("project_id").map_err(|e| column("project_id", e))?;
        let keywords_json: Option<String> = row.try_get("trigger_keywords").ok();
        let auto_activate: bool = row
            .try_get("auto_activate")
            .map_err(|e| column("auto_activate", e))?;
        let created_at: String = row.try_get("created_at").map_err(|e| column("created_at", e))?;
        let updated_at: String = row.try_get("updated_at").map_err(|e| column("updated_at", e))?;

        let parsed = keywords_json
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>);
        let trigger_keywords = match parsed {
            Some(Ok(value)) => decode_keywords(&value),
            Some(Err(e)) => {
                warn!(skill_id = id, error = %e, "Malformed trigger keywords, treating as empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(Skill {
            id,
            name,
            slug,
            description,
            content,
            scope: SkillScope::from_str(&scope_str)?,
            project_id,
            trigger_keywords,
            auto_activate,
            created_at: Self::parse_timestamp(&created_at),
            updated_at: Self::parse_timestamp(&updated_at),
        })
    }

    fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project, StoreError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
        Ok(Project {
            id,
            name,
            created_at: Self::parse_timestamp(&created_at),
        })
    }

    async fn fetch_skills(&self, sql: &str, bind: Option<i64>) -> Result<Vec<Skill>, StoreError> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("skill query: {e}")))?;
        rows.iter().map(Self::row_to_skill).collect()
    }

    async fn slug_taken(
        &self,
        scope: SkillScope,
        project_id: Option<ProjectId>,
        slug: &str,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM skills \
             WHERE scope = ?1 AND slug = ?2 AND project_id IS ?3",
        )
        .bind(scope.as_str())
        .bind(slug)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("slug lookup: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;
        Ok(cnt > 0)
    }

    /// Map a write error, turning unique-index violations into slug conflicts.
    fn write_error(e: sqlx::Error, slug: &str, scope: SkillScope) -> StoreError {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::SlugConflict {
                slug: slug.to_string(),
                scope,
            },
            _ => StoreError::Storage(format!("write failed: {e}")),
        }
    }
}

#[async_trait]
impl SkillStore for SqliteSkillStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn global_auto_skills(&self) -> Result<Vec<Skill>, StoreError> {
        self.fetch_skills(
            "SELECT * FROM skills WHERE scope = 'global' AND auto_activate = 1 ORDER BY id",
            None,
        )
        .await
    }

    async fn project_auto_skills(&self, project_id: ProjectId) -> Result<Vec<Skill>, StoreError> {
        self.fetch_skills(
            "SELECT * FROM skills WHERE scope = 'project' AND project_id = ?1 \
             AND auto_activate = 1 ORDER BY id",
            Some(project_id),
        )
        .await
    }

    async fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Storage("project name must not be empty".into()));
        }
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO projects (name, created_at) VALUES (?1, ?2)")
            .bind(name)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("INSERT project failed: {e}")))?;

        Ok(Project {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
        })
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("GET project: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_project(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_project(&self, id: ProjectId) -> Result<usize, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Storage(format!("BEGIN failed: {e}")))?;

        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM skills WHERE project_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("cascade count: {e}")))?;
        let cascaded: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE project failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProjectNotFound(id));
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(project_id = id, skills = cascaded, "Deleted project");
        Ok(cascaded as usize)
    }

    async fn create_skill(&self, skill: NewSkill) -> Result<Skill, StoreError> {
        skill.validate()?;
        if let Some(project_id) = skill.project_id {
            if self.get_project(project_id).await?.is_none() {
                return Err(StoreError::ProjectNotFound(project_id));
            }
        }
        let slug = skill.resolved_slug();
        if self.slug_taken(skill.scope, skill.project_id, &slug).await? {
            return Err(StoreError::SlugConflict {
                slug,
                scope: skill.scope,
            });
        }

        let keywords_json = serde_json::to_string(&skill.trigger_keywords)
            .map_err(|e| StoreError::Storage(format!("Keyword serialization: {e}")))?;
        let now = Utc::now();
        let scope = skill.scope;

        let result = sqlx::query(
            r#"
            INSERT INTO skills (name, slug, description, content, scope, project_id,
                                trigger_keywords, auto_activate, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(skill.name.trim())
        .bind(&slug)
        .bind(&skill.description)
        .bind(&skill.content)
        .bind(scope.as_str())
        .bind(skill.project_id)
        .bind(&keywords_json)
        .bind(skill.auto_activate)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &slug, scope))?;

        Ok(skill.into_skill(result.last_insert_rowid(), now))
    }

    async fn update_skill(&self, id: SkillId, update: SkillUpdate) -> Result<Skill, StoreError> {
        let current = self
            .get_skill(id)
            .await?
            .ok_or(StoreError::SkillNotFound(id))?;
        let mut edited = current.clone();
        update.apply(&mut edited, Utc::now())?;

        if edited.slug != current.slug
            && self
                .slug_taken(edited.scope, edited.project_id, &edited.slug)
                .await?
        {
            return Err(StoreError::SlugConflict {
                slug: edited.slug,
                scope: edited.scope,
            });
        }

        let keywords_json = serde_json::to_string(&edited.trigger_keywords)
            .map_err(|e| StoreError::Storage(format!("Keyword serialization: {e}")))?;

        sqlx::query(
            r#"
            UPDATE skills SET
                name = ?1,
                slug = ?2,
                description = ?3,
                content = ?4,
                trigger_keywords = ?5,
                auto_activate = ?6,
                updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&edited.name)
        .bind(&edited.slug)
        .bind(&edited.description)
        .bind(&edited.content)
        .bind(&keywords_json)
        .bind(edited.auto_activate)
        .bind(edited.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &edited.slug, edited.scope))?;

        Ok(edited)
    }

    async fn get_skill(&self, id: SkillId) -> Result<Option<Skill>, StoreError> {
        let row = sqlx::query("SELECT * FROM skills WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("GET by ID: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_skill(r)?)),
            None => Ok(None),
        }
    }

    async fn list_skills(&self, scope: Option<SkillScope>) -> Result<Vec<Skill>, StoreError> {
        match scope {
            Some(SkillScope::Global) => {
                self.fetch_skills("SELECT * FROM skills WHERE scope = 'global' ORDER BY id", None)
                    .await
            }
            Some(SkillScope::Project) => {
                self.fetch_skills("SELECT * FROM skills WHERE scope = 'project' ORDER BY id", None)
                    .await
            }
            None => self.fetch_skills("SELECT * FROM skills ORDER BY id", None).await,
        }
    }

    async fn delete_skill(&self, id: SkillId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
