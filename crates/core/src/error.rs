//! Error types for the Notewise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use crate::skill::{ProjectId, SkillId, SkillScope};
use thiserror::Error;

/// The top-level error type for all Notewise operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Skill store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Slug '{slug}' already exists in {scope} scope")]
    SlugConflict { slug: String, scope: SkillScope },

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Skill not found: {0}")]
    SkillNotFound(SkillId),

    #[error("Invalid skill: {0}")]
    InvalidSkill(String),
}
