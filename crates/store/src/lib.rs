//! Skill store implementations for Notewise.

pub mod catalog;
pub mod file_backend;
pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use catalog::SkillCatalog;
pub use file_backend::FileSkillStore;
pub use in_memory::InMemorySkillStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSkillStore;
