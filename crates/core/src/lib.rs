//! # Notewise Core
//!
//! Domain types, traits, and error definitions for Notewise skills.
//! This crate has **no framework dependencies**: it defines the skill model
//! and the storage contract that the other crates implement against.
//!
//! ## Design Philosophy
//!
//! Storage is defined as a trait here and implemented in `notewise-store`.
//! The matching engine in `notewise-skills` only sees `Arc<dyn SkillStore>`,
//! so tests can hand it an in-memory store or a scripted double.

pub mod error;
pub mod skill;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, StoreError};
pub use skill::{
    NewSkill, Project, ProjectId, Skill, SkillId, SkillScope, SkillUpdate, decode_keywords,
    slugify,
};
pub use store::SkillStore;
