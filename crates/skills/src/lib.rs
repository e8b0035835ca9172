//! # Notewise Skills
//!
//! Picks which stored skills to inject into the system prompt for a chat
//! message, and renders them.
//!
//! ```text
//! message ─► Matcher ─► Precedence ─► Budgeter ─► Formatter ─► context
//!              ▲
//!   SkillStore (global + project auto-skills)
//! ```
//!
//! - [`matcher`]: literal keyword scoring (phrase 4, word 2, partial 1)
//! - [`precedence`]: project before global, then score, recency, id
//! - [`budget`]: greedy fill with compression fallback and hard cutoff
//! - [`format`]: markdown context block
//! - [`engine`]: store-backed entry point

pub mod budget;
pub mod compress;
pub mod engine;
pub mod format;
pub mod matcher;
pub mod precedence;
pub mod token;

pub use budget::{AcceptedSkill, BudgetOutcome, DropReason, DroppedSkill, allocate};
pub use compress::compress;
pub use engine::{SkillEngine, SkillMatch, SkillRequest, SkillSelection, rank_skills};
pub use format::{augment_system_prompt, format_context};
pub use matcher::{KeywordMatch, MatchScore, MessageIndex, ScoredSkill, match_skills, score_keywords};
pub use token::estimate_tokens;
