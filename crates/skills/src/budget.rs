//! Token budgeter: decides which ordered skills fit into the prompt.
//!
//! Single pass over the precedence-ordered list with a running total:
//!
//! 1. Full content fits → accept uncompressed.
//! 2. Otherwise, if compression yields a strictly smaller estimate that
//!    fits → accept compressed.
//! 3. Otherwise reject, and reject every remaining (lower-priority) skill.
//!
//! Step 3 is a hard cutoff, not best-fit packing: a later, smaller skill is
//! never allowed to leapfrog a higher-priority skill that did not fit.

use crate::compress::compress;
use crate::matcher::ScoredSkill;
use crate::token::estimate_tokens;
use notewise_core::skill::SkillId;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A skill accepted into the prompt, with the content that will be injected.
#[derive(Debug, Clone)]
pub struct AcceptedSkill {
    pub scored: ScoredSkill,
    /// Full or compressed body
    pub content: String,
    /// Estimated tokens of `content`
    pub estimated_tokens: usize,
    pub compressed: bool,
}

/// Why a matched skill was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Did not fit even after compression
    OverBudget,
    /// A higher-priority skill already failed to fit
    CutOff,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverBudget => f.write_str("exceeds remaining budget even when compressed"),
            Self::CutOff => f.write_str("cut off after a higher-priority skill exceeded the budget"),
        }
    }
}

/// A matched skill the budgeter rejected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedSkill {
    pub id: SkillId,
    pub name: String,
    pub score: u32,
    /// Estimated tokens of the full content
    pub estimated_tokens: usize,
    pub reason: DropReason,
}

impl DroppedSkill {
    fn new(scored: &ScoredSkill, estimated_tokens: usize, reason: DropReason) -> Self {
        Self {
            id: scored.skill.id,
            name: scored.skill.name.clone(),
            score: scored.score,
            estimated_tokens,
            reason,
        }
    }
}

/// Result of one budgeting pass.
#[derive(Debug, Clone, Default)]
pub struct BudgetOutcome {
    pub accepted: Vec<AcceptedSkill>,
    pub dropped: Vec<DroppedSkill>,
    pub used_tokens: usize,
}

/// Walk `ordered` in precedence order and keep what fits in `budget`.
pub fn allocate(ordered: Vec<ScoredSkill>, budget: usize) -> BudgetOutcome {
    let mut outcome = BudgetOutcome::default();
    let mut cut_off = false;

    for scored in ordered {
        let full_tokens = estimate_tokens(&scored.skill.content);

        if cut_off {
            outcome
                .dropped
                .push(DroppedSkill::new(&scored, full_tokens, DropReason::CutOff));
            continue;
        }

        if outcome.used_tokens + full_tokens <= budget {
            debug!(skill = %scored.skill.slug, tokens = full_tokens, "Skill accepted");
            outcome.used_tokens += full_tokens;
            outcome.accepted.push(AcceptedSkill {
                content: scored.skill.content.clone(),
                scored,
                estimated_tokens: full_tokens,
                compressed: false,
            });
            continue;
        }

        let condensed = compress(&scored.skill.content);
        let condensed_tokens = estimate_tokens(&condensed);
        if condensed_tokens < full_tokens && outcome.used_tokens + condensed_tokens <= budget {
            debug!(
                skill = %scored.skill.slug,
                full = full_tokens,
                tokens = condensed_tokens,
                "Skill accepted compressed"
            );
            outcome.used_tokens += condensed_tokens;
            outcome.accepted.push(AcceptedSkill {
                scored,
                content: condensed,
                estimated_tokens: condensed_tokens,
                compressed: true,
            });
            continue;
        }

        debug!(
            skill = %scored.skill.slug,
            full = full_tokens,
            compressed = condensed_tokens,
            remaining = budget - outcome.used_tokens,
            "Skill exceeds budget, cutting off remaining skills"
        );
        outcome
            .dropped
            .push(DroppedSkill::new(&scored, full_tokens, DropReason::OverBudget));
        cut_off = true;
    }

    outcome
}
