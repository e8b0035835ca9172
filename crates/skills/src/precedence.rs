//! Precedence resolver.
//!
//! Orders matched skills into a single priority list. Project skills always
//! outrank global skills, regardless of score; within a scope the higher
//! score wins, then the more recently updated skill, then the lower id.
//! The final id tie-break makes the order total, so identical inputs always
//! produce identical output.

use crate::matcher::ScoredSkill;
use notewise_core::skill::SkillScope;
use std::cmp::Ordering;

fn scope_rank(scope: SkillScope) -> u8 {
    match scope {
        SkillScope::Project => 0,
        SkillScope::Global => 1,
    }
}

/// Total order over matched skills, highest priority first.
pub fn compare(a: &ScoredSkill, b: &ScoredSkill) -> Ordering {
    scope_rank(a.skill.scope)
        .cmp(&scope_rank(b.skill.scope))
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| b.skill.updated_at.cmp(&a.skill.updated_at))
        .then_with(|| a.skill.id.cmp(&b.skill.id))
}

/// Sort matched skills into precedence order.
pub fn order(mut skills: Vec<ScoredSkill>) -> Vec<ScoredSkill> {
    skills.sort_by(compare);
    skills
}
