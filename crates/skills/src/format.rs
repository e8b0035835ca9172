//! Context formatting.
//!
//! Renders accepted skills into one block for the system prompt:
//!
//! ```text
//! ## Active Skills
//!
//! Follow these instructions in order of priority:
//!
//! ### Team Status Format
//! *Scope: project*
//!
//! {skill content}
//!
//! ---
//!
//! ### Status Update Basics
//! *Scope: global | Condensed to fit the prompt budget*
//!
//! {compressed content}
//! ```

use crate::budget::AcceptedSkill;

const HEADER: &str = "## Active Skills\n\nFollow these instructions in order of priority:\n";
const SEPARATOR: &str = "\n\n---\n";

/// Render accepted skills in the given order. Empty input yields `""`.
pub fn format_context(accepted: &[AcceptedSkill]) -> String {
    if accepted.is_empty() {
        return String::new();
    }

    let mut output = String::from(HEADER);
    for (i, entry) in accepted.iter().enumerate() {
        let skill = &entry.scored.skill;
        output.push_str(&format!("\n### {}\n", skill.name));
        if entry.compressed {
            output.push_str(&format!(
                "*Scope: {} | Condensed to fit the prompt budget*\n\n",
                skill.scope
            ));
        } else {
            output.push_str(&format!("*Scope: {}*\n\n", skill.scope));
        }
        output.push_str(entry.content.trim_end());

        if i < accepted.len() - 1 {
            output.push_str(SEPARATOR);
        } else {
            output.push('\n');
        }
    }

    output
}

/// Append a skill context block to a base system prompt.
pub fn augment_system_prompt(base: &str, context: &str) -> String {
    if context.is_empty() {
        return base.to_string();
    }
    if base.is_empty() {
        return context.to_string();
    }
    format!("{}\n\n{}", base.trim_end(), context)
}
