//! `notewise skills`: match, list, add and remove skills.

use notewise_config::AppConfig;
use notewise_core::skill::{NewSkill, ProjectId, Skill, SkillId, SkillScope};
use notewise_core::store::SkillStore;
use notewise_skills::{SkillEngine, SkillRequest, SkillSelection};
use std::sync::Arc;

pub async fn run_match(
    store: Arc<dyn SkillStore>,
    config: &AppConfig,
    message: &str,
    project: Option<ProjectId>,
    budget: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !config.skills.enabled {
        println!("Skills are disabled (skills.enabled = false); nothing injected.");
        return Ok(());
    }

    let engine = SkillEngine::from_config(store, &config.skills);
    let mut request = SkillRequest::new(message);
    if let Some(project_id) = project {
        request = request.with_project(project_id);
    }
    if let Some(budget) = budget {
        request = request.with_budget(budget);
    }

    let selection = engine.select(&request).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
    } else {
        print_selection(&selection);
    }
    Ok(())
}

fn print_selection(selection: &SkillSelection) {
    println!(
        "🎯 {} skill(s) selected, {}/{} tokens",
        selection.matches.len(),
        selection.used_tokens,
        selection.budget
    );

    for (i, m) in selection.matches.iter().enumerate() {
        let compressed = if m.compressed { " (compressed)" } else { "" };
        println!(
            "  {:>2}. [{}] {} ({}) ~{} tokens{compressed}",
            i + 1,
            m.scope,
            m.name,
            m.slug,
            m.estimated_tokens
        );
        println!("      {}: {}", m.reason, m.matches.join(", "));
    }

    for d in &selection.dropped {
        println!("  ⚠️  dropped {} (~{} tokens): {}", d.name, d.estimated_tokens, d.reason);
    }

    if !selection.context.is_empty() {
        println!();
        println!("{}", selection.context);
    }
}

pub async fn list(
    store: Arc<dyn SkillStore>,
    global: bool,
    project: Option<ProjectId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scope = if global {
        Some(SkillScope::Global)
    } else if project.is_some() {
        Some(SkillScope::Project)
    } else {
        None
    };

    let skills: Vec<Skill> = store
        .list_skills(scope)
        .await?
        .into_iter()
        .filter(|s| project.is_none() || s.project_id == project)
        .collect();

    if skills.is_empty() {
        println!("No skills found.");
        return Ok(());
    }

    for s in &skills {
        let owner = s
            .project_id
            .map(|p| format!(" project={p}"))
            .unwrap_or_default();
        let mode = if s.auto_activate { "auto" } else { "manual" };
        println!(
            "  #{:<4} {:<8} {:<6} {} ({}){owner}",
            s.id, s.scope, mode, s.name, s.slug
        );
        if !s.trigger_keywords.is_empty() {
            println!("        keywords: {}", s.trigger_keywords.join(", "));
        }
    }
    Ok(())
}

/// Build a skill draft from command-line arguments.
pub fn draft(
    name: String,
    content: String,
    keywords: Vec<String>,
    project: Option<ProjectId>,
    slug: Option<String>,
    manual: bool,
) -> NewSkill {
    let mut draft = match project {
        Some(project_id) => NewSkill::project(project_id, name, content),
        None => NewSkill::global(name, content),
    }
    .with_keywords(keywords);
    if let Some(slug) = slug {
        draft = draft.with_slug(slug);
    }
    if manual {
        draft = draft.manual();
    }
    draft
}

pub async fn add(
    store: Arc<dyn SkillStore>,
    draft: NewSkill,
) -> Result<(), Box<dyn std::error::Error>> {
    let skill = store.create_skill(draft).await?;
    println!(
        "✅ Created {} skill #{} '{}' ({})",
        skill.scope, skill.id, skill.name, skill.slug
    );
    Ok(())
}

pub async fn remove(
    store: Arc<dyn SkillStore>,
    id: SkillId,
) -> Result<(), Box<dyn std::error::Error>> {
    if store.delete_skill(id).await? {
        println!("🗑️  Removed skill #{id}");
        Ok(())
    } else {
        Err(format!("Skill not found: {id}").into())
    }
}
