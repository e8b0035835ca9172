//! `notewise status`: show system status.

use notewise_config::AppConfig;
use notewise_core::skill::SkillScope;

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 Notewise Status");
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Skills:       {}", if config.skills.enabled { "enabled" } else { "disabled" });
    println!("  Token budget: {}", config.skills.token_budget);
    println!("  Store:        {}", config.store.backend);
    println!("  Store path:   {}", config.store.resolved_path().display());
    println!("  Log level:    {}{}", config.logging.level, if config.logging.json { " (json)" } else { "" });

    match super::open_store(config).await {
        Ok(store) => {
            let global = store.list_skills(Some(SkillScope::Global)).await?;
            let project = store.list_skills(Some(SkillScope::Project)).await?;
            println!(
                "  Stored:       {} global, {} project skill(s)",
                global.len(),
                project.len()
            );
        }
        Err(e) => println!("\n  ⚠️  Store unavailable: {e}"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file at {}, using defaults", config_path.display());
    }

    Ok(())
}
