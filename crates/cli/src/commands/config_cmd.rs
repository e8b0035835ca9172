//! `notewise config`: configuration management commands.

use notewise_config::{AppConfig, ConfigError};

pub fn validate(loaded: Result<AppConfig, ConfigError>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match loaded {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !config.skills.enabled {
                warnings.push("Skill injection is disabled (skills.enabled = false)");
            }

            if config.skills.token_budget < 100 {
                warnings.push("skills.token_budget is below 100; most skills will be dropped");
            }

            if config.store.backend == "memory" {
                warnings.push("Memory store selected: skills are lost when the process exits");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Skills:    {}", if config.skills.enabled { "enabled" } else { "disabled" });
            println!("   Budget:    {} tokens", config.skills.token_budget);
            println!("   Store:     {}", config.store.backend);
            println!("   Path:      {}", config.store.resolved_path().display());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
