//! Notewise CLI: the main entry point.
//!
//! Commands:
//! - `skills`   Match, list, add and remove skills
//! - `project`  Create and delete projects
//! - `config`   Show, validate or locate the configuration
//! - `status`   Show store and skill settings

use clap::{Parser, Subcommand};
use notewise_config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "notewise",
    about = "Notewise: skill-aware prompt assembly for meeting notes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with skills
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system status
    Status,
}

#[derive(Subcommand)]
enum SkillsAction {
    /// Rank skills for a message and print the prompt context
    Match {
        /// The chat message to match against
        #[arg(short, long)]
        message: String,

        /// Include this project's skills
        #[arg(short, long)]
        project: Option<i64>,

        /// Token budget (defaults to skills.token_budget)
        #[arg(short, long)]
        budget: Option<usize>,

        /// Print the selection as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored skills
    List {
        /// Only global skills
        #[arg(long, conflicts_with = "project")]
        global: bool,

        /// Only skills of this project
        #[arg(long)]
        project: Option<i64>,
    },

    /// Add a skill
    Add {
        #[arg(short, long)]
        name: String,

        /// Instruction body (markdown)
        #[arg(short, long)]
        content: String,

        /// Trigger keyword or phrase (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Scope the skill to a project
        #[arg(short, long)]
        project: Option<i64>,

        /// Explicit slug (derived from the name otherwise)
        #[arg(long)]
        slug: Option<String>,

        /// Never auto-activate this skill
        #[arg(long)]
        manual: bool,
    },

    /// Remove a skill by ID
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project
    Add { name: String },

    /// Delete a project and its skills
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration for errors
    Validate,
    /// Print the config file location
    Path,
}

fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let filter = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = AppConfig::load();
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_tracing(cli.verbose, &logging);

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&loaded?)?,
            ConfigAction::Validate => commands::config_cmd::validate(loaded)?,
            ConfigAction::Path => commands::config_cmd::path()?,
        },
        Commands::Status => commands::status::run(&loaded?).await?,
        Commands::Skills { action } => {
            let config = loaded?;
            let store = commands::open_store(&config).await?;
            match action {
                SkillsAction::Match {
                    message,
                    project,
                    budget,
                    json,
                } => {
                    commands::skills::run_match(store, &config, &message, project, budget, json)
                        .await?
                }
                SkillsAction::List { global, project } => {
                    commands::skills::list(store, global, project).await?
                }
                SkillsAction::Add {
                    name,
                    content,
                    keywords,
                    project,
                    slug,
                    manual,
                } => {
                    let draft = commands::skills::draft(name, content, keywords, project, slug, manual);
                    commands::skills::add(store, draft).await?
                }
                SkillsAction::Remove { id } => commands::skills::remove(store, id).await?,
            }
        }
        Commands::Project { action } => {
            let store = commands::open_store(&loaded?).await?;
            match action {
                ProjectAction::Add { name } => commands::project::add(store, &name).await?,
                ProjectAction::Remove { id } => commands::project::remove(store, id).await?,
            }
        }
    }

    Ok(())
}
