pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gamewise_core::config::{ConfigOverrides, LlmProvider, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "gamewise",
    about = "Game recommendation chatbot",
    long_about = "Talk through your game preferences, then get the title the rule base proves matches them.",
    after_help = "Examples:\n  gamewise\n  gamewise query 'genre(Game,moba)' 'platform(Game,pc)'\n  gamewise doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load instead of gamewise.toml")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override llm.provider (openai|ollama)")]
    llm_provider: Option<LlmProvider>,
    #[arg(long, global = true, help = "Override llm.model")]
    llm_model: Option<String>,
    #[arg(long, global = true, help = "Override solver.command")]
    solver: Option<String>,
    #[arg(long, global = true, help = "Override solver.rules_path")]
    rules: Option<PathBuf>,
    #[arg(long, global = true, help = "Override catalog.path")]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive recommendation session (default)")]
    Chat,
    #[command(about = "Resolve a game directly from predicates such as `genre(Game,moba)`")]
    Query {
        #[arg(required = true, help = "Ground predicates; comma-separated lists are accepted")]
        predicates: Vec<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM credentials, solver binary, and rule base sync")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                llm_provider: self.llm_provider,
                llm_model: self.llm_model.clone(),
                solver_command: self.solver.clone(),
                rules_path: self.rules.clone(),
                catalog_path: self.catalog.clone(),
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => commands::chat::run(options),
        Command::Query { predicates } => commands::query::run(options, &predicates),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, json),
    };

    if !result.output.is_empty() {
        if result.exit_code == 0 {
            println!("{}", result.output);
        } else {
            eprintln!("{}", result.output);
        }
    }
    ExitCode::from(result.exit_code)
}
