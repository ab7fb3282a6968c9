mod config_cmd;
mod feedback;
mod plan;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

pub use run::RunCommand;

#[derive(Parser)]
#[command(name = "ai-coach")]
#[command(about = "Guided workout sessions in your terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "AI_COACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout session from a plan file
    Run(RunCommand),

    /// Inspect workout plans
    #[command(subcommand)]
    Plan(PlanSubcommands),

    /// Review feedback left when ending a workout early
    #[command(subcommand)]
    Feedback(FeedbackSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum PlanSubcommands {
    /// Show the exercises of a plan
    Show {
        /// Plan file (.json or .toml)
        file: PathBuf,
    },

    /// Check that a plan can be run
    Validate {
        /// Plan file (.json or .toml)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum FeedbackSubcommands {
    /// List recent feedback
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Edit configuration file
    Edit,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Whether this invocation takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, Commands::Run(_))
    }

    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();

        match self.command {
            Commands::Run(cmd) => {
                let config = Config::load_from(&Config::resolve_path(config_path)?)?;
                cmd.execute(&config).await
            }
            Commands::Plan(subcmd) => match subcmd {
                PlanSubcommands::Show { file } => plan::show_plan(&file).await,
                PlanSubcommands::Validate { file } => plan::validate_plan(&file).await,
            },
            Commands::Feedback(subcmd) => match subcmd {
                FeedbackSubcommands::List { limit } => {
                    let config = Config::load_from(&Config::resolve_path(config_path)?)?;
                    feedback::list_feedback(&config, limit).await
                }
            },
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                ConfigSubcommands::Edit => config_cmd::edit_config(config_path).await,
                ConfigSubcommands::Init { force } => {
                    config_cmd::init_config(config_path, force).await
                }
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
