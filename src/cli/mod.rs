//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::cli::ask::run_ask;
use crate::core::config::{Config, ConfigKey, SettingsOverrides};
use crate::core::error::ConfigurationError;
use crate::ui::chat_loop::run_chat;
use crate::utils::auth::api_key_from_env;
use crate::utils::logging::{init_tracing, LogTarget};

#[derive(Parser)]
#[command(name = "mediquery")]
#[command(about = "A terminal healthcare chatbot grounded in live web search")]
#[command(
    long_about = "MediQuery is a full-screen terminal chat that answers health questions with \
Google Gemini and cites the web sources each answer is grounded on. It is not a \
substitute for professional medical advice.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY       Your Gemini API key (API_KEY is accepted as a fallback)\n\
  MEDIQUERY_MODEL      Model to use (optional, defaults to gemini-2.5-flash)\n\
  MEDIQUERY_BASE_URL   Custom API base URL (optional)\n\
  RUST_LOG             Log filter for --log output (defaults to mediquery=info)\n\n\
Controls:\n\
  Type              Enter your question in the input field\n\
  Enter             Send the question\n\
  PgUp/PgDn/Up/Down Scroll through the conversation\n\
  Esc or Ctrl+C     Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL to use for this run
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and print the answer with its sources
    Ask {
        /// The question to ask
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Print the stored and effective configuration
    Config,
    /// Set a configuration value (model, base-url, timeout-secs)
    Set {
        /// Configuration key to set
        key: ConfigKey,
        /// Value to set for the key
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: ConfigKey,
    },
}

/// Where logs go for a command. The chat view owns the terminal, so it only
/// logs to an explicit file.
pub fn log_target_for(command: &Commands, log: Option<&Path>) -> LogTarget {
    LogTarget::choose(log, !matches!(command, Commands::Chat))
}

pub(crate) fn report_configuration_error(err: &ConfigurationError) {
    eprintln!("{err}");
    let fixes = err.quick_fixes();
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.unwrap_or(Commands::Chat);
    init_tracing(&log_target_for(&command, args.log.as_deref()))?;

    let mut config = Config::load()?;
    let overrides = SettingsOverrides {
        model: args.model,
        base_url: args.base_url,
    };
    let settings =
        config.session_settings(&overrides, api_key_from_env(), |name| std::env::var(name).ok());

    match command {
        Commands::Chat => run_chat(settings).await,
        Commands::Ask { prompt } => run_ask(prompt, settings).await,
        Commands::Config => {
            config.print_all(&settings);
            Ok(())
        }
        Commands::Set { key, value } => {
            let value = value.join(" ");
            if let Err(err) = config.set(key, &value) {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {}", value.trim());
            Ok(())
        }
        Commands::Unset { key } => {
            config.unset(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}
