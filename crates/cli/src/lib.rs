pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "netsleuth",
    about = "Netsleuth operator CLI",
    long_about = "Diagnose a managed network device through a budgeted, read-only LLM session.",
    after_help = "Examples:\n  netsleuth ask \"Why is Gi0/1 down?\"\n  netsleuth bot\n  netsleuth config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a netsleuth.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Answer one question from the terminal and exit")]
    Ask { question: String },
    #[command(about = "Run the Telegram bot until interrupted")]
    Bot,
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { question } => commands::ask::run(cli.config, &question).await,
        Command::Bot => commands::bot::run(cli.config).await,
        Command::Config => commands::config::run(cli.config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
