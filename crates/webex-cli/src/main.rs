//! webex CLI: grade and validate self-check quizzes from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "webex", version, about = "Self-check quiz grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade quiz responses
    Grade {
        /// Path to .toml quiz or directory
        #[arg(long)]
        quiz: PathBuf,

        /// JSON file mapping item ids to responses
        #[arg(long)]
        responses: Option<PathBuf>,

        /// Output format: text, json, html, markdown, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Grade every section as hidden
        #[arg(long)]
        hidden: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("webex=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            quiz,
            responses,
            format,
            output,
            hidden,
            config,
        } => commands::grade::execute(quiz, responses, format, output, hidden, config),
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
