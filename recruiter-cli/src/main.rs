//! Recruiter: prompt templating and Azure AI agent CLI.
//!
//! # Usage
//!
//! ```text
//! recruiter chat [--offline]
//! recruiter cv --profile <file> [--offer <file>] [--json] [--print-prompt] [--offline]
//! recruiter ask <question>... [--create-agent --model <m> [--name <n>] [--instructions <i>]] [--offline]
//! recruiter render <target> [--var key=value]... [--document] [--name]
//! recruiter templates list [--json]
//! ```
//!
//! Global: `--templates-dir <dir>`, `--verbose`, `--log-json`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    ask::AskArgs, chat::ChatArgs, cv::CvArgs, render::RenderArgs, templates::TemplatesCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "recruiter",
    version,
    about = "Render recruiting prompts and talk to an Azure AI Foundry agent",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of `.yaml` template documents overriding the embedded ones.
    #[arg(long, global = true, value_name = "DIR")]
    templates_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive conversation with the configured agent.
    Chat(ChatArgs),

    /// Generate a CV from a job profile and an optional job offer.
    Cv(CvArgs),

    /// Ask one or more questions in a single thread.
    Ask(AskArgs),

    /// Render a template with variables given on the command line.
    Render(RenderArgs),

    /// Inspect available templates.
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub templates_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    recruiter_agent::init_tracing(level, cli.log_json);

    let global = GlobalOpts {
        templates_dir: cli.templates_dir,
    };
    match cli.command {
        Commands::Chat(args) => args.run(),
        Commands::Cv(args) => args.run(&global),
        Commands::Ask(args) => args.run(),
        Commands::Render(args) => args.run(&global),
        Commands::Templates { command } => commands::templates::run(command, &global),
    }
}
