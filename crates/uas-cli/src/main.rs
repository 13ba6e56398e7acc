//! UA Switcher CLI
//!
//! CLI tool for checking user-agent lists and driving extension state kept
//! in a JSON file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::LevelFilter;

use uas_cli::commands::*;
use uas_cli::JsonFileStore;
use uas_core::DEFAULT_USER_AGENTS;

#[derive(Parser)]
#[command(name = "uas-cli")]
#[command(about = "UA Switcher user-agent list tools and state editor")]
struct Cli {
    /// JSON state file
    #[arg(long, global = true, default_value = "uas-state.json")]
    state: PathBuf,

    /// List used instead of the bundled defaults
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a user-agents.txt list and report problems
    Check {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Rewrite a list in canonical form
    Format {
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or refresh the state file
    Init,

    /// Show which override applies to each URL
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show the toolbar state
    Status,

    /// Make an entry the global override
    Select {
        /// Entry label, or the string itself with --raw
        target: String,

        #[arg(long)]
        raw: bool,
    },

    /// Turn the global override off
    Disable,

    /// Manage per-domain overrides
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Replace the stored list with a text file
    Edit {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write the stored list as text
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore the default list
    Reset,
}

#[derive(Subcommand)]
enum DomainAction {
    /// Pin the current override to a domain
    Add { domain: String },
    /// Remove a domain override
    Remove { domain: String },
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn default_text(path: Option<&Path>) -> Result<String, String> {
    Ok(read_defaults(path)?.unwrap_or_else(|| DEFAULT_USER_AGENTS.to_string()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = JsonFileStore::new(&cli.state);
    let defaults = cli.defaults.as_deref();

    let result = match cli.command {
        Commands::Check { input } => cmd_check(&input, cli.verbose),
        Commands::Format { input, output } => cmd_format(&input, output.as_deref()),
        Commands::Init => match default_text(defaults) {
            Ok(text) => cmd_init(&store, &text).await,
            Err(e) => Err(e),
        },
        Commands::Resolve { urls } => cmd_resolve(&store, &urls).await,
        Commands::Status => cmd_status(&store).await,
        Commands::Select { target, raw } => cmd_select(&store, &target, raw).await,
        Commands::Disable => cmd_disable(&store).await,
        Commands::Domain { action } => match action {
            DomainAction::Add { domain } => cmd_domain_add(&store, &domain).await,
            DomainAction::Remove { domain } => cmd_domain_remove(&store, &domain).await,
        },
        Commands::Edit { input } => cmd_edit(&store, &input).await,
        Commands::Export { output } => cmd_export(&store, output.as_deref()).await,
        Commands::Reset => match default_text(defaults) {
            Ok(text) => cmd_reset(&store, &text).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(report) => print!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
