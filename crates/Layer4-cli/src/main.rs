//! Tally CLI - Main entry point

mod cli;
mod cost;
mod host;
mod prompt;
mod session;

use clap::{Parser, Subcommand};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use tally_core::{AssumeYes, Prompter};
use tally_foundation::TallyConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tally - cost estimates and saved context for LLM chat documents
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Model to use (overrides config)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Backend to use (overrides config)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the cost of sending a document with its context
    Cost {
        /// Chat document (.org, .md or any text file)
        document: PathBuf,

        /// File attached as context (repeatable)
        #[arg(short, long = "context")]
        context: Vec<PathBuf>,

        /// Byte range of the document to send (START:END)
        #[arg(long, value_parser = parse_range)]
        range: Option<Range<usize>>,

        /// Include the context saved in the document
        #[arg(long)]
        saved: bool,
    },
    /// List the saved context files, largest first
    List {
        document: PathBuf,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save context files into the document
    Save {
        document: PathBuf,

        /// File to save (repeatable)
        #[arg(short, long = "context", required = true)]
        context: Vec<PathBuf>,
    },
    /// Restore the saved context and show it
    Restore { document: PathBuf },
    /// Interactive session on a document
    Session { document: PathBuf },
}

fn parse_range(text: &str) -> Result<Range<usize>, String> {
    session::parse_range(text).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let mut config = TallyConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        TallyConfig::default()
    });
    if let Some(model) = &args.model {
        config.default_model = Some(model.clone());
    }
    if let Some(backend) = &args.backend {
        config.default_backend = Some(backend.clone());
    }

    let prompter: Arc<dyn Prompter> = if args.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(prompt::StdinPrompter)
    };

    let result = match args.command {
        Command::Cost {
            document,
            context,
            range,
            saved,
        } => cli::cost(&config, prompter, &document, &context, range, saved),
        Command::List { document, json } => cli::list(&config, prompter, &document, json),
        Command::Save { document, context } => cli::save(&config, prompter, &document, &context),
        Command::Restore { document } => cli::restore(&config, prompter, &document),
        Command::Session { document } => return session::run(&config, prompter, &document),
    };

    match result {
        Ok(lines) => {
            lines.iter().for_each(|l| println!("{}", l));
            Ok(())
        }
        Err(e) if e.is_user_facing() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
