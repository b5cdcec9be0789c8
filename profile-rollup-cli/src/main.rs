mod cli;
mod commands;
mod error;
mod input;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // --quiet  → "off"
    // --verbose → RUST_LOG if set, otherwise "info"
    // default  → "warn", so failed cycles still show up on stderr
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,aws_config=warn,aws_smithy_runtime=warn".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Errors go to stderr, so a piped stdout keeps colour on.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    match cli.command {
        Commands::Upload(args) => commands::upload::run(args).await,
        Commands::Key { kind, date, basis } => commands::key::run(kind, date, basis.into()),
        Commands::Manifest { compact } => commands::manifest::run(compact),
    }
}
