mod cli;
mod commands;
mod config;
mod report;

use clap::Parser;
use config::ResolvedDiffConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snapdiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { backend, force } => {
            commands::init(backend, force)?;
        }
        cli::Command::Compare {
            base,
            new,
            skip_area,
            crop,
            elements,
            quick,
            json,
            output,
            diff,
        } => {
            let config = ResolvedDiffConfig::new(&diff)?;
            let args = commands::CompareArgs {
                base,
                new,
                skip_area,
                crop,
                elements,
                quick,
                json,
                output,
            };
            let code = commands::compare(config, args)?;
            std::process::exit(code);
        }
    }

    Ok(())
}
