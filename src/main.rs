use clap::{ArgGroup, CommandFactory, Parser};
use lepkg::{commands, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Utility for managing .lepkg packages.", long_about = None)]
#[command(group(ArgGroup::new("action").args(["pack", "install", "list"])))]
struct Cli {
    /// Pack a directory into a .lepkg package.
    #[arg(short = 'z', value_name = "DIRECTORY")]
    pack: Option<PathBuf>,

    /// Install and extract a .lepkg package.
    #[arg(short = 'i', value_name = "PACKAGE")]
    install: Option<PathBuf>,

    /// Output file for -z (default: <DIRECTORY name>.lepkg).
    #[arg(short = 'o', value_name = "OUTPUT", requires = "pack")]
    output: Option<PathBuf>,

    /// List installed packages.
    #[arg(short = 'l')]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut stdout = std::io::stdout().lock();
    let outcome = if let Some(dir) = &cli.pack {
        commands::pack(dir, cli.output.as_deref(), &mut stdout)
    } else if let Some(package) = &cli.install {
        Config::from_env().and_then(|config| commands::install(&config, package, &mut stdout))
    } else if cli.list {
        Config::from_env().and_then(|config| commands::list(&config, &mut stdout))
    } else {
        Cli::command().print_help()?;
        return Ok(());
    };

    commands::report(outcome, &mut stdout)?;
    Ok(())
}
