use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(
    name = "relay",
    version,
    about = "Drive Gmail, Calendar and Drive with plain-language requests"
)]
struct Cli {
    /// Configuration file (default: $RELAY_CONFIG, then ./relay.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive prompt (the default). Type `q` to quit.
    Repl,

    /// Execute an intent from a JSON or YAML file without the language model.
    Run {
        /// Path to intent.json or intent.yaml
        file: PathBuf,
    },

    /// List every supported action and its parameters.
    Actions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = config::config_path(cli.config, std::env::var(config::CONFIG_ENV).ok());

    match cli.cmd.unwrap_or(Command::Repl) {
        Command::Repl => {
            let config = config::load(&path)?;
            commands::repl::run(&config).await?
        }
        Command::Run { file } => {
            let config = config::load(&path)?;
            commands::run::run(&config, &file).await?
        }
        Command::Actions => commands::actions::list(&mut std::io::stdout().lock())?,
    }

    Ok(())
}
