use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::RunArgs;

#[derive(Parser)]
#[command(
    name = "olb",
    about = "OLB: online latency-balanced placement of IoT sensors on fog nodes",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one placement policy over one environment
    Run {
        #[command(flatten)]
        args: RunArgs,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run OLB, random, and distance placement side by side.
    ///
    /// Every policy gets its own copy of the same environment, so no node
    /// state is shared between runs.
    Compare {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Write a default olb.toml
    Init {
        #[arg(short, long, default_value = "olb.toml")]
        path: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List the built-in scenarios
    Scenarios,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    match cli.command {
        Commands::Run { args, format } => commands::run::run(&args, &format),
        Commands::Compare { args } => commands::compare::compare(&args).await,
        Commands::Init { path, force } => commands::init::init(&path, force),
        Commands::Scenarios => {
            print!("{}", commands::scenarios::list());
            Ok(())
        }
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
