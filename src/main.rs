use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config;
mod decode;
mod export;
mod ingest;
mod render;
mod selection;
mod serve;
mod session;
mod timestamp;
mod trip;

#[derive(Debug, Parser)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the upload, selection and map endpoints
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write one vehicle's path as GeoJSON
    Render {
        /// CSV file to read, stdin if omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Vehicle to draw, the first one in the file if omitted
        #[arg(short, long)]
        vehicle: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the vehicles in a file with their trip summaries
    Vehicles {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    colog::init();
    let cli = Cli::parse();
    let config = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => serve::run(config, port).await?,
        Command::Render {
            input,
            vehicle,
            output,
        } => export::render(
            &config,
            input.as_deref(),
            vehicle.as_deref(),
            output.as_deref(),
        )?,
        Command::Vehicles { input } => export::vehicles(&config, input.as_deref())?,
    };

    Ok(())
}
