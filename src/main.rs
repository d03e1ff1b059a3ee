// src/main.rs

//! flickr-harvest: species-tagged photo harvester CLI
//!
//! Scans Flickr for photos carrying Darwin Core machine tags and writes the
//! deduplicated occurrences into a text archive.

use clap::{Parser, Subcommand};
use env_logger::Env;

use flickr_harvest::error::Result;
use flickr_harvest::models::Config;
use flickr_harvest::services::{FlickrClient, run_harvest};
use flickr_harvest::sink::DedupSink;
use flickr_harvest::storage::TextArchiveWriter;

#[derive(Parser, Debug)]
#[command(
    name = "flickr-harvest",
    version,
    about = "Harvests species-tagged Flickr photos into a Darwin Core text archive"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the harvest over the configured year range
    Harvest {
        /// Override the archive output directory
        #[arg(short, long)]
        output: Option<String>,

        /// Override the configured API key
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config);

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.logging.level)).init();

    match cli.command {
        Command::Validate => {
            config.validate()?;
            log::info!("Configuration OK");
        }
        Command::Harvest { output, api_key } => {
            if let Some(key) = api_key {
                config.flickr.api_key = key;
            }
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            config.validate()?;

            let client = FlickrClient::new(config.flickr.clone())?;
            let writer = TextArchiveWriter::create(&config.output.dir)?;
            let sink = DedupSink::new(Box::new(writer), config.harvest.seen_capacity);

            let stats = run_harvest(&config, &client, &sink).await?;
            sink.close()?;

            log::info!(
                "Archive written to {}: {} records from {} partitions",
                config.output.dir,
                stats.records_written,
                stats.partitions
            );
        }
    }

    Ok(())
}
