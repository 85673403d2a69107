//! photo-archiver - walk a photo library and archive items outside albums
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use photo_archiver::{archive_library, shutdown, Config};
use tracing_subscriber::EnvFilter;

/// photo-archiver - archive photos that are not in any album
#[derive(Parser, Debug)]
#[command(name = "photo-archiver")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Checkpoint file with the URL to resume from
    #[arg(long, short = 'c')]
    checkpoint: Option<PathBuf>,

    /// Evaluate items without archiving anything
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many items
    #[arg(long)]
    max_items: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    if args.init_config {
        let path = Config::config_file();
        if Config::config_exists() {
            println!("Config file already exists: {}", path.display());
        } else {
            Config::default().save()?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if args.headed {
        config.browser.headed = true;
    }

    if let Some(path) = args.checkpoint {
        config.walk.checkpoint_file = path;
    }

    if args.dry_run {
        config.walk.dry_run = true;
    }

    if args.max_items.is_some() {
        config.walk.max_items = args.max_items;
    }

    if args.debug {
        config.walk.debug = true;
    }

    let default_level = if config.walk.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let cancel = shutdown::install_signal_handler();
    let summary = archive_library(&config, cancel).await?;

    println!();
    println!("Walk finished: {}", summary.end);
    println!("  {}", summary.stats.summary());
    println!("  Elapsed: {}s", summary.stats.elapsed().as_secs());

    Ok(())
}
