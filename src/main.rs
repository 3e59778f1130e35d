//! Main entry point for the translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use web_translator::cli::commands::{self, Commands, GlobalOptions};

/// Command-line translator for Google, Bing, Baidu, Youdao and Ciba
#[derive(Parser, Debug)]
#[command(name = "translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ~/.config/translator/config.ini)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Proxy URL used for both http and https
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr so stdout only carries translations
    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::new("web_translator=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "web_translator=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = GlobalOptions {
        config: args.config,
        proxy: args.proxy,
        timeout: args.timeout,
    };

    match args.command {
        Some(Commands::Translate {
            text,
            engine,
            from,
            to,
            format,
            raw,
        }) => {
            commands::handle_translate(&options, text, engine, from, to, format, raw).await?;
        }
        Some(Commands::Engines) => {
            commands::handle_engines();
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
