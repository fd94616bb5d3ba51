//! firehose - scripted input that streams a JSON sample feed to stdout
//!
//! Holds the feed's chunked HTTP(S) response open indefinitely and writes
//! one compact JSON record per line to standard output, reconnecting with
//! exponential backoff when the stream dies. All diagnostics go to stderr
//! so stdout stays a pure record stream.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use firehose_stream::DEFAULT_CHUNK_SIZE;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "firehose")]
#[command(author, version, about = "Continuous JSON sample-feed ingester")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FIREHOSE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (stderr only)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct CredentialArgs {
    /// Feed username
    #[arg(short, long, env = "FIREHOSE_USERNAME")]
    username: Option<String>,

    /// Feed password
    #[arg(short, long, env = "FIREHOSE_PASSWORD")]
    password: Option<String>,

    /// Feed host
    #[arg(long, env = "FIREHOSE_HOST")]
    host: Option<String>,

    /// Request path on the feed host
    #[arg(long, env = "FIREHOSE_PATH")]
    path: Option<String>,

    /// Connect over plain HTTP instead of HTTPS
    #[arg(long)]
    no_https: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream the feed to standard output, one JSON record per line
    Stream {
        #[command(flatten)]
        creds: CredentialArgs,

        /// Read buffer size in bytes
        #[arg(long)]
        chunk: Option<usize>,

        /// Connection attempts before giving up
        #[arg(long, default_value_t = 10)]
        retries: u32,
    },

    /// Verify credentials and report --status=success / --status=fail
    Verify {
        #[command(flatten)]
        creds: CredentialArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only records
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    match &cli.command {
        Commands::Stream {
            creds,
            chunk,
            retries,
        } => {
            let endpoint = config.resolve_endpoint(creds.into())?;
            let chunk = chunk.or(config.chunk).unwrap_or(DEFAULT_CHUNK_SIZE);
            commands::stream(endpoint, chunk, *retries).await
        }

        Commands::Verify { creds } => {
            let endpoint = config.resolve_endpoint(creds.into())?;
            let code = commands::verify(endpoint).await?;
            std::process::exit(code);
        }
    }
}

impl From<&CredentialArgs> for config::CredentialOverrides {
    fn from(args: &CredentialArgs) -> Self {
        config::CredentialOverrides {
            username: args.username.clone(),
            password: args.password.clone(),
            host: args.host.clone(),
            path: args.path.clone(),
            no_https: args.no_https,
        }
    }
}
