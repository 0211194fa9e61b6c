mod config;
use bytes::Bytes;
use cask_core::{Key, OpContext, PrecomputedKeyStore, S3Store, compute_key, verify_key};
use clap::{Parser, Subcommand};
use config::Config;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "cask")]
#[command(about = "Content-addressed blob storage on S3-compatible object stores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file under the hash of its contents and print the key
    Put {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,

        /// File to upload
        input: PathBuf,
    },
    /// Fetch a value by key
    Get {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: String,

        /// Hex-encoded key
        key: String,

        /// Write the value here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Return the value even if it does not hash to the key
        #[arg(long)]
        no_verify: bool,
    },
    /// Check that a file hashes to a key, without contacting the store
    Verify {
        /// Hex-encoded key
        key: String,

        /// File to check
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cask_cli=info,cask_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> cask_core::Result<()> {
    match command {
        Commands::Put { config, input } => {
            let store = open_store(&config)?;
            let ctx = cancel_on_ctrl_c();

            let value = read_input(&input).await?;
            let key = compute_key(&value);
            tracing::info!("Uploading {} ({} bytes)", input.display(), value.len());

            store.put(&ctx, &key, value).await?;
            println!("{}", key);
            log_stats(&store);
        }
        Commands::Get {
            config,
            key,
            output,
            no_verify,
        } => {
            let key = Key::from_hex(&key)?;
            let store = open_store(&config)?;
            let ctx = cancel_on_ctrl_c();

            let value = store.get(&ctx, &key).await?;
            if no_verify {
                tracing::warn!("Skipping verification of {}", key);
            } else {
                store.verify(&key, &value)?;
            }

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &value).await?;
                    tracing::info!("Wrote {} bytes to {}", value.len(), path.display());
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&value).await?;
                    stdout.flush().await?;
                }
            }
            log_stats(&store);
        }
        Commands::Verify { key, input } => {
            let key = Key::from_hex(&key)?;
            let value = read_input(&input).await?;
            verify_key(&key, &value)?;
            println!("ok");
        }
    }

    Ok(())
}

fn open_store(path: &str) -> cask_core::Result<S3Store> {
    tracing::debug!("Loading config from {}", path);
    let config = Config::from_file(path)?;
    S3Store::new(config.store_config())
}

async fn read_input(path: &Path) -> cask_core::Result<Bytes> {
    Ok(Bytes::from(tokio::fs::read(path).await?))
}

fn cancel_on_ctrl_c() -> OpContext {
    let ctx = OpContext::new();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received CTRL-C, cancelling...");
            token.cancel();
        }
    });
    ctx
}

fn log_stats(store: &S3Store) {
    if store.config().profiling {
        let stats = store.stats();
        tracing::info!("Store stats: entries={} reads={}", stats.entries, stats.reads);
    }
}
