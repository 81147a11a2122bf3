use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::MissedTickBehavior,
};
use tracing_subscriber::EnvFilter;

use uniqgen::{config::RunCfg, FingerprintStore, GenError, GenParams, Generated, Generator};

const COMMANDS: &str = "p = pause/resume, s = status, q = quit";

/// Keeps generating random images and saves the ones never seen before.
///
/// Commands on stdin: `p` pause/resume, `s` status, `q` quit.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// YAML file with any of the settings below
    #[arg(long)]
    config: Option<PathBuf>,
    /// Folder for `<sha256>.png` files
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// SQLite file holding known fingerprints
    #[arg(long)]
    db: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Milliseconds between ticks
    #[arg(long)]
    interval_ms: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Exit after this many new images
    #[arg(long)]
    max_images: Option<u64>,
}

impl Cli {
    async fn resolve(self) -> Result<RunCfg> {
        let mut cfg = match &self.config {
            Some(path) => RunCfg::load(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?,
            None => RunCfg::default(),
        };
        if let Some(v) = self.out_dir {
            cfg.out_dir = v;
        }
        if let Some(v) = self.db {
            cfg.db_path = v;
        }
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.interval_ms {
            cfg.interval_ms = v;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.max_images.is_some() {
            cfg.max_images = self.max_images;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Cli::parse().resolve().await?;

    if let Err(e) = tokio::fs::create_dir_all(&cfg.out_dir).await {
        tracing::error!(dir = %cfg.out_dir.display(), "could not create output folder: {e}");
    }
    let store = match FingerprintStore::open(&cfg.db_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(db = %cfg.db_path.display(), "could not open database: {e}");
            FingerprintStore::disconnected(&cfg.db_path)
        }
    };
    tracing::info!(
        out_dir = %cfg.out_dir.display(),
        db = %store.path().display(),
        "generating {}x{} images every {} ms",
        cfg.width,
        cfg.height,
        cfg.interval_ms,
    );

    let mut generator = Generator::new(store, GenParams::from(&cfg));
    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = generator.tick().await;
                report(&generator, outcome).await;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(cmd)) => match cmd.trim() {
                    "p" => {
                        let outcome = generator.toggle().await;
                        tracing::info!(state = ?generator.state(), "toggled");
                        report(&generator, outcome).await;
                    }
                    "s" => tracing::info!("{}", generator.status().await),
                    "q" => break,
                    "" => {}
                    other => tracing::warn!("unknown command {other:?} ({COMMANDS})"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }

        if cfg.max_images.is_some_and(|max| generator.saved_count() >= max) {
            break;
        }
    }

    let saved = generator.saved_count();
    generator.close().await;
    tracing::info!("shut down after saving {saved} new images");
    Ok(())
}

async fn report(generator: &Generator, outcome: Result<Option<Generated>, GenError>) {
    match outcome {
        Ok(Some(new)) => {
            tracing::info!(hash = %new.fingerprint, "new image {}", new.path.display());
            tracing::info!("{}", generator.status().await);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("tick failed: {e}"),
    }
}
