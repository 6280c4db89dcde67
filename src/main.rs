use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use chart_sync::utils::config::{self, ConfigOverrides};
use chart_sync::{run_once, RunOutcome, SnapshotSource, TransactionManager};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Env file holding CHART_DB_PATH and CHART_SNAPSHOT_PATH.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    #[arg(short, long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge the playlist snapshot into the database if it changed.
    Sync {
        /// JSON playlist snapshot to read.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Chart date to record, defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Write the effective paths back to the env file.
        #[arg(long)]
        save_config: bool,
    },
    /// Print the last fingerprint and row counts.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Sync {
            input,
            date,
            save_config,
        } => {
            let cfg = config::resolve(
                &args.env_file,
                ConfigOverrides {
                    db_path: args.db_path,
                    snapshot_path: input,
                },
            )?;
            if save_config {
                config::save_to_env(&args.env_file, &cfg)?;
                info!("Saved paths to {:?}", args.env_file);
            }

            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            info!("Chart sync starting for {}", date);
            info!("Input: {:?}", cfg.snapshot_path);
            info!("DB: {:?}", cfg.db_path);

            let mut tm = TransactionManager::new(&cfg.db_path)
                .with_context(|| format!("Failed to open database {:?}", cfg.db_path))?;
            let source = SnapshotSource::new(&cfg.snapshot_path);

            match run_once(&mut tm, &source, date).context("Sync run failed")? {
                RunOutcome::Unchanged { fingerprint } => {
                    info!("Playlist unchanged ({}), nothing written", fingerprint);
                }
                RunOutcome::Merged { fingerprint, counts } => {
                    info!(
                        "Playlist changed ({}), {} rows written",
                        fingerprint,
                        counts.total()
                    );
                }
            }
        }
        Command::Status => {
            let db_path = config::resolve_db_path(&args.env_file, args.db_path)?;
            let tm = TransactionManager::new(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?;

            match tm.latest_fingerprint()? {
                Some(last) => println!("last run: {} {}", last.date, last.fingerprint),
                None => println!("last run: none"),
            }
            let stats = tm.stats()?;
            println!("artists:         {}", stats.artists);
            println!("tracks:          {}", stats.tracks);
            println!("chart_positions: {}", stats.chart_positions);
            println!("genres:          {}", stats.genres);
            println!("artist_genres:   {}", stats.artist_genres);
            println!("runs:            {}", stats.runs);
        }
    }

    Ok(())
}
