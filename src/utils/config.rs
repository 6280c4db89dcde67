use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

pub const DEFAULT_DB_PATH: &str = "charts.db";

const DB_PATH_KEY: &str = "CHART_DB_PATH";
const SNAPSHOT_PATH_KEY: &str = "CHART_SNAPSHOT_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub db_path: PathBuf,
    pub snapshot_path: PathBuf,
}

/// Values given on the command line. They win over the env file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
}

/// Resolves the configuration from CLI overrides, then `env_path`, then defaults.
pub fn resolve(env_path: &Path, overrides: ConfigOverrides) -> Result<SyncConfig> {
    let (mut db_path, mut snapshot_path) = (None, None);

    if env_path.exists() {
        (db_path, snapshot_path) = load_from_env(env_path)?;
        info!("Loaded configuration from {:?}", env_path);
    }

    let db_path = overrides
        .db_path
        .or(db_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    let snapshot_path = overrides
        .snapshot_path
        .or(snapshot_path)
        .ok_or_else(|| {
            anyhow!(
                "No snapshot path given. Pass --input or set {} in {:?}",
                SNAPSHOT_PATH_KEY,
                env_path
            )
        })?;

    Ok(SyncConfig {
        db_path,
        snapshot_path,
    })
}

/// Database path only, for commands that never read a snapshot.
pub fn resolve_db_path(env_path: &Path, db_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = db_path {
        return Ok(path);
    }
    if env_path.exists() {
        if let (Some(path), _) = load_from_env(env_path)? {
            return Ok(path);
        }
    }
    Ok(PathBuf::from(DEFAULT_DB_PATH))
}

fn load_from_env(path: &Path) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(file);

    let mut db_path = None;
    let mut snapshot_path = None;

    for line in reader.lines() {
        let line = line?;
        if line.trim_start().starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                DB_PATH_KEY => db_path = Some(PathBuf::from(value.trim())),
                SNAPSHOT_PATH_KEY => snapshot_path = Some(PathBuf::from(value.trim())),
                _ => {}
            }
        }
    }

    Ok((db_path, snapshot_path))
}

pub fn save_to_env(path: &Path, config: &SyncConfig) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    writeln!(file, "{}={}", DB_PATH_KEY, config.db_path.display())?;
    writeln!(file, "{}={}", SNAPSHOT_PATH_KEY, config.snapshot_path.display())?;
    Ok(())
}
