use std::path::PathBuf;

use crate::error::{Error, Result};

/// Environment variable naming the warehouse database path.
pub const ENV_DB_PATH: &str = "DEPOSITDASH_DB";

/// Environment variable naming the report HTML path.
pub const ENV_REPORT_PATH: &str = "DEPOSITDASH_REPORT";

/// Resolved runtime configuration. Built once at startup and passed in
/// explicitly; nothing past this point reads the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub report_path: PathBuf,
}

impl Config {
    /// Resolve configuration from explicit overrides (CLI flags), then the
    /// environment, then defaults: `~/.depositdash/depositdash.db` and
    /// `./index.html`.
    pub fn resolve(db: Option<PathBuf>, report: Option<PathBuf>) -> Result<Self> {
        let db_path = match db.or_else(|| std::env::var_os(ENV_DB_PATH).map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path()?,
        };

        let report_path = report
            .or_else(|| std::env::var_os(ENV_REPORT_PATH).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("index.html"));

        Ok(Self {
            db_path,
            report_path,
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot determine home directory".into()))?
        .join(".depositdash");
    Ok(dir.join("depositdash.db"))
}
