pub mod aggregate;
pub mod cache;
pub mod config;
pub mod date_util;
pub mod error;
pub mod report;
pub mod storage;
pub mod window;

pub use aggregate::{Bucket, InstitutionAgg, RangeSnapshot, SummaryStats};
pub use cache::DataCache;
pub use config::Config;
pub use error::{Error, Result};
pub use storage::Database;
pub use window::Window;

use std::path::Path;

use chrono::NaiveDate;

/// Main entry point for the dashboard data refresher.
pub struct DepositDash {
    db: Database,
}

impl DepositDash {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run the full pipeline against the current date: plan the windows,
    /// aggregate every range, and splice the result into the report.
    pub async fn refresh(&self, report_path: &Path) -> Result<DataCache> {
        let today = chrono::Local::now().date_naive();
        self.refresh_as_of(report_path, today).await
    }

    /// Like [`refresh`](Self::refresh) with an injectable "today".
    pub async fn refresh_as_of(&self, report_path: &Path, today: NaiveDate) -> Result<DataCache> {
        let windows = window::default_plan();
        log::info!("building cache for {} date windows", windows.len());

        let cache = cache::build_cache(&self.db, &windows, today).await?;
        report::update_report(report_path, &cache)?;
        Ok(cache)
    }

    /// Compute one window's aggregates without touching the report.
    pub async fn snapshot(&self, window: &Window, today: NaiveDate) -> Result<RangeSnapshot> {
        aggregate::compute_range_snapshot(&self.db, window, today).await
    }
}
