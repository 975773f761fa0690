pub mod types;

pub use types::*;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::storage::Database;
use crate::window::Window;

/// Transaction-type code identifying direct deposits in the warehouse.
pub const TRANSACTION_CODE: &str = "PMOF";

/// Amount bucket labels, ascending by lower bound. The labels are not
/// lexicographically ordered, so sorting always goes through this list.
pub const BUCKET_LABELS: [&str; 7] = [
    "$1-$250",
    "$250-$500",
    "$500-$750",
    "$750-$1,000",
    "$1,000-$1,500",
    "$1,500-$2,500",
    "$2,500+",
];

/// Which metric orders a top-institutions query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstitutionOrder {
    Frequency,
    Volume,
}

impl InstitutionOrder {
    fn order_clause(self) -> &'static str {
        match self {
            InstitutionOrder::Frequency => "txn_count DESC, name ASC",
            InstitutionOrder::Volume => "volume DESC, name ASC",
        }
    }
}

/// Compute all four aggregates for a window as one snapshot.
///
/// Any query failure is surfaced with the window's cache key so the caller
/// knows which range broke the run.
pub async fn compute_range_snapshot(
    db: &Database,
    window: &Window,
    today: NaiveDate,
) -> Result<RangeSnapshot> {
    let (start, end) = window.date_range(today);
    let start_str = start.format("%Y-%m-%d").to_string();
    let end_str = end.format("%Y-%m-%d").to_string();
    let range_key = window.cache_key(today);

    db.reader()
        .call(move |conn| {
            let summary = summary_stats_sql(conn, &start_str, &end_str)?;
            let buckets = bucket_counts_sql(conn, &start_str, &end_str)?;
            let top_by_frequency =
                top_institutions_sql(conn, &start_str, &end_str, InstitutionOrder::Frequency)?;
            let top_by_volume =
                top_institutions_sql(conn, &start_str, &end_str, InstitutionOrder::Volume)?;

            Ok::<RangeSnapshot, rusqlite::Error>(RangeSnapshot {
                summary,
                buckets,
                top_by_frequency,
                top_by_volume,
            })
        })
        .await
        .map_err(|e| Error::Query {
            range: range_key,
            message: e.to_string(),
        })
}

// ── Internal SQL helpers ───────────────────────────────────────────

fn summary_stats_sql(
    conn: &rusqlite::Connection,
    start: &str,
    end: &str,
) -> std::result::Result<SummaryStats, rusqlite::Error> {
    conn.query_row(
        "SELECT
            COUNT(DISTINCT prn),
            COUNT(*),
            SUM(CAST(transaction_amount AS REAL)),
            AVG(CAST(transaction_amount AS REAL))
         FROM posted_transactions
         WHERE transaction_code = ?1
           AND post_date >= ?2 AND post_date <= ?3",
        rusqlite::params![TRANSACTION_CODE, start, end],
        |row| {
            // SUM/AVG are NULL when no rows match; the report must carry
            // zeros, never nulls.
            Ok(SummaryStats {
                unique_users: row.get::<_, i64>(0)? as u64,
                total_transactions: row.get::<_, i64>(1)? as u64,
                total_volume: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                avg_deposit: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        },
    )
}

fn bucket_counts_sql(
    conn: &rusqlite::Connection,
    start: &str,
    end: &str,
) -> std::result::Result<Vec<Bucket>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT
            CASE
                WHEN CAST(transaction_amount AS REAL) >= 0
                 AND CAST(transaction_amount AS REAL) < 250 THEN '$1-$250'
                WHEN CAST(transaction_amount AS REAL) >= 250
                 AND CAST(transaction_amount AS REAL) < 500 THEN '$250-$500'
                WHEN CAST(transaction_amount AS REAL) >= 500
                 AND CAST(transaction_amount AS REAL) < 750 THEN '$500-$750'
                WHEN CAST(transaction_amount AS REAL) >= 750
                 AND CAST(transaction_amount AS REAL) < 1000 THEN '$750-$1,000'
                WHEN CAST(transaction_amount AS REAL) >= 1000
                 AND CAST(transaction_amount AS REAL) < 1500 THEN '$1,000-$1,500'
                WHEN CAST(transaction_amount AS REAL) >= 1500
                 AND CAST(transaction_amount AS REAL) < 2500 THEN '$1,500-$2,500'
                ELSE '$2,500+'
            END AS bucket,
            COUNT(*) AS txn_count
         FROM posted_transactions
         WHERE transaction_code = ?1
           AND post_date >= ?2 AND post_date <= ?3
         GROUP BY bucket
         ORDER BY MIN(CAST(transaction_amount AS REAL))",
    )?;

    let mut buckets: Vec<Bucket> = stmt
        .query_map(rusqlite::params![TRANSACTION_CODE, start, end], |row| {
            Ok(Bucket {
                range: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    // The SQL already orders by the observed minimum amount; re-sorting by
    // the label list pins the order to the bucket bounds themselves.
    buckets.sort_by_key(|b| {
        BUCKET_LABELS
            .iter()
            .position(|l| *l == b.range)
            .unwrap_or(BUCKET_LABELS.len())
    });

    Ok(buckets)
}

fn top_institutions_sql(
    conn: &rusqlite::Connection,
    start: &str,
    end: &str,
    order: InstitutionOrder,
) -> std::result::Result<Vec<InstitutionAgg>, rusqlite::Error> {
    let sql = format!(
        "SELECT
            ach_institution_name AS name,
            COUNT(*) AS txn_count,
            SUM(CAST(transaction_amount AS REAL)) AS volume
         FROM posted_transactions
         WHERE transaction_code = ?1
           AND post_date >= ?2 AND post_date <= ?3
           AND ach_institution_name IS NOT NULL
           AND TRIM(ach_institution_name) <> ''
         GROUP BY ach_institution_name
         ORDER BY {}
         LIMIT 10",
        order.order_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let institutions = stmt
        .query_map(rusqlite::params![TRANSACTION_CODE, start, end], |row| {
            Ok(InstitutionAgg {
                name: row.get::<_, String>(0)?.trim().to_string(),
                count: row.get::<_, i64>(1)? as u64,
                volume: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(institutions)
}
