use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::Serialize;

use crate::aggregate::{self, RangeSnapshot};
use crate::error::Result;
use crate::storage::Database;
use crate::window::Window;

/// The full result of one refresh run: a mapping from canonical range key
/// to that range's aggregates, in planner order.
///
/// Serializes as a JSON object whose key order matches insertion order,
/// which is what keeps the embedded block deterministic.
#[derive(Debug, Default)]
pub struct DataCache {
    entries: Vec<(String, RangeSnapshot)>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: String, snapshot: RangeSnapshot) {
        if self.entries.iter().any(|(k, _)| *k == key) {
            log::warn!("duplicate range key {key}; keeping the first entry");
            return;
        }
        self.entries.push((key, snapshot));
    }

    pub fn get(&self, key: &str) -> Option<&RangeSnapshot> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DataCache {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, snapshot) in &self.entries {
            map.serialize_entry(key, snapshot)?;
        }
        map.end()
    }
}

/// Build the cache for every planned window, sequentially and in plan order.
///
/// All-or-nothing: the first failed range aborts the build and no partial
/// cache is returned.
pub async fn build_cache(
    db: &Database,
    windows: &[Window],
    today: NaiveDate,
) -> Result<DataCache> {
    let mut cache = DataCache::new();

    for window in windows {
        let (start, end) = window.date_range(today);
        log::info!("querying {}: {} to {}", window.label(), start, end);

        let snapshot = aggregate::compute_range_snapshot(db, window, today).await?;
        cache.insert(window.cache_key(today), snapshot);
    }

    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window;

    async fn seeded_db() -> Database {
        let db = Database::open_memory().await.unwrap();
        db.writer()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO posted_transactions
                        (prn, transaction_code, transaction_amount, ach_institution_name, post_date)
                     VALUES ('u1', 'PMOF', '500.00', 'Acme Payroll', '2025-11-15')",
                    [],
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_build_cache_single_window() {
        let db = seeded_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let cache = build_cache(&db, &[Window::Month(2025, 11)], today)
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
        let snapshot = cache.get("2025-11-01_2025-11-30").unwrap();
        assert_eq!(snapshot.summary.total_transactions, 1);
        assert_eq!(snapshot.summary.total_volume, 500.0);
    }

    #[tokio::test]
    async fn test_build_cache_preserves_plan_order() {
        let db = seeded_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let plan = window::default_plan();

        let cache = build_cache(&db, &plan, today).await.unwrap();

        let keys: Vec<&str> = cache.keys().collect();
        let expected: Vec<String> = plan.iter().map(|w| w.cache_key(today)).collect();
        assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(cache.len(), 7);
    }

    #[tokio::test]
    async fn test_cache_serializes_in_order_with_camel_case_fields() {
        let db = seeded_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let cache = build_cache(
            &db,
            &[Window::Month(2025, 10), Window::Month(2025, 11)],
            today,
        )
        .await
        .unwrap();

        let json = serde_json::to_string(&cache).unwrap();
        let oct = json.find("2025-10-01_2025-10-31").unwrap();
        let nov = json.find("2025-11-01_2025-11-30").unwrap();
        assert!(oct < nov);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let snapshot = &value["2025-11-01_2025-11-30"];
        assert!(snapshot["summary"]["uniqueUsers"].is_u64());
        assert!(snapshot["summary"]["totalTransactions"].is_u64());
        assert!(snapshot["summary"]["totalVolume"].is_number());
        assert!(snapshot["summary"]["avgDeposit"].is_number());
        assert!(snapshot["buckets"].is_array());
        assert!(snapshot["topByFrequency"].is_array());
        assert!(snapshot["topByVolume"].is_array());
    }

    #[tokio::test]
    async fn test_duplicate_window_keeps_first_entry() {
        let db = seeded_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let cache = build_cache(
            &db,
            &[Window::Month(2025, 11), Window::Month(2025, 11)],
            today,
        )
        .await
        .unwrap();

        assert_eq!(cache.len(), 1);
    }
}
