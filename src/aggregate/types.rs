use serde::Serialize;

/// Summary statistics for one date range.
///
/// Field names serialize in camelCase because the dashboard JS reads them
/// directly from the embedded data block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub unique_users: u64,
    pub total_transactions: u64,
    pub total_volume: f64,
    pub avg_deposit: f64,
}

/// Count of transactions falling into one amount bucket.
/// Only buckets with at least one transaction are reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub range: String,
    pub count: u64,
}

/// Per-institution aggregate: transaction count and summed volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionAgg {
    pub name: String,
    pub count: u64,
    pub volume: f64,
}

/// All aggregates for one date range, in the shape the dashboard embeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSnapshot {
    pub summary: SummaryStats,
    pub buckets: Vec<Bucket>,
    pub top_by_frequency: Vec<InstitutionAgg>,
    pub top_by_volume: Vec<InstitutionAgg>,
}
