//! Grouped aggregates over the flat sales table
//!
//! Regional, customer-segment and monthly breakdowns are all the same
//! operation: partition by a key, then reduce each partition to
//! sum/mean of sale value, sum of units and a transaction count.
//! Output is ordered ascending by key.

use crate::models::{
    CustomerSegmentRow, MonthlyTrendRow, RegionalPerformance, SaleRecord, SaleTotals,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregates for one partition
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary<K> {
    pub key: K,
    pub total_revenue: f64,
    pub total_units: u64,
    pub transactions: usize,
}

impl<K> GroupSummary<K> {
    /// Mean sale value; groups are never empty so this is always defined
    pub fn average_sale(&self) -> f64 {
        self.total_revenue / self.transactions as f64
    }
}

/// Sum/count totals over any slice, zero for an empty one
pub fn sale_totals(records: &[SaleRecord]) -> SaleTotals {
    records.iter().fold(SaleTotals::default(), |mut acc, r| {
        acc.revenue += r.total_sale_value;
        acc.units += r.quantity;
        acc.transactions += 1;
        acc
    })
}

/// Partition `records` by `key` and summarize each partition
pub fn grouped_aggregate<K, F>(records: &[SaleRecord], key: F) -> Vec<GroupSummary<K>>
where
    K: Ord,
    F: Fn(&SaleRecord) -> K,
{
    let mut groups: BTreeMap<K, SaleTotals> = BTreeMap::new();
    for record in records {
        let totals = groups.entry(key(record)).or_default();
        totals.revenue += record.total_sale_value;
        totals.units += record.quantity;
        totals.transactions += 1;
    }

    groups
        .into_iter()
        .map(|(key, totals)| GroupSummary {
            key,
            total_revenue: totals.revenue,
            total_units: totals.units,
            transactions: totals.transactions,
        })
        .collect()
}

pub fn regional_performance(records: &[SaleRecord]) -> Vec<RegionalPerformance> {
    let rows: Vec<RegionalPerformance> = grouped_aggregate(records, |r| r.region_name.clone())
        .into_iter()
        .map(|g| RegionalPerformance {
            average_sale: g.average_sale(),
            region: g.key,
            total_revenue: g.total_revenue,
            total_units: g.total_units,
            total_transactions: g.transactions,
        })
        .collect();
    debug!("Regional analysis: {} regions", rows.len());
    rows
}

pub fn customer_analysis(records: &[SaleRecord]) -> Vec<CustomerSegmentRow> {
    let rows: Vec<CustomerSegmentRow> = grouped_aggregate(records, |r| r.customer_segment.clone())
        .into_iter()
        .map(|g| CustomerSegmentRow {
            average_sale: g.average_sale(),
            customer_segment: g.key,
            total_revenue: g.total_revenue,
            total_transactions: g.transactions,
        })
        .collect();
    debug!("Customer analysis: {} segments", rows.len());
    rows
}

pub fn monthly_trend(records: &[SaleRecord]) -> Vec<MonthlyTrendRow> {
    grouped_aggregate(records, |r| r.month)
        .into_iter()
        .map(|g: GroupSummary<NaiveDate>| MonthlyTrendRow {
            average_sale: g.average_sale(),
            month: g.key,
            total_revenue: g.total_revenue,
            total_units: g.total_units,
            total_transactions: g.transactions,
        })
        .collect()
}
