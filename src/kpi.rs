use crate::analysis::{grouped_aggregate, sale_totals};
use crate::error::{DashboardError, Result};
use crate::models::{KpiSet, SaleRecord};
use std::collections::BTreeSet;

/// Half a cent: stored revenue within this distance of the recomputed value
/// counts as agreeing
const REVENUE_TOLERANCE: f64 = 0.005;

/// Compute the KPI set.
///
/// Fails with [`DashboardError::NoData`] on an empty table since the
/// average and the top region are undefined there. Use
/// [`sale_totals`] for sums that must stay defined on empty input.
pub fn calculate_kpis(records: &[SaleRecord]) -> Result<KpiSet> {
    if records.is_empty() {
        return Err(DashboardError::NoData("average transaction value"));
    }

    let totals = sale_totals(records);
    let distinct_segments = records
        .iter()
        .map(|r| r.customer_segment.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    Ok(KpiSet {
        total_revenue: totals.revenue,
        total_sales_volume: totals.units,
        average_transaction_value: totals.revenue / totals.transactions as f64,
        distinct_segments,
        top_performing_region: top_performing_region(records)?,
    })
}

/// Region with the largest summed sale value.
///
/// Ties go to the lexicographically smallest region name.
pub fn top_performing_region(records: &[SaleRecord]) -> Result<String> {
    let mut best: Option<(String, f64)> = None;
    // groups arrive in ascending name order, so only a strictly larger sum replaces
    for group in grouped_aggregate(records, |r| r.region_name.clone()) {
        let is_better = best
            .as_ref()
            .map_or(true, |(_, revenue)| group.total_revenue > *revenue);
        if is_better {
            best = Some((group.key, group.total_revenue));
        }
    }
    best.map(|(region, _)| region)
        .ok_or(DashboardError::NoData("top performing region"))
}

/// Rows whose stored `total_revenue` is missing or disagrees with
/// `quantity * unit_price`
pub fn stored_revenue_mismatches(records: &[SaleRecord]) -> usize {
    records
        .iter()
        .filter(|r| match r.total_revenue {
            Some(stored) => (stored - r.total_sale_value).abs() > REVENUE_TOLERANCE,
            None => true,
        })
        .count()
}
