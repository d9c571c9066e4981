use crate::schema::ReconciledRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Totals shown in the summary panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_forecast: f64,
    pub total_delivered: f64,
    pub total_shortfall: f64,
    pub total_surplus: f64,
}

/// Reduces the filtered (not paginated) records to the panel totals.
pub fn summarize(records: &[ReconciledRecord]) -> SummaryTotals {
    records
        .iter()
        .fold(SummaryTotals::default(), |mut acc, record| {
            acc.total_forecast += record.quantity_forecast;
            acc.total_delivered += record.quantity_delivered;
            acc.total_shortfall += (record.quantity_forecast - record.quantity_delivered).max(0.0);
            acc.total_surplus += (record.quantity_delivered - record.quantity_forecast).max(0.0);
            acc
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product: String,
    pub total_forecast: f64,
    pub total_delivered: f64,
    /// Sum of per-record shortfalls; surpluses on one row never offset another.
    pub total_late: f64,
}

/// Per-product totals in order of first appearance.
pub fn summarize_by_product(records: &[ReconciledRecord]) -> Vec<ProductSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<ProductSummary> = Vec::new();

    for record in records {
        let idx = *index.entry(record.product.as_str()).or_insert_with(|| {
            summaries.push(ProductSummary {
                product: record.product.clone(),
                total_forecast: 0.0,
                total_delivered: 0.0,
                total_late: 0.0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[idx];
        summary.total_forecast += record.quantity_forecast;
        summary.total_delivered += record.quantity_delivered;
        summary.total_late += (record.quantity_forecast - record.quantity_delivered).max(0.0);
    }

    summaries
}

/// Distinct product names, alphabetically.
pub fn unique_products(records: &[ReconciledRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.product.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
