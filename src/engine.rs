use crate::schema::{DeliveryRecord, ForecastRecord, JoinKey, ReconciledRecord, RecordOrigin};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Percentage reported for deliveries that match no forecast.
pub const ORPHAN_PERCENTAGE: f64 = 100.0;

/// Joins forecasts with deliveries by `(code, date)`.
///
/// Holds a multimap from delivery key to delivery indices, built once per
/// reload so each forecast lookup is constant time.
pub struct Reconciler<'a> {
    deliveries: &'a [DeliveryRecord],
    by_key: HashMap<JoinKey, Vec<usize>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(deliveries: &'a [DeliveryRecord]) -> Self {
        let mut by_key: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (idx, delivery) in deliveries.iter().enumerate() {
            by_key.entry(delivery.key()).or_default().push(idx);
        }
        Self { deliveries, by_key }
    }

    /// Deliveries booked against `key`, in sheet order.
    pub fn matches(&self, key: &JoinKey) -> impl Iterator<Item = &'a DeliveryRecord> + '_ {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .map(|&idx| &self.deliveries[idx])
    }

    pub fn reconcile_forecast(&self, forecast: &ForecastRecord) -> ReconciledRecord {
        let key = forecast.key();

        let mut quantity_delivered = 0.0;
        let mut realized_delivery_date = None;
        let mut first = true;
        for delivery in self.matches(&key) {
            quantity_delivered += delivery.quantity_delivered;
            if first {
                realized_delivery_date = delivery.realized_delivery_date.clone();
                first = false;
            }
        }

        ReconciledRecord {
            code: forecast.code.clone(),
            product: forecast.product.clone(),
            quantity_forecast: forecast.quantity_forecast,
            forecast_date: forecast.forecast_date.clone(),
            quantity_delivered,
            difference: quantity_delivered - forecast.quantity_forecast,
            delivery_percentage: delivery_percentage(
                quantity_delivered,
                forecast.quantity_forecast,
            ),
            realized_delivery_date,
            origin: RecordOrigin::Forecast,
            key,
        }
    }
}

/// `delivered / max(forecast, 1) * 100`, rounded to two decimals.
pub fn delivery_percentage(delivered: f64, forecast: f64) -> f64 {
    let denominator = if forecast.is_finite() { forecast.max(1.0) } else { 1.0 };
    let value = delivered / denominator * 100.0;
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

pub fn orphan_record(delivery: &DeliveryRecord) -> ReconciledRecord {
    ReconciledRecord {
        code: delivery.code.clone(),
        product: delivery.product.clone(),
        quantity_forecast: 0.0,
        forecast_date: None,
        quantity_delivered: delivery.quantity_delivered,
        difference: delivery.quantity_delivered,
        delivery_percentage: ORPHAN_PERCENTAGE,
        realized_delivery_date: delivery.realized_delivery_date.clone(),
        origin: RecordOrigin::OrphanDelivery,
        key: delivery.key(),
    }
}

/// Builds the joined dataset: one record per forecast in input order, then one
/// record per orphan delivery in input order. Orphans sharing a key are kept
/// as separate rows.
pub fn reconcile(
    forecasts: &[ForecastRecord],
    deliveries: &[DeliveryRecord],
) -> Vec<ReconciledRecord> {
    let reconciler = Reconciler::new(deliveries);
    let forecast_keys: HashSet<JoinKey> = forecasts.iter().map(ForecastRecord::key).collect();

    let mut records: Vec<ReconciledRecord> = forecasts
        .iter()
        .map(|f| reconciler.reconcile_forecast(f))
        .collect();

    let orphans_before = records.len();
    records.extend(
        deliveries
            .iter()
            .filter(|d| !forecast_keys.contains(&d.key()))
            .map(orphan_record),
    );

    debug!(
        "Reconciled {} forecasts against {} deliveries ({} orphan deliveries)",
        forecasts.len(),
        deliveries.len(),
        records.len() - orphans_before
    );

    records
}
