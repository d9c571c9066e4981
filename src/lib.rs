//! # Delivery Reconciler
//!
//! A library for joining a delivery forecast sheet ("Previsão") with the sheet of
//! recorded deliveries ("Entrega") and deriving the delivery-tracking views of a
//! production-control dashboard.
//!
//! ## Core Concepts
//!
//! - **Forecast**: a planned quantity of a product by a target date
//! - **Delivery**: an actual shipment booked against a planned date, with its own realized date
//! - **Reconciliation**: deliveries are matched to forecasts by `(code, date)`, summed, and
//!   turned into difference and percentage metrics
//! - **Orphan delivery**: a delivery whose key matches no forecast; it is kept as its own row
//! - **View pipeline**: period/product/status filters, a stable single-key sort, fixed-size pages
//!
//! ## Example
//!
//! ```rust,ignore
//! use delivery_reconciler::*;
//! use chrono::NaiveDate;
//!
//! let forecasts = vec![ForecastRecord {
//!     code: "A1".to_string(),
//!     product: "Widget".to_string(),
//!     quantity_forecast: 100.0,
//!     forecast_date: Some("01/05/2024".to_string()),
//! }];
//! let deliveries = vec![DeliveryRecord {
//!     code: "A1".to_string(),
//!     product: "Widget".to_string(),
//!     quantity_delivered: 70.0,
//!     reference_date: Some("01/05/2024".to_string()),
//!     realized_delivery_date: Some("03/05/2024".to_string()),
//! }];
//!
//! let records = reconcile(&forecasts, &deliveries);
//! let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
//! let view = apply(&records, &ViewFilters::default(), &SortConfig::default(), 0, 10, today);
//! let totals = summarize(&records);
//! ```

pub mod config;
pub mod dashboard;
pub mod dates;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod summary;

#[cfg(feature = "fetch")]
pub mod fetch;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use dates::*;
pub use engine::{delivery_percentage, reconcile, Reconciler, ORPHAN_PERCENTAGE};
pub use error::{ReconcilerError, Result};
pub use export::*;
pub use ingestion::*;
pub use pipeline::*;
pub use schema::*;
pub use session::Session;
pub use summary::*;

#[cfg(feature = "fetch")]
pub use fetch::SheetClient;

use log::{debug, info};

/// Parses both sheets and reconciles them in one step.
pub fn reconcile_csv(
    forecast_csv: &str,
    delivery_csv: &str,
    config: &DashboardConfig,
) -> Result<Vec<ReconciledRecord>> {
    let forecasts = parse_forecasts(forecast_csv, &config.forecast_sheet)?;
    let deliveries = parse_deliveries(delivery_csv, &config.delivery_sheet)?;
    debug!(
        "Parsed {} forecast rows and {} delivery rows",
        forecasts.len(),
        deliveries.len()
    );

    let records = reconcile(&forecasts, &deliveries);
    info!("Reconciled dataset contains {} records", records.len());
    Ok(records)
}
