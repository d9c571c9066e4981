use crate::config::DashboardConfig;
use crate::engine::reconcile;
use crate::error::Result;
use crate::pipeline::{self, PageView, SortConfig, SortKey, ViewFilters};
use crate::schema::{parse_deliveries, parse_forecasts, DeliveryRecord, ForecastRecord, ReconciledRecord};
use crate::summary::{summarize, summarize_by_product, unique_products, ProductSummary, SummaryTotals};
use chrono::NaiveDate;
use futures::Future;
use log::{info, warn};

/// Dashboard state: the loaded sheets, their joined dataset, and the
/// current filter, sort and page selection.
pub struct Dashboard {
    config: DashboardConfig,
    forecasts: Vec<ForecastRecord>,
    deliveries: Vec<DeliveryRecord>,
    records: Vec<ReconciledRecord>,
    filters: ViewFilters,
    sort: SortConfig,
    page: usize,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let filters = ViewFilters {
            period: config.default_period,
            ..Default::default()
        };
        Self {
            config,
            forecasts: Vec::new(),
            deliveries: Vec::new(),
            records: Vec::new(),
            filters,
            sort: SortConfig::default(),
            page: 0,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Replaces both inputs and rebuilds the joined dataset.
    pub fn load(&mut self, forecasts: Vec<ForecastRecord>, deliveries: Vec<DeliveryRecord>) {
        self.records = reconcile(&forecasts, &deliveries);
        self.forecasts = forecasts;
        self.deliveries = deliveries;
        self.page = 0;
        info!(
            "Loaded {} forecasts and {} deliveries into {} records",
            self.forecasts.len(),
            self.deliveries.len(),
            self.records.len()
        );
    }

    /// Parses both CSV payloads and loads them. On error nothing changes.
    pub fn load_csv(&mut self, forecast_csv: &str, delivery_csv: &str) -> Result<()> {
        let forecasts = parse_forecasts(forecast_csv, &self.config.forecast_sheet)?;
        let deliveries = parse_deliveries(delivery_csv, &self.config.delivery_sheet)?;
        self.load(forecasts, deliveries);
        Ok(())
    }

    /// Waits for both payloads; the first failure aborts the reload and the
    /// previously loaded data stays in place.
    pub async fn reload_from<F, D>(&mut self, forecast_csv: F, delivery_csv: D) -> Result<()>
    where
        F: Future<Output = Result<String>>,
        D: Future<Output = Result<String>>,
    {
        let outcome = match futures::try_join!(forecast_csv, delivery_csv) {
            Ok((forecast_text, delivery_text)) => self.load_csv(&forecast_text, &delivery_text),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!("Reload failed, keeping previous data: {}", e);
        }
        outcome
    }

    pub fn forecasts(&self) -> &[ForecastRecord] {
        &self.forecasts
    }

    pub fn deliveries(&self) -> &[DeliveryRecord] {
        &self.deliveries
    }

    pub fn records(&self) -> &[ReconciledRecord] {
        &self.records
    }

    pub fn filters(&self) -> &ViewFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filters(&mut self, filters: ViewFilters) {
        self.filters = filters;
        self.page = 0;
    }

    pub fn toggle_sort(&mut self, key: SortKey) -> SortConfig {
        self.sort = self.sort.toggle(key);
        self.page = 0;
        self.sort
    }

    /// Not clamped; an out-of-range page yields an empty view.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn filtered(&self, today: NaiveDate) -> Vec<ReconciledRecord> {
        pipeline::filtered_view(&self.records, &self.filters, &self.sort, today)
    }

    pub fn view(&self, today: NaiveDate) -> PageView {
        pipeline::apply(
            &self.records,
            &self.filters,
            &self.sort,
            self.page,
            self.config.page_size,
            today,
        )
    }

    pub fn summary(&self, today: NaiveDate) -> SummaryTotals {
        summarize(&self.filtered(today))
    }

    /// Per-product totals over the whole joined dataset.
    pub fn product_summary(&self) -> Vec<ProductSummary> {
        summarize_by_product(&self.records)
    }

    pub fn products(&self) -> Vec<String> {
        unique_products(&self.records)
    }
}
