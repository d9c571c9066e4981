use crate::dates::{current_month_bounds, previous_month_bounds};
use crate::error::{ReconcilerError, Result};
use crate::schema::ReconciledRecord;
use chrono::{Days, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Window applied to the forecast date, relative to `today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PeriodFilter {
    #[default]
    None,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "next_30_days")]
    Next30Days,
    LastMonth,
    CurrentMonth,
    /// Applied only when both ends are set.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl PeriodFilter {
    /// Parses the short names used by the dashboard selector.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim() {
            "" | "none" => Ok(PeriodFilter::None),
            "last_30_days" => Ok(PeriodFilter::Last30Days),
            "next_30_days" => Ok(PeriodFilter::Next30Days),
            "last_month" => Ok(PeriodFilter::LastMonth),
            "current_month" => Ok(PeriodFilter::CurrentMonth),
            "custom" => Ok(PeriodFilter::Custom {
                start: None,
                end: None,
            }),
            other => Err(ReconcilerError::InvalidPeriod(other.to_string())),
        }
    }

    /// Inclusive date range, or `None` when the filter lets everything through.
    /// The rolling windows span exactly 30 days: `today` belongs to the past
    /// window, `tomorrow` opens the next one.
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            PeriodFilter::None => None,
            PeriodFilter::Last30Days => today
                .checked_sub_days(Days::new(29))
                .map(|start| (start, today)),
            PeriodFilter::Next30Days => Some((
                today.checked_add_days(Days::new(1))?,
                today.checked_add_days(Days::new(30))?,
            )),
            PeriodFilter::LastMonth => previous_month_bounds(today),
            PeriodFilter::CurrentMonth => current_month_bounds(today),
            PeriodFilter::Custom {
                start: Some(start),
                end: Some(end),
            } => Some((start, end)),
            PeriodFilter::Custom { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// `difference < 0`
    Shortfall,
    /// `difference > 0`
    Surplus,
    /// `difference == 0`
    Exact,
}

impl StatusFilter {
    pub fn matches(&self, record: &ReconciledRecord) -> bool {
        match self {
            StatusFilter::Shortfall => record.difference < 0.0,
            StatusFilter::Surplus => record.difference > 0.0,
            StatusFilter::Exact => record.difference == 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewFilters {
    pub period: PeriodFilter,
    pub product: Option<String>,
    pub status: Option<StatusFilter>,
}

impl ViewFilters {
    pub fn matches(&self, record: &ReconciledRecord, today: NaiveDate) -> bool {
        if let Some((start, end)) = self.period.bounds(today) {
            match record.forecast_day() {
                Some(day) if day >= start && day <= end => {}
                _ => return false,
            }
        }

        if let Some(product) = self.product.as_deref().filter(|p| !p.is_empty()) {
            if record.product != product {
                return false;
            }
        }

        self.status.map_or(true, |status| status.matches(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Code,
    Product,
    QuantityForecast,
    ForecastDate,
    RealizedDeliveryDate,
    QuantityDelivered,
    DeliveryPercentage,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Code,
        SortKey::Product,
        SortKey::QuantityForecast,
        SortKey::ForecastDate,
        SortKey::RealizedDeliveryDate,
        SortKey::QuantityDelivered,
        SortKey::DeliveryPercentage,
    ];

    /// Column header shown in the table.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Code => "Código",
            SortKey::Product => "Produto",
            SortKey::QuantityForecast => "Quantidade Prevista",
            SortKey::ForecastDate => "Data de Previsão",
            SortKey::RealizedDeliveryDate => "Data de Entrega Real",
            SortKey::QuantityDelivered => "Entregue",
            SortKey::DeliveryPercentage => "Percentual",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.label() == label)
    }

    /// Ascending comparison. Dates compare as calendar days with missing or
    /// invalid dates first; numbers use IEEE total order.
    pub fn compare(&self, a: &ReconciledRecord, b: &ReconciledRecord) -> Ordering {
        match self {
            SortKey::Code => compare_codes(&a.code, &b.code),
            SortKey::Product => a.product.cmp(&b.product),
            SortKey::QuantityForecast => a.quantity_forecast.total_cmp(&b.quantity_forecast),
            SortKey::ForecastDate => a.forecast_day().cmp(&b.forecast_day()),
            SortKey::RealizedDeliveryDate => a.realized_day().cmp(&b.realized_day()),
            SortKey::QuantityDelivered => a.quantity_delivered.total_cmp(&b.quantity_delivered),
            SortKey::DeliveryPercentage => {
                a.delivery_percentage.total_cmp(&b.delivery_percentage)
            }
        }
    }
}

/// Numeric codes sort by value and ahead of any text code; text codes sort
/// lexically. Keeps the ordering total for mixed columns.
fn compare_codes(a: &str, b: &str) -> Ordering {
    match (parse_code(a), parse_code(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_code(code: &str) -> Option<f64> {
    code.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Clicking the active ascending column flips it to descending; anything
    /// else sorts ascending by `key`.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = match (self.key, self.direction) {
            (Some(current), SortDirection::Ascending) if current == key => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        Self::by(key, direction)
    }

    pub fn compare(&self, a: &ReconciledRecord, b: &ReconciledRecord) -> Ordering {
        match self.key {
            None => Ordering::Equal,
            Some(key) => {
                let ordering = key.compare(a, b);
                match self.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub page_items: Vec<ReconciledRecord>,
    pub page_count: usize,
    pub total_items: usize,
}

pub fn filter_records(
    records: &[ReconciledRecord],
    filters: &ViewFilters,
    today: NaiveDate,
) -> Vec<ReconciledRecord> {
    records
        .iter()
        .filter(|r| filters.matches(r, today))
        .cloned()
        .collect()
}

/// Stable sort into a new vector.
pub fn sort_records(records: &[ReconciledRecord], sort: &SortConfig) -> Vec<ReconciledRecord> {
    let mut sorted = records.to_vec();
    if sort.key.is_some() {
        sorted.sort_by(|a, b| sort.compare(a, b));
    }
    sorted
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Slice for `page`. Out-of-range pages are empty, never clamped.
pub fn paginate(records: &[ReconciledRecord], page: usize, page_size: usize) -> Vec<ReconciledRecord> {
    let start = page.saturating_mul(page_size);
    if start >= records.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(records.len());
    records[start..end].to_vec()
}

/// Filtered and sorted records, before pagination.
pub fn filtered_view(
    records: &[ReconciledRecord],
    filters: &ViewFilters,
    sort: &SortConfig,
    today: NaiveDate,
) -> Vec<ReconciledRecord> {
    let filtered = filter_records(records, filters, today);
    sort_records(&filtered, sort)
}

pub fn apply(
    records: &[ReconciledRecord],
    filters: &ViewFilters,
    sort: &SortConfig,
    page: usize,
    page_size: usize,
    today: NaiveDate,
) -> PageView {
    let view = filtered_view(records, filters, sort, today);
    PageView {
        page_items: paginate(&view, page, page_size),
        page_count: page_count(view.len(), page_size),
        total_items: view.len(),
    }
}
