use crate::error::{ReconcilerError, Result};
use crate::pipeline::{PeriodFilter, DEFAULT_PAGE_SIZE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    #[schemars(description = "Identifier of the public Google Sheet holding every tab")]
    pub spreadsheet_id: String,

    #[schemars(description = "Tab with the delivery forecasts (\"Previsão\")")]
    pub forecast_sheet: String,

    #[schemars(description = "Tab with the recorded deliveries (\"Entrega\")")]
    pub delivery_sheet: String,

    #[schemars(description = "Tab with the User/Password table used at login")]
    pub users_sheet: String,

    #[schemars(description = "Rows per table page")]
    pub page_size: usize,

    #[schemars(description = "Period filter selected when the dashboard opens")]
    pub default_period: PeriodFilter,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            forecast_sheet: "Previsao".to_string(),
            delivery_sheet: "Entrega".to_string(),
            users_sheet: "Users".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            default_period: PeriodFilter::Last30Days,
        }
    }
}

impl DashboardConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ReconcilerError::Config(
                "spreadsheet_id must not be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("forecast_sheet", &self.forecast_sheet),
            ("delivery_sheet", &self.delivery_sheet),
            ("users_sheet", &self.users_sheet),
        ] {
            if value.trim().is_empty() {
                return Err(ReconcilerError::Config(format!("{} must not be empty", field)));
            }
        }
        if self.page_size == 0 {
            return Err(ReconcilerError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// CSV export URL of one tab.
    pub fn sheet_csv_url(&self, sheet: &str) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:csv&sheet={}",
            SHEETS_BASE_URL, self.spreadsheet_id, sheet
        )
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
