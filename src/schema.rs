use crate::dates::parse_date;
use crate::error::Result;
use crate::ingestion::{parse_csv, RawRecord};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod columns {
    pub const CODE: &str = "Codigo";
    pub const PRODUCT: &str = "Produto";
    pub const QUANTITY_FORECAST: &str = "Quantidade Prevista";
    pub const FORECAST_DATE: &str = "Data de Previsão de Entrega";
    pub const QUANTITY_DELIVERED: &str = "Quantidade Entregue";
    pub const REFERENCE_DATE: &str = "Data Referente (Planejada)";
    pub const REALIZED_DATE: &str = "Data de Entrega Real";
    pub const USER_NAME: &str = "Name";
    pub const USER: &str = "User";
    pub const PASSWORD: &str = "Password";

    pub const FORECAST: [&str; 4] = [CODE, PRODUCT, QUANTITY_FORECAST, FORECAST_DATE];
    pub const DELIVERY: [&str; 5] = [
        CODE,
        PRODUCT,
        QUANTITY_DELIVERED,
        REFERENCE_DATE,
        REALIZED_DATE,
    ];
    pub const USERS: [&str; 2] = [USER, PASSWORD];
}

/// Composite identity used to attach deliveries to forecasts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinKey {
    pub code: String,
    pub date: Option<String>,
}

impl JoinKey {
    pub fn new(code: impl Into<String>, date: Option<String>) -> Self {
        Self {
            code: code.into(),
            date,
        }
    }
}

/// A row of the "Previsão" sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub code: String,
    pub product: String,
    pub quantity_forecast: f64,
    /// `dd/mm/yyyy` as written in the sheet.
    pub forecast_date: Option<String>,
}

impl ForecastRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            code: raw.text(columns::CODE).unwrap_or_default(),
            product: raw.text(columns::PRODUCT).unwrap_or_default(),
            quantity_forecast: raw.number(columns::QUANTITY_FORECAST).unwrap_or(0.0),
            forecast_date: raw.text(columns::FORECAST_DATE),
        }
    }

    pub fn key(&self) -> JoinKey {
        JoinKey::new(self.code.clone(), self.forecast_date.clone())
    }
}

/// A row of the "Entrega" sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub code: String,
    pub product: String,
    pub quantity_delivered: f64,
    /// The forecast date this delivery is booked against.
    pub reference_date: Option<String>,
    pub realized_delivery_date: Option<String>,
}

impl DeliveryRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            code: raw.text(columns::CODE).unwrap_or_default(),
            product: raw.text(columns::PRODUCT).unwrap_or_default(),
            quantity_delivered: raw.number(columns::QUANTITY_DELIVERED).unwrap_or(0.0),
            reference_date: raw.text(columns::REFERENCE_DATE),
            realized_delivery_date: raw.text(columns::REALIZED_DATE),
        }
    }

    pub fn key(&self) -> JoinKey {
        JoinKey::new(self.code.clone(), self.reference_date.clone())
    }
}

/// A row of the "Users" sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: Option<String>,
    pub user: String,
    pub password: String,
}

impl UserRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            name: raw.raw_text(columns::USER_NAME).map(str::to_string),
            user: raw.raw_text(columns::USER).unwrap_or_default().to_string(),
            password: raw.raw_text(columns::PASSWORD).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// Built from a forecast row plus its matched deliveries.
    Forecast,
    /// A delivery whose key matches no forecast.
    OrphanDelivery,
}

/// Row colouring thresholds on the delivery percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBand {
    /// Below 40%.
    Low,
    /// 40% to 90% inclusive.
    Partial,
    /// Above 90%.
    Complete,
}

/// A forecast joined with its deliveries, or a stand-in for an orphan delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    pub code: String,
    pub product: String,
    pub quantity_forecast: f64,
    /// Absent for orphan deliveries, which therefore never match a period filter.
    pub forecast_date: Option<String>,
    pub quantity_delivered: f64,
    pub difference: f64,
    pub delivery_percentage: f64,
    pub realized_delivery_date: Option<String>,
    pub origin: RecordOrigin,
    /// `(code, forecast date)` for forecasts, `(code, reference date)` for orphans.
    pub key: JoinKey,
}

impl ReconciledRecord {
    pub fn forecast_day(&self) -> Option<NaiveDate> {
        parse_date(self.forecast_date.as_deref())
    }

    pub fn realized_day(&self) -> Option<NaiveDate> {
        parse_date(self.realized_delivery_date.as_deref())
    }

    /// Percentage as displayed, always two decimals.
    pub fn percentage_label(&self) -> String {
        format!("{:.2}", self.delivery_percentage)
    }

    pub fn percentage_band(&self) -> PercentageBand {
        if self.delivery_percentage < 40.0 {
            PercentageBand::Low
        } else if self.delivery_percentage <= 90.0 {
            PercentageBand::Partial
        } else {
            PercentageBand::Complete
        }
    }

    /// Delivered after the forecast date. False when either date is missing.
    pub fn is_late(&self) -> bool {
        match (self.realized_day(), self.forecast_day()) {
            (Some(realized), Some(forecast)) => realized > forecast,
            _ => false,
        }
    }
}

pub fn parse_forecasts(text: &str, source: &str) -> Result<Vec<ForecastRecord>> {
    let sheet = parse_csv(text, source)?;
    sheet.require_columns(&columns::FORECAST)?;
    Ok(sheet.records.iter().map(ForecastRecord::from_raw).collect())
}

pub fn parse_deliveries(text: &str, source: &str) -> Result<Vec<DeliveryRecord>> {
    let sheet = parse_csv(text, source)?;
    sheet.require_columns(&columns::DELIVERY)?;
    Ok(sheet.records.iter().map(DeliveryRecord::from_raw).collect())
}

pub fn parse_users(text: &str, source: &str) -> Result<Vec<UserRecord>> {
    let sheet = parse_csv(text, source)?;
    sheet.require_columns(&columns::USERS)?;
    Ok(sheet.records.iter().map(UserRecord::from_raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcilerError;

    const FORECAST_CSV: &str = "Codigo,Produto,Quantidade Prevista,Data de Previsão de Entrega\n\
        1001,Widget,100,01/05/2024\n\
        B2,Gadget,,02/05/2024\n";

    #[test]
    fn test_parse_forecasts() {
        let forecasts = parse_forecasts(FORECAST_CSV, "Previsao").unwrap();
        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].code, "1001");
        assert_eq!(forecasts[0].quantity_forecast, 100.0);
        assert_eq!(forecasts[0].forecast_date.as_deref(), Some("01/05/2024"));
        assert_eq!(forecasts[1].quantity_forecast, 0.0);
    }

    #[test]
    fn test_parse_deliveries_missing_realized_date() {
        let text = "Codigo,Produto,Quantidade Entregue,Data Referente (Planejada),Data de Entrega Real\n\
            A1,Widget,40,01/05/2024,\n";
        let deliveries = parse_deliveries(text, "Entrega").unwrap();
        assert_eq!(deliveries[0].quantity_delivered, 40.0);
        assert_eq!(deliveries[0].realized_delivery_date, None);
        assert_eq!(
            deliveries[0].key(),
            JoinKey::new("A1", Some("01/05/2024".to_string()))
        );
    }

    #[test]
    fn test_parse_deliveries_rejects_wrong_sheet() {
        let err = parse_deliveries(FORECAST_CSV, "Entrega").unwrap_err();
        assert!(matches!(err, ReconcilerError::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_users() {
        let users = parse_users("Name,User,Password\nAna,ana,1234\n", "Users").unwrap();
        assert_eq!(users[0].name.as_deref(), Some("Ana"));
        assert_eq!(users[0].user, "ana");
        assert_eq!(users[0].password, "1234");
    }

    #[test]
    fn test_parse_users_keeps_numeric_looking_credentials() {
        let users = parse_users("Name,User,Password\nAna,007,0123\nBia,bia,1e3\n", "Users").unwrap();
        assert_eq!(users[0].user, "007");
        assert_eq!(users[0].password, "0123");
        assert_eq!(users[1].password, "1e3");
    }

    fn record(percentage: f64, forecast: Option<&str>, realized: Option<&str>) -> ReconciledRecord {
        ReconciledRecord {
            code: "A1".to_string(),
            product: "Widget".to_string(),
            quantity_forecast: 100.0,
            forecast_date: forecast.map(str::to_string),
            quantity_delivered: percentage,
            difference: percentage - 100.0,
            delivery_percentage: percentage,
            realized_delivery_date: realized.map(str::to_string),
            origin: RecordOrigin::Forecast,
            key: JoinKey::new("A1", forecast.map(str::to_string)),
        }
    }

    #[test]
    fn test_percentage_band_thresholds() {
        assert_eq!(record(39.99, None, None).percentage_band(), PercentageBand::Low);
        assert_eq!(record(40.0, None, None).percentage_band(), PercentageBand::Partial);
        assert_eq!(record(90.0, None, None).percentage_band(), PercentageBand::Partial);
        assert_eq!(record(90.01, None, None).percentage_band(), PercentageBand::Complete);
    }

    #[test]
    fn test_is_late() {
        assert!(record(100.0, Some("01/05/2024"), Some("03/05/2024")).is_late());
        assert!(!record(100.0, Some("01/05/2024"), Some("01/05/2024")).is_late());
        assert!(!record(100.0, None, Some("03/05/2024")).is_late());
        assert!(!record(100.0, Some("31/02/2024"), Some("03/05/2024")).is_late());
    }

    #[test]
    fn test_percentage_label() {
        assert_eq!(record(70.0, None, None).percentage_label(), "70.00");
    }
}
