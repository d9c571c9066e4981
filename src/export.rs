use crate::error::Result;
use crate::schema::ReconciledRecord;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One exported row, with the column titles the spreadsheet uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Código")]
    pub code: String,
    #[serde(rename = "Produto")]
    pub product: String,
    #[serde(rename = "Quantidade Prevista")]
    pub quantity_forecast: f64,
    #[serde(rename = "Data de Previsão")]
    pub forecast_date: Option<String>,
    #[serde(rename = "Data de Entrega Real")]
    pub realized_delivery_date: Option<String>,
    #[serde(rename = "Entregue")]
    pub quantity_delivered: f64,
    #[serde(rename = "Percentual")]
    pub percentage: String,
}

impl From<&ReconciledRecord> for ExportRow {
    fn from(record: &ReconciledRecord) -> Self {
        Self {
            code: record.code.clone(),
            product: record.product.clone(),
            quantity_forecast: record.quantity_forecast,
            forecast_date: record.forecast_date.clone(),
            realized_delivery_date: record.realized_delivery_date.clone(),
            quantity_delivered: record.quantity_delivered,
            percentage: record.percentage_label(),
        }
    }
}

pub fn export_rows(records: &[ReconciledRecord]) -> Vec<ExportRow> {
    records.iter().map(ExportRow::from).collect()
}

/// Writes the rows as CSV with a header line.
pub fn write_export_csv<W: Write>(writer: W, records: &[ReconciledRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for row in export_rows(records) {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_json(records: &[ReconciledRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_rows(records))?)
}
