use crate::error::{ReconcilerError, Result};
use csv::ReaderBuilder;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell after opportunistic coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl FieldValue {
    /// Coerces a raw cell: numeric-looking text becomes a number, `true`/`false`
    /// become booleans, blank cells become `Null`, everything else stays text.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Null;
        }
        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return FieldValue::Number(n);
                }
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return FieldValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return FieldValue::Bool(false);
        }
        FieldValue::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Renders the value as text. Whole numbers lose their fractional part so a
    /// code like `1001` does not come back as `1001.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Null => None,
        }
    }

    /// Numeric view of the value. Text is re-parsed, accepting a decimal comma.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
            FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }
}

fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let mut digits = 0;
    let mut dots = 0;
    let mut exponent = false;
    let mut prev = ' ';
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' if !exponent => dots += 1,
            'e' | 'E' if digits > 0 && !exponent => exponent = true,
            '+' | '-' if prev == 'e' || prev == 'E' => {}
            _ => return false,
        }
        prev = c;
    }
    digits > 0 && dots <= 1 && !matches!(prev, 'e' | 'E' | '+' | '-')
}

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: BTreeMap<String, FieldValue>,
    /// Cells exactly as they appeared in the sheet, before coercion.
    pub raw: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&FieldValue::Null)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).as_text()
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_number()
    }

    /// Uncoerced cell text, for columns compared as exact strings.
    pub fn raw_text(&self, column: &str) -> Option<&str> {
        self.raw.get(column).map(String::as_str).filter(|s| !s.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.fields.values().all(FieldValue::is_null)
    }
}

/// Parsed sheet: header row plus every non-empty data row in sheet order.
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl ParsedSheet {
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            if !self.headers.iter().any(|h| h == column) {
                return Err(ReconcilerError::MissingColumn {
                    source_name: self.source.clone(),
                    column: (*column).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parses header-first CSV text into loosely-typed records.
///
/// Rows that fail to decode are skipped with a warning; an empty result is a
/// `NoData` error naming `source`.
pub fn parse_csv(text: &str, source: &str) -> Result<ParsedSheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {}", source, row_idx + 2, e);
                continue;
            }
        };

        let mut record = RawRecord::default();
        for (col_idx, value) in row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if header.is_empty() {
                    continue;
                }
                record.fields.insert(header.clone(), FieldValue::coerce(value));
                record.raw.insert(header.clone(), value.to_string());
            }
        }

        if record.is_blank() {
            continue;
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(ReconcilerError::NoData(source.to_string()));
    }

    debug!("{}: parsed {} records", source, records.len());

    Ok(ParsedSheet {
        source: source.to_string(),
        headers,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion() {
        assert_eq!(FieldValue::coerce("42"), FieldValue::Number(42.0));
        assert_eq!(FieldValue::coerce(" -3.5 "), FieldValue::Number(-3.5));
        assert_eq!(FieldValue::coerce("1e3"), FieldValue::Number(1000.0));
        assert_eq!(FieldValue::coerce("TRUE"), FieldValue::Bool(true));
        assert_eq!(FieldValue::coerce(""), FieldValue::Null);
        assert_eq!(
            FieldValue::coerce("01/05/2024"),
            FieldValue::Text("01/05/2024".to_string())
        );
        assert_eq!(FieldValue::coerce("inf"), FieldValue::Text("inf".to_string()));
        assert_eq!(FieldValue::coerce("1.2.3"), FieldValue::Text("1.2.3".to_string()));
        assert_eq!(FieldValue::coerce("-"), FieldValue::Text("-".to_string()));
    }

    #[test]
    fn test_as_text_drops_whole_number_fraction() {
        assert_eq!(FieldValue::Number(1001.0).as_text(), Some("1001".to_string()));
        assert_eq!(FieldValue::Number(2.5).as_text(), Some("2.5".to_string()));
        assert_eq!(FieldValue::Null.as_text(), None);
    }

    #[test]
    fn test_as_number_accepts_decimal_comma() {
        assert_eq!(FieldValue::Text("12,5".to_string()).as_number(), Some(12.5));
        assert_eq!(FieldValue::Text("abc".to_string()).as_number(), None);
    }

    #[test]
    fn test_parse_skips_blank_rows() {
        let text = "Codigo,Produto,Quantidade Prevista\nA1,Widget,100\n,,\n\nB2,Gadget,5\n";
        let sheet = parse_csv(text, "Previsao").unwrap();
        assert_eq!(sheet.headers, vec!["Codigo", "Produto", "Quantidade Prevista"]);
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].number("Quantidade Prevista"), Some(100.0));
        assert_eq!(sheet.records[1].text("Codigo"), Some("B2".to_string()));
    }

    #[test]
    fn test_parse_tolerates_ragged_rows() {
        let text = "Codigo,Produto,Quantidade Prevista\nA1,Widget\nB2,Gadget,5,extra\n";
        let sheet = parse_csv(text, "Previsao").unwrap();
        assert_eq!(sheet.records.len(), 2);
        assert!(sheet.records[0].get("Quantidade Prevista").is_null());
        assert_eq!(sheet.records[1].number("Quantidade Prevista"), Some(5.0));
    }

    #[test]
    fn test_raw_text_keeps_cell_as_written() {
        let sheet = parse_csv("User,Password\nana,0123\nbia,1.50\n", "Users").unwrap();
        assert_eq!(sheet.records[0].number("Password"), Some(123.0));
        assert_eq!(sheet.records[0].raw_text("Password"), Some("0123"));
        assert_eq!(sheet.records[1].raw_text("Password"), Some("1.50"));
        assert_eq!(sheet.records[1].raw_text("Missing"), None);
    }

    #[test]
    fn test_parse_header_only_is_no_data() {
        let err = parse_csv("Codigo,Produto\n", "Entrega").unwrap_err();
        assert!(matches!(err, ReconcilerError::NoData(ref s) if s == "Entrega"));
    }

    #[test]
    fn test_require_columns() {
        let sheet = parse_csv("Codigo\nA1\n", "Previsao").unwrap();
        assert!(sheet.require_columns(&["Codigo"]).is_ok());
        let err = sheet.require_columns(&["Codigo", "Produto"]).unwrap_err();
        assert!(matches!(err, ReconcilerError::MissingColumn { ref column, .. } if column == "Produto"));
    }
}
