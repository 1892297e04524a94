use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sales_forecast::{Cell, RawDataset, Record, Schema};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Accepted layouts: a bare array of rows, or `{"rows": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RowsFile {
    Bare(Vec<Map<String, Value>>),
    Wrapped { rows: Vec<Map<String, Value>> },
}

pub fn read_rows(path: &Path) -> Result<RawDataset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_rows(&text).with_context(|| format!("failed to parse rows in {}", path.display()))
}

pub fn parse_rows(text: &str) -> Result<RawDataset> {
    let rows = match serde_json::from_str::<RowsFile>(text)? {
        RowsFile::Bare(rows) | RowsFile::Wrapped { rows } => rows,
    };
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(column, value)| (column, to_cell(value)))
                .collect::<Record>()
        })
        .collect())
}

pub fn read_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid schema in {}", path.display()))
}

fn to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(n) => match n.as_f64() {
            Some(x) => Cell::Number(x),
            None => Cell::Text(n.to_string()),
        },
        Value::String(s) => Cell::Text(s),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_bare_rows() {
        let raw = parse_rows(r#"[{"Mois": 1, "Ventes": 100, "Prix": "10,5", "Pub": null}]"#).unwrap();
        assert_eq!(raw.len(), 1);
        let row = &raw.rows()[0];
        assert_eq!(row.get("Mois"), Some(&Cell::Number(1.0)));
        assert_eq!(row.get("Prix"), Some(&Cell::Text("10,5".to_string())));
        assert_eq!(row.get("Pub"), Some(&Cell::Empty));
    }

    #[test]
    fn test_parse_wrapped_rows() {
        let raw = parse_rows(r#"{"rows": [{"Mois": "Jan"}, {"Mois": "Fev", "Promo": true}]}"#)
            .unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(
            raw.rows()[1].get("Promo"),
            Some(&Cell::Text("true".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_json() {
        assert!(parse_rows(r#"{"Mois": 1}"#).is_err());
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn test_read_files() {
        let mut rows = NamedTempFile::new().unwrap();
        write!(rows, r#"[{{"Month": 1}}]"#).unwrap();
        assert_eq!(read_rows(rows.path()).unwrap().len(), 1);

        let mut schema = NamedTempFile::new().unwrap();
        write!(schema, r#"{{"period": "Month", "target": "Sales"}}"#).unwrap();
        let schema = read_schema(schema.path()).unwrap();
        assert_eq!(schema.period, "Month");
        assert_eq!(schema.target, "Sales");
        assert_eq!(schema.price, Schema::default().price);

        assert!(read_rows(Path::new("/nonexistent/ventes.json")).is_err());
    }
}
