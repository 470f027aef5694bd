//! Normalization of raw tabular payloads into date-indexed series.
//!
//! Backends return rows whose columns are not known statically: one date-like
//! column plus an arbitrary set of numeric columns. Normalization identifies
//! those columns from the first row, folds every row onto its UTC calendar
//! day, and drops anything that is not a finite number.

use std::collections::BTreeMap;

use macrocorr_traits::types::{date_from_millis, parse_date};
use macrocorr_traits::{CorrError, Date, Result};
use serde_json::Value;
use tracing::debug;

/// Date column names, in priority order.
pub const DATE_COLUMNS: [&str; 4] = ["date", "time", "timestamp", "ts"];

/// Date-indexed mapping of column name to finite value.
///
/// Missing values are absent keys, never zero.
pub type NormalizedSeries = BTreeMap<Date, BTreeMap<String, f64>>;

/// A normalized table without any asset-column requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Per-date values.
    pub map: NormalizedSeries,
    /// Name of the column the dates were read from.
    pub date_column: String,
    /// Columns whose first-row value was numeric, in key order.
    pub numeric_columns: Vec<String>,
    /// Every date present in `map`, ascending.
    pub dates: Vec<Date>,
}

impl NormalizedTable {
    /// The column as `(date, value)` pairs over every date of the table.
    ///
    /// Dates where the column has no value carry `None`.
    pub fn series(&self, column: &str) -> Vec<(Date, Option<f64>)> {
        self.map
            .iter()
            .map(|(date, row)| (*date, row.get(column).copied()))
            .collect()
    }

    /// Observed points of the column, skipping dates without a value.
    pub fn observations(&self, column: &str) -> Vec<(Date, f64)> {
        self.map
            .iter()
            .filter_map(|(date, row)| row.get(column).map(|v| (*date, *v)))
            .collect()
    }
}

/// A normalized factor table with its asset price column identified.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFactors {
    /// The underlying table.
    pub table: NormalizedTable,
    /// Column holding the tracked asset's price.
    pub btc_column: String,
}

/// Rows of a payload given either as a bare array or as `{ "data": [...] }`.
pub fn payload_rows(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}

/// Normalize a payload into a date-indexed table.
///
/// # Errors
///
/// - [`CorrError::EmptyPayload`] if there are no rows
/// - [`CorrError::MissingDateColumn`] if the first row has none of [`DATE_COLUMNS`]
pub fn normalize_table(payload: &Value) -> Result<NormalizedTable> {
    let rows = payload_rows(payload);
    let Some(first) = rows.first() else {
        return Err(CorrError::EmptyPayload);
    };
    let first = first.as_object();

    let date_column = first
        .and_then(|row| DATE_COLUMNS.iter().find(|k| row.contains_key(**k)))
        .map(|k| (*k).to_string())
        .ok_or_else(|| CorrError::MissingDateColumn(DATE_COLUMNS.join(", ")))?;

    let numeric_columns: Vec<String> = first
        .into_iter()
        .flat_map(|row| row.iter())
        .filter(|(k, v)| **k != date_column && is_numeric_cell(v))
        .map(|(k, _)| k.clone())
        .collect();

    let mut map = NormalizedSeries::new();
    for row in rows.iter().filter_map(Value::as_object) {
        let Some(date) = row.get(&date_column).and_then(cell_date) else {
            debug!(column = %date_column, "skipping row with unparseable date");
            continue;
        };
        let slot = map.entry(date).or_default();
        for column in &numeric_columns {
            if let Some(v) = row.get(column).and_then(cell_number) {
                slot.insert(column.clone(), v);
            }
        }
    }

    let dates = map.keys().copied().collect();
    Ok(NormalizedTable {
        map,
        date_column,
        numeric_columns,
        dates,
    })
}

/// Normalize a factor payload and identify its asset price column.
///
/// # Errors
///
/// Everything [`normalize_table`] returns, plus
/// [`CorrError::MissingAssetColumn`] when [`detect_asset_column`] finds nothing.
///
/// # Examples
///
/// ```
/// use macrocorr_series::normalize::normalize_factors;
/// use serde_json::json;
///
/// let payload = json!({ "data": [
///     { "date": "2024-01-01", "btc_close": 42000.0, "dxy": "102.5" },
///     { "date": "2024-01-02", "btc_close": 43000.0, "dxy": "102.1" },
/// ]});
/// let factors = normalize_factors(&payload).unwrap();
/// assert_eq!(factors.btc_column, "btc_close");
/// assert_eq!(factors.table.dates.len(), 2);
/// ```
pub fn normalize_factors(payload: &Value) -> Result<NormalizedFactors> {
    let table = normalize_table(payload)?;
    let btc_column = detect_asset_column(&table.numeric_columns)
        .map(str::to_string)
        .ok_or_else(|| CorrError::MissingAssetColumn(table.numeric_columns.join(", ")))?;
    Ok(NormalizedFactors { table, btc_column })
}

/// Pick the asset price column.
///
/// Priority: a name containing `btc` together with `close`, `price` or
/// `last`; then a column named `close`; then any name containing `btc`.
/// All comparisons ignore ASCII case.
pub fn detect_asset_column(columns: &[String]) -> Option<&str> {
    let lower: Vec<String> = columns.iter().map(|c| c.to_ascii_lowercase()).collect();
    let is_btc = |c: &str| c.contains("btc");
    let is_price = |c: &str| ["close", "price", "last"].iter().any(|k| c.contains(k));

    lower
        .iter()
        .position(|c| is_btc(c) && is_price(c))
        .or_else(|| lower.iter().position(|c| c == "close"))
        .or_else(|| lower.iter().position(|c| is_btc(c)))
        .map(|i| columns[i].as_str())
}

fn is_numeric_cell(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let t = s.trim();
            !t.is_empty() && t.parse::<f64>().is_ok_and(|v| !v.is_nan())
        }
        _ => false,
    }
}

fn cell_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn cell_date(value: &Value) -> Option<Date> {
    match value {
        Value::String(s) => parse_date(s).ok(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| date_from_millis(ms).ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(normalize_table(&json!([])), Err(CorrError::EmptyPayload)));
        assert!(matches!(
            normalize_table(&json!({ "data": [] })),
            Err(CorrError::EmptyPayload)
        ));
        assert!(matches!(
            normalize_table(&json!({ "rows": [1, 2] })),
            Err(CorrError::EmptyPayload)
        ));
    }

    #[test]
    fn test_missing_date_column() {
        let payload = json!([{ "day": "2024-01-01", "btc_close": 1.0 }]);
        assert!(matches!(
            normalize_table(&payload),
            Err(CorrError::MissingDateColumn(_))
        ));
    }

    #[test]
    fn test_date_column_priority() {
        let payload = json!([{ "ts": "2024-01-02", "date": "2024-01-01", "close": 1.0 }]);
        let table = normalize_table(&payload).unwrap();
        assert_eq!(table.date_column, "date");
        assert_eq!(table.dates, vec![d(2024, 1, 1)]);
        // the losing date-like column is a string, so it is not numeric either
        assert_eq!(table.numeric_columns, vec!["close".to_string()]);
    }

    #[test]
    fn test_numeric_column_detection() {
        let payload = json!([{
            "date": "2024-01-01",
            "btc_close": 42000,
            "dxy": "102.5",
            "label": "abc",
            "blank": "",
            "flag": true,
            "missing": null
        }]);
        let table = normalize_table(&payload).unwrap();
        assert_eq!(
            table.numeric_columns,
            vec!["btc_close".to_string(), "dxy".to_string()]
        );
    }

    #[test]
    fn test_asset_column_priority() {
        let cols = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            detect_asset_column(&cols(&["btc_volume", "close", "BTC_Price"])),
            Some("BTC_Price")
        );
        assert_eq!(detect_asset_column(&cols(&["btc_volume", "close"])), Some("close"));
        assert_eq!(detect_asset_column(&cols(&["btc_volume", "dxy"])), Some("btc_volume"));
        assert_eq!(detect_asset_column(&cols(&["dxy", "vix"])), None);
    }

    #[test]
    fn test_missing_asset_column() {
        let payload = json!([{ "date": "2024-01-01", "dxy": 102.0 }]);
        assert!(matches!(
            normalize_factors(&payload),
            Err(CorrError::MissingAssetColumn(_))
        ));
    }

    #[test]
    fn test_rows_fold_last_write_wins() {
        let payload = json!([
            { "date": "2024-01-01T08:00:00Z", "btc_close": 100.0, "dxy": 101.0 },
            { "date": "2024-01-01T20:00:00Z", "btc_close": 105.0, "dxy": null },
            { "date": "2024-01-02", "btc_close": "110", "dxy": "n/a" },
        ]);
        let factors = normalize_factors(&payload).unwrap();
        let map = &factors.table.map;

        assert_eq!(map[&d(2024, 1, 1)]["btc_close"], 105.0);
        // a null later in the day does not erase the earlier value
        assert_eq!(map[&d(2024, 1, 1)]["dxy"], 101.0);
        assert_eq!(map[&d(2024, 1, 2)]["btc_close"], 110.0);
        assert!(!map[&d(2024, 1, 2)].contains_key("dxy"));
    }

    #[test]
    fn test_non_finite_values_dropped() {
        let payload = json!([
            { "date": "2024-01-01", "close": 1.0, "x": 2.0 },
            { "date": "2024-01-02", "close": "NaN", "x": "inf" },
        ]);
        let table = normalize_table(&payload).unwrap();
        assert!(table.map[&d(2024, 1, 2)].is_empty());
        assert!(table.map.values().flat_map(|r| r.values()).all(|v| v.is_finite()));
    }

    #[test]
    fn test_epoch_millis_dates_and_sorting() {
        let payload = json!([
            { "timestamp": 1_704_153_600_000_i64, "close": 2.0 },
            { "timestamp": 1_704_067_200_000_i64, "close": 1.0 },
        ]);
        let table = normalize_table(&payload).unwrap();
        assert_eq!(table.dates, vec![d(2024, 1, 1), d(2024, 1, 2)]);
        assert_eq!(
            table.series("close"),
            vec![(d(2024, 1, 1), Some(1.0)), (d(2024, 1, 2), Some(2.0))]
        );
    }

    #[test]
    fn test_unparseable_date_rows_skipped() {
        let payload = json!([
            { "date": "2024-01-01", "close": 1.0 },
            { "date": "garbage", "close": 2.0 },
        ]);
        let table = normalize_table(&payload).unwrap();
        assert_eq!(table.dates.len(), 1);
    }

    #[test]
    fn test_series_and_observations() {
        let payload = json!([
            { "date": "2024-01-01", "close": 1.0, "x": 5.0 },
            { "date": "2024-01-02", "close": 2.0 },
        ]);
        let table = normalize_table(&payload).unwrap();
        assert_eq!(
            table.series("x"),
            vec![(d(2024, 1, 1), Some(5.0)), (d(2024, 1, 2), None)]
        );
        assert_eq!(table.observations("x"), vec![(d(2024, 1, 1), 5.0)]);
    }
}
