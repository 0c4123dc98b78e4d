//! Field normalization for remote payloads.
//!
//! The remote backend is loose about scalar encodings: prices and quantities
//! sometimes arrive as numeric strings, and timestamps appear in several
//! ISO-8601 dialects. Normalization runs on every successful remote read,
//! before the rows are decoded into typed models, so the rest of the crate
//! only ever sees canonical values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Field name suffixes holding decimal amounts.
const PRICE_SUFFIXES: &[&str] = &["price", "total", "amount"];

/// Field names holding integer counts.
const COUNT_FIELDS: &[&str] = &["quantity", "qty", "stock"];

/// Field name suffixes holding timestamps.
const DATE_SUFFIXES: &[&str] = &["_at", "date"];

/// Normalize every row in a remote result set.
#[must_use]
pub fn normalize_rows(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter().map(normalize_row).collect()
}

/// Normalize one row: numeric strings to numbers, date strings to
/// canonical RFC 3339. Non-object rows pass through untouched.
#[must_use]
pub fn normalize_row(mut row: Value) -> Value {
    if let Value::Object(fields) = &mut row {
        for (name, value) in fields.iter_mut() {
            let Value::String(raw) = value else { continue };

            if is_count_field(name) {
                if let Ok(n) = raw.trim().parse::<i64>() {
                    *value = Value::Number(n.into());
                }
            } else if is_price_field(name) {
                if let Some(n) = parse_number(raw.trim()) {
                    *value = Value::Number(n);
                }
            } else if is_date_field(name) {
                if let Some(canonical) = parse_date(raw.trim()) {
                    *value = Value::String(canonical);
                }
            }
        }
    }
    row
}

fn is_price_field(name: &str) -> bool {
    PRICE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

fn is_count_field(name: &str) -> bool {
    COUNT_FIELDS.contains(&name)
}

fn is_date_field(name: &str) -> bool {
    DATE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Parse a numeric string into a JSON number, preferring integers.
fn parse_number(raw: &str) -> Option<serde_json::Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n.into());
    }
    raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
}

/// Parse a timestamp in any accepted dialect and re-emit it as RFC 3339 UTC.
///
/// Accepted forms, in order:
/// - RFC 3339 with offset (`2024-05-01T10:30:00+02:00`)
/// - Space-separated without offset, assumed UTC (`2024-05-01 10:30:00`)
/// - Bare date, midnight UTC (`2024-05-01`)
fn parse_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc().to_rfc3339());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc3339());
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_string_to_number() {
        let row = normalize_row(json!({"price": "12.50", "name": "19L bottle"}));
        assert_eq!(row["price"], json!(12.5));
        // Non-price strings untouched
        assert_eq!(row["name"], json!("19L bottle"));
    }

    #[test]
    fn test_total_and_amount_suffixes() {
        let row = normalize_row(json!({"order_total": "30", "refund_amount": "2.25"}));
        assert_eq!(row["order_total"], json!(30));
        assert_eq!(row["refund_amount"], json!(2.25));
    }

    #[test]
    fn test_quantity_string_to_integer() {
        let row = normalize_row(json!({"quantity": "4", "stock": "120"}));
        assert_eq!(row["quantity"], json!(4));
        assert_eq!(row["stock"], json!(120));
    }

    #[test]
    fn test_date_dialects_canonicalized() {
        let row = normalize_row(json!({
            "created_at": "2024-05-01 10:30:00",
            "delivery_date": "2024-05-02",
            "updated_at": "2024-05-01T10:30:00+02:00",
        }));
        assert_eq!(row["created_at"], json!("2024-05-01T10:30:00+00:00"));
        assert_eq!(row["delivery_date"], json!("2024-05-02T00:00:00+00:00"));
        assert_eq!(row["updated_at"], json!("2024-05-01T08:30:00+00:00"));
    }

    #[test]
    fn test_unparseable_values_left_alone() {
        let row = normalize_row(json!({"price": "call us", "created_at": "yesterday"}));
        assert_eq!(row["price"], json!("call us"));
        assert_eq!(row["created_at"], json!("yesterday"));
    }

    #[test]
    fn test_already_typed_values_untouched() {
        let row = normalize_row(json!({"price": 9.99, "created_at": "2024-05-01T10:30:00+00:00"}));
        assert_eq!(row["price"], json!(9.99));
        assert_eq!(row["created_at"], json!("2024-05-01T10:30:00+00:00"));
    }

    #[test]
    fn test_non_object_rows_pass_through() {
        assert_eq!(normalize_row(json!(42)), json!(42));
        assert_eq!(normalize_rows(vec![json!("x")]), vec![json!("x")]);
    }
}
