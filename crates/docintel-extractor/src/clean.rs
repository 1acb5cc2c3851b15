//! Normalization shared by both extraction strategies
//!
//! Turns a loosely-typed field map into an [`ExtractionRecord`]. Running it
//! on its own output (re-serialized) changes nothing.

use crate::rules::parse_amount;
use crate::types::{ExtractionRecord, Field, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{3}").expect("valid regex"));

/// Normalize a raw field map; unknown keys are ignored
pub fn normalize(raw: &Map<String, Value>) -> ExtractionRecord {
    let text = |field: Field| -> Option<String> {
        let value = text_value(raw.get(field.as_str())?)?;
        match field.kind() {
            FieldKind::Name => clean_name(&value),
            FieldKind::Currency => clean_currency(&value),
            _ => non_empty(value.trim()),
        }
    };
    let amount = |field: Field| raw.get(field.as_str()).and_then(amount_value);

    ExtractionRecord {
        shipment_id: text(Field::ShipmentId),
        shipper: text(Field::Shipper),
        consignee: text(Field::Consignee),
        pickup_datetime: text(Field::PickupDatetime),
        delivery_datetime: text(Field::DeliveryDatetime),
        equipment_type: text(Field::EquipmentType),
        mode: text(Field::Mode),
        rate: amount(Field::Rate),
        currency: text(Field::Currency),
        weight: amount(Field::Weight),
        carrier_name: text(Field::CarrierName),
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn amount_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite() && *v > 0.0)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Collapse whitespace and drop trailing `,:;`
pub fn clean_name(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    non_empty(
        collapsed
            .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | ';'))
            .trim(),
    )
}

/// First run of three letters, uppercased
pub fn clean_currency(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    CURRENCY_CODE.find(&upper).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_names() {
        assert_eq!(clean_name("  ABC \n  Corp,; ").as_deref(), Some("ABC Corp"));
        assert_eq!(clean_name("XYZ Ltd, ;").as_deref(), Some("XYZ Ltd"));
        assert_eq!(clean_name(" ,; "), None);
    }

    #[test]
    fn test_currency() {
        assert_eq!(clean_currency("usd").as_deref(), Some("USD"));
        assert_eq!(clean_currency("$ CAD dollars").as_deref(), Some("CAD"));
        assert_eq!(clean_currency("$"), None);
    }

    #[test]
    fn test_amounts() {
        let record = normalize(&map(json!({"rate": "$2,500.00", "weight": 42000})));
        assert_eq!(record.rate, Some(2500.0));
        assert_eq!(record.weight, Some(42000.0));

        let record = normalize(&map(json!({"rate": -5, "weight": "n/a"})));
        assert_eq!(record.rate, None);
        assert_eq!(record.weight, None);

        let record = normalize(&map(json!({"rate": 0})));
        assert_eq!(record.rate, None);
    }

    #[test]
    fn test_value_types() {
        let record = normalize(&map(json!({
            "shipment_id": 448812,
            "mode": true,
            "equipment_type": ["van"],
            "pickup_datetime": "  2024-01-15 08:00 ",
            "consignee": "",
            "unknown": "ignored"
        })));
        assert_eq!(record.shipment_id.as_deref(), Some("448812"));
        assert_eq!(record.mode, None);
        assert_eq!(record.equipment_type, None);
        assert_eq!(record.pickup_datetime.as_deref(), Some("2024-01-15 08:00"));
        assert_eq!(record.consignee, None);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            shipper in "[ A-Za-z,;:]{0,20}",
            currency in "[ a-zA-Z$]{0,8}",
            rate in proptest::option::of(-1.0e6f64..1.0e6),
            mode in "[ A-Za-z]{0,10}",
        ) {
            let raw = map(json!({
                "shipper": shipper,
                "currency": currency,
                "rate": rate,
                "mode": mode,
            }));
            let once = normalize(&raw);
            let again = normalize(&map(serde_json::to_value(&once).unwrap()));
            prop_assert_eq!(once, again);
        }
    }
}
