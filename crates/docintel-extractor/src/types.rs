//! Core types for field extraction

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logistics fields pulled out of every document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// BOL, PRO, reference or load number
    ShipmentId,
    /// Shipping company or person
    Shipper,
    /// Receiving company or person
    Consignee,
    /// Pickup date and time
    PickupDatetime,
    /// Delivery date and time
    DeliveryDatetime,
    /// Trailer or container type
    EquipmentType,
    /// Transport mode
    Mode,
    /// Monetary amount
    Rate,
    /// Three-letter currency code
    Currency,
    /// Shipment weight
    Weight,
    /// Carrier company
    CarrierName,
}

/// How a field's value is cleaned and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Party names
    Name,
    /// Free text
    Text,
    /// Captured date/time strings
    DateTime,
    /// Positive floating-point amounts
    Amount,
    /// ISO currency code
    Currency,
}

impl Field {
    /// Every field, in output order
    pub const ALL: [Field; 11] = [
        Field::ShipmentId,
        Field::Shipper,
        Field::Consignee,
        Field::PickupDatetime,
        Field::DeliveryDatetime,
        Field::EquipmentType,
        Field::Mode,
        Field::Rate,
        Field::Currency,
        Field::Weight,
        Field::CarrierName,
    ];

    /// Key used in JSON output and model responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ShipmentId => "shipment_id",
            Field::Shipper => "shipper",
            Field::Consignee => "consignee",
            Field::PickupDatetime => "pickup_datetime",
            Field::DeliveryDatetime => "delivery_datetime",
            Field::EquipmentType => "equipment_type",
            Field::Mode => "mode",
            Field::Rate => "rate",
            Field::Currency => "currency",
            Field::Weight => "weight",
            Field::CarrierName => "carrier_name",
        }
    }

    /// Cleaning and validation family
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Shipper | Field::Consignee | Field::CarrierName => FieldKind::Name,
            Field::PickupDatetime | Field::DeliveryDatetime => FieldKind::DateTime,
            Field::Rate | Field::Weight => FieldKind::Amount,
            Field::Currency => FieldKind::Currency,
            Field::ShipmentId | Field::EquipmentType | Field::Mode => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The eleven extracted fields; absent values serialize as `null`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRecord {
    /// BOL, PRO, reference or load number
    pub shipment_id: Option<String>,
    /// Shipping party
    pub shipper: Option<String>,
    /// Receiving party
    pub consignee: Option<String>,
    /// Pickup date/time as written in the document
    pub pickup_datetime: Option<String>,
    /// Delivery date/time as written in the document
    pub delivery_datetime: Option<String>,
    /// Trailer or container type
    pub equipment_type: Option<String>,
    /// Transport mode
    pub mode: Option<String>,
    /// Positive monetary amount
    pub rate: Option<f64>,
    /// Three-letter currency code
    pub currency: Option<String>,
    /// Positive weight
    pub weight: Option<f64>,
    /// Carrier company
    pub carrier_name: Option<String>,
}

impl ExtractionRecord {
    /// Text value of a field; amounts are formatted
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::ShipmentId => self.shipment_id.clone(),
            Field::Shipper => self.shipper.clone(),
            Field::Consignee => self.consignee.clone(),
            Field::PickupDatetime => self.pickup_datetime.clone(),
            Field::DeliveryDatetime => self.delivery_datetime.clone(),
            Field::EquipmentType => self.equipment_type.clone(),
            Field::Mode => self.mode.clone(),
            Field::Rate => self.rate.map(|v| v.to_string()),
            Field::Currency => self.currency.clone(),
            Field::Weight => self.weight.map(|v| v.to_string()),
            Field::CarrierName => self.carrier_name.clone(),
        }
    }

    /// Whether a field holds a value
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Rate => self.rate.is_some(),
            Field::Weight => self.weight.is_some(),
            _ => self.get(field).is_some(),
        }
    }

    /// Number of non-null fields
    pub fn populated_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.has(**f)).count()
    }

    /// Whether every field is null
    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }
}

/// Which strategy produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Language model with JSON recovery
    Model,
    /// Regex cascade
    Rules,
}

/// A record with the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Normalized fields
    pub record: ExtractionRecord,
    /// Producing strategy
    pub method: ExtractionMethod,
}

/// Validation outcome for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Field checked
    pub field: Field,
    /// Whether the value is present and well-formed
    pub valid: bool,
    /// Problems found
    pub issues: Vec<String>,
}

/// Completeness and sanity report for a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Non-null field count
    pub fields_extracted: usize,
    /// Always 11
    pub total_fields: usize,
    /// `fields_extracted / total_fields`
    pub extraction_rate: f64,
    /// Per-field outcome in output order
    pub fields: Vec<FieldCheck>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_nulls() {
        let json = serde_json::to_value(ExtractionRecord::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 11);
        for field in Field::ALL {
            assert!(object[field.as_str()].is_null(), "{} should be null", field);
        }
    }

    #[test]
    fn test_populated_count() {
        let record = ExtractionRecord {
            shipper: Some("ABC Corp".into()),
            rate: Some(2500.0),
            ..Default::default()
        };
        assert_eq!(record.populated_count(), 2);
        assert!(!record.is_empty());
        assert!(ExtractionRecord::default().is_empty());
        assert_eq!(record.get(Field::Rate).as_deref(), Some("2500"));
    }

    #[test]
    fn test_field_names_match_record_keys() {
        let json = serde_json::to_value(ExtractionRecord::default()).unwrap();
        for field in Field::ALL {
            assert!(json.get(field.as_str()).is_some());
            assert_eq!(serde_json::to_value(field).unwrap(), field.as_str());
        }
    }
}
