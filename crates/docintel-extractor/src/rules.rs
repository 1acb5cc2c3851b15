//! Regex cascade used when no model answer is available
//!
//! Each field owns an ordered list of patterns. The first pattern that
//! matches anywhere in the text wins; later patterns for that field are
//! not consulted.

use crate::types::{Field, FieldKind};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

const AMOUNT: &str = r"((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?)";
const QUANTITY: &str = r"((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)";
const DATE: &str = r"(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})";
const TIME: &str = r"\d{1,2}:\d{2}(?:\s*[AP]M)?";
const REFERENCE: &str = r"([A-Z]{0,6}-?\d[-A-Z0-9]{2,20})";
const PARTY: &str = r"([A-Za-z0-9\s&.,'\-]+?)";
const CONTACT_STOP: &str = r"\s*(?:$|\b(?:TEL|FAX|PHONE)\b)";
const PICKUP_LABEL: &str = r"\b(?:PICK\s*UP|PU)\s*(?:DATE/TIME|DATE|TIME|DT|APPOINTMENT)?\s*[:\n]\s*";
const DELIVERY_LABEL: &str =
    r"\b(?:DELIVERY|DELIVER|DEL|DROP\s*OFF|DROP)\s*(?:DATE/TIME|DATE|TIME|DT|APPOINTMENT)?\s*[:\n]\s*";

/// Patterns for one field, in priority order
pub struct FieldRule {
    /// Field populated by this rule
    pub field: Field,
    /// Compiled patterns, first match wins
    pub patterns: Vec<Regex>,
}

impl FieldRule {
    fn new(field: Field, sources: Vec<String>) -> Self {
        let patterns = sources
            .iter()
            .filter_map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .map_err(|e| warn!("Skipping {} pattern {:?}: {}", field, source, e))
                    .ok()
            })
            .collect();
        Self { field, patterns }
    }

    /// Cleaned capture of the first matching pattern
    pub fn capture(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            let captures = pattern.captures(text)?;
            let matched = captures.get(1).or_else(|| captures.get(0))?;
            debug!("{} matched {:?}", self.field, matched.as_str());
            Some(tidy(matched.as_str()))
        })
    }
}

static RULES: Lazy<Vec<FieldRule>> = Lazy::new(build_rules);

/// The rule table in field order
pub fn rules() -> &'static [FieldRule] {
    &RULES
}

fn build_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(
            Field::ShipmentId,
            vec![
                format!(
                    r"\b(?:BOL|PRO|REF(?:ERENCE)?|SHIP(?:MENT)?|LOAD|BOOKING)\b\s*(?:#|NO\.?|NUMBER|ID)?\s*[#:;]*\s*{REFERENCE}"
                ),
                format!(r"(?:BILL\s+OF\s+LADING|B/L)\s*(?:#|NO\.?|NUMBER)?\s*[#:;]*\s*{REFERENCE}"),
                r"\b(\d{6,20})\b".to_string(),
            ],
        ),
        FieldRule::new(
            Field::Shipper,
            vec![
                format!(r"\b(?:SHIPPER|SENDER|FROM)\s*(?:NAME)?\s*[:\n]\s*{PARTY}{CONTACT_STOP}"),
                format!(r"\bSHIPPER\s*[:\-]?\s*{PARTY}\s*$"),
            ],
        ),
        FieldRule::new(
            Field::Consignee,
            vec![
                format!(
                    r"\b(?:CONSIGNEE|RECEIVER|DELIVER\s+TO|SHIP\s+TO|TO)\s*(?:NAME)?\s*[:\n]\s*{PARTY}{CONTACT_STOP}"
                ),
                format!(r"\bCONSIGNEE\s*[:\-]?\s*{PARTY}\s*$"),
            ],
        ),
        FieldRule::new(
            Field::PickupDatetime,
            vec![
                format!(r"{PICKUP_LABEL}({DATE}(?:\s+|T){TIME})"),
                format!(r"{PICKUP_LABEL}({DATE})"),
                r"(\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\s+\d{1,2}:\d{2}(?:\s*[AP]M)?)".to_string(),
            ],
        ),
        FieldRule::new(
            Field::DeliveryDatetime,
            vec![
                format!(r"{DELIVERY_LABEL}({DATE}(?:\s+|T){TIME})"),
                format!(r"{DELIVERY_LABEL}({DATE})"),
            ],
        ),
        FieldRule::new(
            Field::EquipmentType,
            vec![
                r#"\b(?:EQUIPMENT(?:\s+TYPE)?|EQUIP|TRAILER(?:\s+TYPE)?|CONTAINER(?:\s+TYPE)?)[ \t]*[:\n]\s*([A-Za-z0-9 '"/\-]+?)\s*$"#
                    .to_string(),
                r"\b(53\s*(?:'|FT|FOOT)?\s*(?:DRY\s+)?(?:VAN|REEFER)|40\s*(?:'|FT|FOOT)?\s*(?:CONTAINER|HC|HIGH\s+CUBE)|20\s*(?:'|FT|FOOT)?\s*CONTAINER|DRY\s+VAN|REEFER|FLATBED|STEP\s*DECK|VAN)\b"
                    .to_string(),
            ],
        ),
        FieldRule::new(
            Field::Mode,
            vec![
                r"\b(?:TRANSPORT\s+MODE|MODE|SERVICE(?:\s+TYPE)?)\s*[:\n]\s*([A-Za-z]+)".to_string(),
                r"\b(FTL|LTL|TL|TRUCKLOAD|TRUCK|INTERMODAL|RAIL|OCEAN|AIR|EXPEDITED|DRAYAGE)\b".to_string(),
            ],
        ),
        FieldRule::new(
            Field::Rate,
            vec![
                format!(
                    r"\b(?:TOTAL\s+RATE|RATE|TOTAL\s+CHARGES?|LINE\s*HAUL|CHARGES?|AMOUNT|TOTAL)\b\s*(?:\([A-Z]{{3}}\))?\s*[:$]?\s*(?:USD|CAD|US\$|\$)?\s*{AMOUNT}"
                ),
                format!(r"\$\s*{AMOUNT}"),
                format!(r"{AMOUNT}\s*(?:USD|CAD|EUR)\b"),
            ],
        ),
        FieldRule::new(
            Field::Currency,
            vec![
                r"\bCURRENCY\s*[:\n]\s*([A-Z]{3})\b".to_string(),
                r"\b(USD|CAD|EUR|GBP|MXN)\b".to_string(),
            ],
        ),
        FieldRule::new(
            Field::Weight,
            vec![
                format!(
                    r"\b(?:GROSS\s+WEIGHT|TOTAL\s+WEIGHT|WEIGHT|WT|GROSS)\b\s*(?:\(\s*(?:LBS?|KGS?)\s*\))?\s*[:\n]\s*{QUANTITY}"
                ),
                format!(r"{QUANTITY}\s*(?:LBS?|POUNDS|KGS?|KILOGRAMS)\b"),
            ],
        ),
        FieldRule::new(
            Field::CarrierName,
            vec![
                format!(
                    r"\b(?:CARRIER\s+NAME|CARRIER|TRUCKING\s+CO(?:MPANY)?|TRANSPORTER)\s*[:\n]\s*{PARTY}\s*(?:$|\b(?:TEL|FAX|PHONE|MC|DOT)\b)"
                ),
                format!(r"\bCARRIER\s*[:\-]?\s*{PARTY}\s*$"),
            ],
        ),
    ]
}

/// Run the cascade over `text`, producing a raw field map
///
/// Every field is present in the map; unmatched fields are `null`.
/// Amounts are parsed after dropping everything but digits and dots.
pub fn apply(text: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for rule in rules() {
        let value = match rule.capture(text) {
            Some(captured) if rule.field.kind() == FieldKind::Amount => parse_amount(&captured)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Some(captured) if !captured.is_empty() => Value::String(captured),
            _ => Value::Null,
        };
        map.insert(rule.field.as_str().to_string(), value);
    }
    map
}

/// Collapse whitespace and strip separator characters from both ends
fn tidy(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';' | '-'))
        .to_string()
}

/// Parse an amount after keeping only digits and dots
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse::<f64>().ok()
}
