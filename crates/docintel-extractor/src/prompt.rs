//! LLM prompt engineering for field extraction

use crate::types::Field;

/// System instructions for the extraction call
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a precise data extraction assistant. \
Always return valid JSON with the exact field names specified. Use null for missing fields.";

/// Marker appended to text cut at the prompt budget
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

const EXTRACTION_INSTRUCTIONS: &str = "You are a logistics document extraction expert. \
Extract the following shipment information from the document below.";

const WORKED_EXAMPLES: &str = r#"EXAMPLES:
- "BOL#: 123456" → shipment_id: "123456"
- "Shipper: ABC Corp" → shipper: "ABC Corp"
- "Pickup: 2024-01-15 14:30" → pickup_datetime: "2024-01-15 14:30"
- "Rate: $2,500.00" → rate: 2500.00, currency: "USD"
- "Weight: 45000 lbs" → weight: 45000"#;

const RESPONSE_FORMAT: &str =
    "Return ONLY a valid JSON object with these fields. No explanations, no markdown, just pure JSON.";

/// Builds the user turn for the extraction call
pub struct PromptBuilder<'a> {
    text: &'a str,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder over the document text
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self { text, max_chars }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nREQUIRED FIELDS (use null if not found):\n");
        for (n, field) in Field::ALL.iter().enumerate() {
            prompt.push_str(&format!("{}. {}: {}\n", n + 1, field, field_guidance(*field)));
        }

        prompt.push('\n');
        prompt.push_str(WORKED_EXAMPLES);
        prompt.push_str("\n\nDOCUMENT TEXT:\n");
        prompt.push_str(&truncate(self.text, self.max_chars));
        prompt.push_str("\n\n");
        prompt.push_str(RESPONSE_FORMAT);
        prompt.push('\n');

        prompt
    }
}

fn field_guidance(field: Field) -> &'static str {
    match field {
        Field::ShipmentId => "Any ID number (BOL#, PRO#, Reference#, Booking#)",
        Field::Shipper => "Company name of sender/shipper",
        Field::Consignee => "Company name of receiver",
        Field::PickupDatetime => "Date and time of pickup (format: YYYY-MM-DD HH:MM)",
        Field::DeliveryDatetime => "Date and time of delivery (format: YYYY-MM-DD HH:MM)",
        Field::EquipmentType => {
            "Type of trailer/container (e.g., \"53ft van\", \"40ft container\", \"Reefer\")"
        }
        Field::Mode => "Transport mode (\"Truck\", \"Rail\", \"Ocean\", \"Air\", \"LTL\", \"FTL\")",
        Field::Rate => "Monetary amount as number (just the number, no currency symbol)",
        Field::Currency => "Currency code (USD, CAD, EUR, etc.)",
        Field::Weight => "Weight as number (just the number)",
        Field::CarrierName => "Name of carrier company",
    }
}

/// First `max_chars` characters of `text`, marked when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_field() {
        let prompt = PromptBuilder::new("BOL#: 1", 100).build();
        for field in Field::ALL {
            assert!(prompt.contains(field.as_str()), "missing {}", field);
        }
        assert!(prompt.contains("11. carrier_name"));
        assert!(prompt.contains("DOCUMENT TEXT:\nBOL#: 1\n\n"));
        assert!(prompt.trim_end().ends_with("just pure JSON."));
    }

    #[test]
    fn test_truncation() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc\n...[truncated]");
        assert_eq!(truncate("ééé", 1), "é\n...[truncated]");

        let long = "x".repeat(10_001);
        let prompt = PromptBuilder::new(&long, 10_000).build();
        assert!(prompt.contains(TRUNCATION_MARKER));
        assert!(!prompt.contains(&"x".repeat(10_001)));
    }
}
