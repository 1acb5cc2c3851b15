//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docintel_domain::ConfidenceLevel;
use docintel_engine::IngestReceipt;
use docintel_extractor::{Extraction, Field, ValidationReport};
use docintel_rag::Answer;
use docintel_store::{DocumentSummary, Residency};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an ingestion receipt.
    pub fn format_receipt(&self, receipt: &IngestReceipt) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
            OutputFormat::Quiet => Ok(receipt.id.to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "Ingested {} as {} ({} chunks)",
                receipt.filename, receipt.id, receipt.chunk_count
            ))),
        }
    }

    /// Format an answer with its confidence and source.
    pub fn format_answer(&self, answer: &Answer) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(answer)?),
            OutputFormat::Quiet => Ok(answer.answer.clone()),
            OutputFormat::Table => {
                let mut out = String::new();
                out.push_str(&answer.answer);
                out.push_str("\n\n");
                out.push_str(&format!(
                    "Confidence: {}\n",
                    self.confidence(answer.confidence, answer.level)
                ));
                if let Some(position) = answer.source_chunk_index {
                    out.push_str(&format!("Source (chunk {}):\n", position));
                    out.push_str(&self.colorize(&answer.source_text, "cyan"));
                }
                Ok(out.trim_end().to_string())
            }
        }
    }

    /// Format extracted fields, optionally with a validation report.
    pub fn format_extraction(
        &self,
        extraction: &Extraction,
        report: Option<&ValidationReport>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = match report {
                    Some(report) => serde_json::json!({
                        "fields": extraction.record,
                        "method": extraction.method,
                        "validation": report,
                    }),
                    None => serde_json::to_value(&extraction.record)?,
                };
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(Field::ALL
                .iter()
                .map(|f| format!("{}={}", f, extraction.record.get(*f).unwrap_or_default()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                match report {
                    Some(_) => builder.push_record(["Field", "Value", "Valid", "Issues"]),
                    None => builder.push_record(["Field", "Value"]),
                }

                for field in Field::ALL {
                    let value = extraction.record.get(field).unwrap_or_else(|| "-".to_string());
                    match report.and_then(|r| r.fields.iter().find(|c| c.field == field)) {
                        Some(check) => builder.push_record([
                            field.to_string(),
                            value,
                            if check.valid { "yes" } else { "no" }.to_string(),
                            check.issues.join("; "),
                        ]),
                        None => builder.push_record([field.to_string(), value]),
                    }
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let mut out = table.to_string();
                if let Some(report) = report {
                    out.push_str(&format!(
                        "\n{} of {} fields extracted ({:.0}%) via {:?}",
                        report.fields_extracted,
                        report.total_fields,
                        report.extraction_rate * 100.0,
                        extraction.method
                    ));
                }
                Ok(out)
            }
        }
    }

    /// Format the document listing.
    pub fn format_documents(&self, documents: &[DocumentSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
            OutputFormat::Quiet => Ok(documents
                .iter()
                .map(|d| d.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if documents.is_empty() {
                    return Ok(self.colorize("No documents found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Filename", "Chunks", "Location"]);
                for doc in documents {
                    builder.push_record([
                        doc.id.to_string(),
                        doc.filename.clone().unwrap_or_else(|| "-".to_string()),
                        doc.chunk_count.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string()),
                        match doc.residency {
                            Residency::Memory => "memory".to_string(),
                            Residency::Disk => "disk".to_string(),
                        },
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn confidence(&self, score: f64, level: ConfidenceLevel) -> String {
        let text = format!("{:.2} ({})", score, level);
        let color = match level {
            ConfidenceLevel::High => "green",
            ConfidenceLevel::Medium => "cyan",
            ConfidenceLevel::Low => "yellow",
            ConfidenceLevel::Insufficient => "red",
        };
        self.colorize(&text, color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
