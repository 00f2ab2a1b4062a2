//! Network-free CV extraction built from the pattern tables and section splitter.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::extraction::{patterns, sections};
use crate::models::cv::{
    derive_record_name, CaptureSource, CvContent, CvRecord, NamingRoute, PersonalInfo,
};

/// Deterministic fallback builder. Total: every input yields a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCvBuilder;

impl HeuristicCvBuilder {
    /// Extracts CV content from raw OCR or transcript text.
    ///
    /// Personal info is matched against the whole text; lists come from their
    /// sections. When nothing at all is recognised, the trimmed raw text becomes
    /// the summary so the caller still holds the source material.
    pub fn extract(&self, raw_text: &str) -> CvContent {
        let text = normalize_line_endings(raw_text);

        let mut content = CvContent {
            personal_info: PersonalInfo {
                full_name: patterns::full_name(&text),
                email: patterns::email(&text),
                phone: patterns::phone(&text),
                address: patterns::address(&text),
                summary: patterns::summary(&text),
            },
            education: sections::education_entries(&text),
            experience: sections::experience_entries(&text),
            abilities: sections::abilities(&text),
        };

        if content.is_empty() {
            content.personal_info.summary = text.trim().to_string();
        }

        debug!(
            education = content.education.len(),
            experience = content.experience.len(),
            abilities = content.abilities.len(),
            "heuristic extraction finished"
        );
        content
    }

    pub fn build(
        &self,
        raw_text: &str,
        source: CaptureSource,
        source_references: Vec<String>,
        now: DateTime<Utc>,
    ) -> CvRecord {
        let content = self.extract(raw_text);
        let name = derive_record_name(
            &content.personal_info.full_name,
            source,
            NamingRoute::Heuristic,
            now,
        );
        CvRecord::new(content, name, source_references, now)
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
