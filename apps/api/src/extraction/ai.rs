//! AI-assisted extraction: one completion call, one JSON object, all-or-nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::extraction::prompts::build_prompt;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::cv::{
    derive_record_name, CaptureSource, CvContent, CvRecord, EducationEntry, ExperienceEntry,
    Locale, NamingRoute, PersonalInfo,
};

/// Why the AI path produced no record. Always absorbed by the pipeline.
#[derive(Debug, Error)]
pub enum ExtractionFailed {
    #[error("completion service is not configured")]
    NotConfigured,

    #[error("completion call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("reply contained no JSON object")]
    NoJsonObject,

    #[error("malformed CV payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Wire shape demanded by the extraction prompt. `personalInfo` is required;
/// the lists default to empty and nulls read as empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvPayload {
    personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "list_or_null")]
    education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "list_or_null")]
    experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "abilities_list")]
    abilities: Vec<String>,
}

impl From<CvPayload> for CvContent {
    fn from(payload: CvPayload) -> Self {
        CvContent {
            personal_info: payload.personal_info,
            education: payload.education,
            experience: payload.experience,
            abilities: payload.abilities,
        }
    }
}

fn list_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn abilities_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .flatten()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// The slice from the first `{` to the last `}`; models sometimes wrap JSON in prose.
pub(crate) fn embedded_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses a completion reply into CV content.
pub(crate) fn parse_reply(reply: &str) -> Result<CvContent, ExtractionFailed> {
    let json = embedded_json_object(reply).ok_or(ExtractionFailed::NoJsonObject)?;
    let payload: CvPayload = serde_json::from_str(json)?;
    Ok(payload.into())
}

/// Structured extraction through a completion backend.
///
/// The backend is shared; the builder itself holds no per-call state.
#[derive(Clone)]
pub struct AiCvBuilder {
    backend: Arc<dyn CompletionBackend>,
}

impl AiCvBuilder {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    pub async fn extract(&self, raw_text: &str, locale: Locale) -> Result<CvContent, ExtractionFailed> {
        if !self.is_configured() {
            return Err(ExtractionFailed::NotConfigured);
        }
        let (prompt, system) = build_prompt(raw_text, locale);
        let reply = self.backend.complete(&prompt, system).await?;
        debug!(reply_len = reply.len(), "completion reply received");
        parse_reply(&reply)
    }

    pub async fn build(
        &self,
        raw_text: &str,
        locale: Locale,
        source: CaptureSource,
        source_references: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<CvRecord, ExtractionFailed> {
        let content = self.extract(raw_text, locale).await?;
        let name = derive_record_name(
            &content.personal_info.full_name,
            source,
            NamingRoute::Ai,
            now,
        );
        Ok(CvRecord::new(content, name, source_references, now))
    }
}
