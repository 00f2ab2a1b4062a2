use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Language of the extraction prompt sent to the completion service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// Where the raw text came from. Drives the default record name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    #[default]
    Scan,
    Voice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(deserialize_with = "string_or_null")]
    pub full_name: String,
    #[serde(deserialize_with = "string_or_null")]
    pub email: String,
    #[serde(deserialize_with = "string_or_null")]
    pub phone: String,
    #[serde(deserialize_with = "string_or_null")]
    pub address: String,
    #[serde(deserialize_with = "string_or_null")]
    pub summary: String,
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
            && self.address.is_empty()
            && self.summary.is_empty()
    }
}

/// Dates stay free-form: OCR and transcripts rarely yield unambiguous calendar dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(deserialize_with = "string_or_null")]
    pub institution: String,
    #[serde(deserialize_with = "string_or_null")]
    pub degree: String,
    #[serde(deserialize_with = "string_or_null")]
    pub field_of_study: String,
    #[serde(deserialize_with = "string_or_null")]
    pub start_date: String,
    #[serde(deserialize_with = "string_or_null")]
    pub end_date: String,
    #[serde(deserialize_with = "string_or_null")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "string_or_null")]
    pub company: String,
    #[serde(deserialize_with = "string_or_null")]
    pub position: String,
    #[serde(deserialize_with = "string_or_null")]
    pub start_date: String,
    #[serde(deserialize_with = "string_or_null")]
    pub end_date: String,
    #[serde(deserialize_with = "string_or_null")]
    pub description: String,
}

/// The extracted part of a CV, independent of identity and timestamps.
///
/// Both extraction paths produce this; [`CvRecord::new`] wraps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CvContent {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub abilities: Vec<String>,
}

impl CvContent {
    pub fn is_empty(&self) -> bool {
        self.personal_info.is_empty()
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.abilities.is_empty()
    }
}

/// The canonical structured CV.
///
/// Invariant: `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub source_references: Vec<String>,
}

impl CvRecord {
    pub fn new(
        content: CvContent,
        name: String,
        source_references: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
            personal_info: content.personal_info,
            education: content.education,
            experience: content.experience,
            abilities: content.abilities,
            source_references,
        }
    }

    /// Marks the record as edited. Never moves `updated_at` before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    #[cfg(test)]
    pub fn content(&self) -> CvContent {
        CvContent {
            personal_info: self.personal_info.clone(),
            education: self.education.clone(),
            experience: self.experience.clone(),
            abilities: self.abilities.clone(),
        }
    }
}

/// Which extraction route produced a record. Only affects the unnamed placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRoute {
    Heuristic,
    Ai,
}

/// Derives the display name of a freshly extracted record.
///
/// `<fullName>'s CV` when a name was found. Otherwise voice captures get a
/// timestamped `Voice CV`, scans on the heuristic route get `New CV` and scans
/// on the AI route get a timestamped `CV`.
pub fn derive_record_name(
    full_name: &str,
    source: CaptureSource,
    route: NamingRoute,
    now: DateTime<Utc>,
) -> String {
    let full_name = full_name.trim();
    if !full_name.is_empty() {
        return format!("{full_name}'s CV");
    }
    let stamp = now.format("%Y%m%d_%H%M%S");
    match (source, route) {
        (CaptureSource::Voice, _) => format!("Voice CV {stamp}"),
        (CaptureSource::Scan, NamingRoute::Heuristic) => "New CV".to_string(),
        (CaptureSource::Scan, NamingRoute::Ai) => format!("CV {stamp}"),
    }
}

/// Completion services emit `null` for unknown values; the record uses `""`.
pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_name_uses_full_name_when_present() {
        let name = derive_record_name(
            "Ana Torres",
            CaptureSource::Voice,
            NamingRoute::Heuristic,
            fixed_now(),
        );
        assert_eq!(name, "Ana Torres's CV");
    }

    #[test]
    fn test_name_placeholders_per_source_and_route() {
        let now = fixed_now();
        assert_eq!(
            derive_record_name("", CaptureSource::Scan, NamingRoute::Heuristic, now),
            "New CV"
        );
        assert_eq!(
            derive_record_name("  ", CaptureSource::Voice, NamingRoute::Heuristic, now),
            "Voice CV 20240309_140507"
        );
        assert_eq!(
            derive_record_name("", CaptureSource::Voice, NamingRoute::Ai, now),
            "Voice CV 20240309_140507"
        );
        assert_eq!(
            derive_record_name("", CaptureSource::Scan, NamingRoute::Ai, now),
            "CV 20240309_140507"
        );
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let now = fixed_now();
        let mut record = CvRecord::new(CvContent::default(), "New CV".into(), vec![], now);
        record.touch(now - chrono::Duration::hours(1));
        assert_eq!(record.updated_at, record.created_at);
        record.touch(now + chrono::Duration::hours(1));
        assert!(record.updated_at > record.created_at);
    }

    #[test]
    fn test_personal_info_nulls_become_empty_strings() {
        let json = r#"{"fullName": null, "email": "a@b.io"}"#;
        let info: PersonalInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.full_name, "");
        assert_eq!(info.email, "a@b.io");
        assert_eq!(info.phone, "");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = CvRecord::new(CvContent::default(), "New CV".into(), vec![], fixed_now());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("personalInfo").is_some());
        assert!(value.get("sourceReferences").is_some());
        assert!(value["personalInfo"].get("fullName").is_some());
    }

    #[test]
    fn test_locale_and_source_wire_names() {
        assert_eq!(serde_json::from_str::<Locale>(r#""es""#).unwrap(), Locale::Es);
        assert_eq!(
            serde_json::from_str::<CaptureSource>(r#""voice""#).unwrap(),
            CaptureSource::Voice
        );
    }
}
