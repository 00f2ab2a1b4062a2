//! Schema.org JSON-LD conversion for CV records.
//!
//! A record maps to a `ProfilePage` whose `mainEntity` is the `Person`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::cv::{CvRecord, EducationEntry, ExperienceEntry, PersonalInfo};

const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Error)]
pub enum SchemaOrgError {
    #[error("expected a schema.org ProfilePage document")]
    NotProfilePage,

    #[error("ProfilePage has no Person mainEntity")]
    MissingPerson,
}

pub fn to_schema_org(record: &CvRecord) -> Value {
    let info = &record.personal_info;
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "ProfilePage",
        "identifier": record.id,
        "name": record.name,
        "dateCreated": record.created_at.to_rfc3339(),
        "dateModified": record.updated_at.to_rfc3339(),
        "mainEntity": {
            "@type": "Person",
            "name": info.full_name,
            "email": info.email,
            "telephone": info.phone,
            "address": info.address,
            "description": info.summary,
            "alumniOf": record.education.iter().map(education_to_json).collect::<Vec<_>>(),
            "worksFor": record.experience.iter().map(experience_to_json).collect::<Vec<_>>(),
            "knowsAbout": record.abilities,
            "subjectOf": record
                .source_references
                .iter()
                .map(|reference| json!({"@type": "ImageObject", "contentUrl": reference}))
                .collect::<Vec<_>>(),
        }
    })
}

fn education_to_json(entry: &EducationEntry) -> Value {
    json!({
        "@type": "EducationalOrganization",
        "name": entry.institution,
        "degree": entry.degree,
        "fieldOfStudy": entry.field_of_study,
        "startDate": entry.start_date,
        "endDate": entry.end_date,
        "description": entry.description,
    })
}

fn experience_to_json(entry: &ExperienceEntry) -> Value {
    json!({
        "@type": "Organization",
        "name": entry.company,
        "jobTitle": entry.position,
        "startDate": entry.start_date,
        "endDate": entry.end_date,
        "description": entry.description,
    })
}

/// Rebuilds a record from [`to_schema_org`] output.
///
/// Missing properties read as `""`/empty; a missing identifier gets a fresh id
/// and missing or unparsable timestamps fall back to `now`.
pub fn from_schema_org(doc: &Value, now: DateTime<Utc>) -> Result<CvRecord, SchemaOrgError> {
    if str_field(doc, "@type") != "ProfilePage" {
        return Err(SchemaOrgError::NotProfilePage);
    }
    let person = doc
        .get("mainEntity")
        .filter(|entity| str_field(entity, "@type") == "Person")
        .ok_or(SchemaOrgError::MissingPerson)?;

    let created_at = timestamp_field(doc, "dateCreated").unwrap_or(now);

    let mut record = CvRecord {
        id: doc
            .get("identifier")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4),
        name: str_field(doc, "name"),
        created_at,
        updated_at: created_at,
        personal_info: PersonalInfo {
            full_name: str_field(person, "name"),
            email: str_field(person, "email"),
            phone: str_field(person, "telephone"),
            address: str_field(person, "address"),
            summary: str_field(person, "description"),
        },
        education: array_field(person, "alumniOf")
            .map(|org| EducationEntry {
                institution: str_field(org, "name"),
                degree: str_field(org, "degree"),
                field_of_study: str_field(org, "fieldOfStudy"),
                start_date: str_field(org, "startDate"),
                end_date: str_field(org, "endDate"),
                description: str_field(org, "description"),
            })
            .collect(),
        experience: array_field(person, "worksFor")
            .map(|org| ExperienceEntry {
                company: str_field(org, "name"),
                position: str_field(org, "jobTitle"),
                start_date: str_field(org, "startDate"),
                end_date: str_field(org, "endDate"),
                description: str_field(org, "description"),
            })
            .collect(),
        abilities: array_field(person, "knowsAbout")
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        source_references: array_field(person, "subjectOf")
            .map(|image| str_field(image, "contentUrl"))
            .filter(|url| !url.is_empty())
            .collect(),
    };
    record.touch(timestamp_field(doc, "dateModified").unwrap_or(now));
    Ok(record)
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn array_field<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
}

fn timestamp_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::CvContent;
    use chrono::TimeZone;

    fn sample_record() -> CvRecord {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        let content = CvContent {
            personal_info: PersonalInfo {
                full_name: "Ana Torres".into(),
                email: "ana@t.es".into(),
                phone: "+34 600 000 000".into(),
                address: "Madrid".into(),
                summary: "Backend engineer".into(),
            },
            education: vec![EducationEntry {
                institution: "UPM".into(),
                degree: "BSc".into(),
                field_of_study: "CS".into(),
                start_date: "2012".into(),
                end_date: "2016".into(),
                description: String::new(),
            }],
            experience: vec![ExperienceEntry {
                company: "Cabify".into(),
                position: "Engineer".into(),
                start_date: "2017".into(),
                end_date: "present".into(),
                description: "APIs".into(),
            }],
            abilities: vec!["Rust".into(), "Go".into()],
        };
        CvRecord::new(content, "Ana Torres's CV".into(), vec!["scan-1.jpg".into()], now)
    }

    #[test]
    fn test_export_shape() {
        let doc = to_schema_org(&sample_record());
        assert_eq!(doc["@context"], "https://schema.org");
        assert_eq!(doc["@type"], "ProfilePage");
        assert_eq!(doc["mainEntity"]["@type"], "Person");
        assert_eq!(doc["mainEntity"]["telephone"], "+34 600 000 000");
        assert_eq!(doc["mainEntity"]["alumniOf"][0]["@type"], "EducationalOrganization");
        assert_eq!(doc["mainEntity"]["worksFor"][0]["jobTitle"], "Engineer");
        assert_eq!(doc["mainEntity"]["knowsAbout"][1], "Go");
        assert_eq!(doc["mainEntity"]["subjectOf"][0]["contentUrl"], "scan-1.jpg");
    }

    #[test]
    fn test_import_restores_exported_record() {
        let record = sample_record();
        let restored = from_schema_org(&to_schema_org(&record), Utc::now()).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_import_defaults_missing_properties() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let doc = json!({
            "@type": "ProfilePage",
            "mainEntity": {"@type": "Person", "name": "Solo", "knowsAbout": ["Rust", 3]}
        });
        let record = from_schema_org(&doc, now).unwrap();
        assert_eq!(record.personal_info.full_name, "Solo");
        assert_eq!(record.personal_info.email, "");
        assert_eq!(record.abilities, vec!["Rust"]);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
        assert!(record.education.is_empty());
    }

    #[test]
    fn test_import_rejects_other_documents() {
        let now = Utc::now();
        assert!(matches!(
            from_schema_org(&json!({"@type": "Person"}), now),
            Err(SchemaOrgError::NotProfilePage)
        ));
        assert!(matches!(
            from_schema_org(&json!({"@type": "ProfilePage", "mainEntity": {"@type": "Thing"}}), now),
            Err(SchemaOrgError::MissingPerson)
        ));
    }
}
