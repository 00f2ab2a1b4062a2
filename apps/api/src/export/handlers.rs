//! Axum route handlers for Schema.org export and import.

use axum::Json;
use chrono::Utc;
use serde_json::Value;

use crate::errors::AppError;
use crate::export::schema_org::{from_schema_org, to_schema_org};
use crate::models::cv::CvRecord;

/// POST /api/v1/cv/export/schema-org
pub async fn handle_export_schema_org(Json(record): Json<CvRecord>) -> Json<Value> {
    Json(to_schema_org(&record))
}

/// POST /api/v1/cv/import/schema-org
pub async fn handle_import_schema_org(Json(doc): Json<Value>) -> Result<Json<CvRecord>, AppError> {
    from_schema_org(&doc, Utc::now())
        .map(Json)
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))
}
