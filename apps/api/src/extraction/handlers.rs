//! Axum route handlers for the Extraction API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::pipeline::{join_ocr_pages, ExtractRequest};
use crate::models::cv::{CaptureSource, CvRecord, Locale};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
    pub raw_text: Option<String>,
    /// Per-image OCR outputs, in page order.
    pub pages: Option<Vec<String>>,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub source: CaptureSource,
    #[serde(default)]
    pub source_refs: Vec<String>,
}

impl ExtractBody {
    fn into_request(self) -> Result<ExtractRequest, AppError> {
        let raw_text = match (self.raw_text, self.pages) {
            (None, None) => {
                return Err(AppError::Validation(
                    "Provide raw_text or pages to extract from.".to_string(),
                ))
            }
            (Some(text), None) => text,
            (None, Some(pages)) => join_ocr_pages(&pages),
            (Some(text), Some(pages)) => join_ocr_pages(&[text, join_ocr_pages(&pages)]),
        };
        Ok(ExtractRequest {
            raw_text,
            locale: self.locale,
            source: self.source,
            source_refs: self.source_refs,
        })
    }
}

/// POST /api/v1/cv/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(body): Json<ExtractBody>,
) -> Result<Json<CvRecord>, AppError> {
    let request = body.into_request()?;
    let record = state.pipeline.extract(&request).await;
    Ok(Json(record))
}
