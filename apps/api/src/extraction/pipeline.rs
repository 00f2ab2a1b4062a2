//! Extraction pipeline: the single entry point from raw text to a CV record.
//!
//! Flow: AI builder (only when a credential is configured) → on any failure,
//!       heuristic builder. Each stage runs at most once and strictly in order.
//!
//! The pipeline is total: callers never see an error, only a possibly sparse record.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::extraction::ai::AiCvBuilder;
use crate::extraction::heuristic::HeuristicCvBuilder;
use crate::models::cv::{CaptureSource, CvRecord, Locale};

/// One unit of extraction work.
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    pub raw_text: String,
    pub locale: Locale,
    pub source: CaptureSource,
    pub source_refs: Vec<String>,
}

/// Joins per-image OCR outputs in page order, separated by a blank line.
pub fn join_ocr_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref().trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Clone)]
pub struct ExtractionPipeline {
    ai: AiCvBuilder,
    heuristic: HeuristicCvBuilder,
}

impl ExtractionPipeline {
    pub fn new(ai: AiCvBuilder) -> Self {
        Self {
            ai,
            heuristic: HeuristicCvBuilder,
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_configured()
    }

    /// Runs the two-level fallback chain for `request`.
    ///
    /// Dropping the returned future cancels the in-flight completion call.
    pub async fn extract(&self, request: &ExtractRequest) -> CvRecord {
        self.extract_at(request, Utc::now()).await
    }

    pub(crate) async fn extract_at(&self, request: &ExtractRequest, now: DateTime<Utc>) -> CvRecord {
        debug!(
            text_len = request.raw_text.len(),
            locale = ?request.locale,
            source = ?request.source,
            "extraction requested"
        );

        if self.ai.is_configured() {
            match self
                .ai
                .build(
                    &request.raw_text,
                    request.locale,
                    request.source,
                    request.source_refs.clone(),
                    now,
                )
                .await
            {
                Ok(record) => {
                    info!(record_id = %record.id, "CV extracted via AI path");
                    return record;
                }
                Err(e) => warn!("AI extraction failed, falling back to heuristics: {e}"),
            }
        } else {
            debug!("AI path not configured, using heuristics");
        }

        let record = self.heuristic.build(
            &request.raw_text,
            request.source,
            request.source_refs.clone(),
            now,
        );
        info!(record_id = %record.id, "CV extracted via heuristic path");
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ai::tests::ScriptedBackend;
    use crate::llm_client::LlmError;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::time::Duration;

    const SCANNED_CV: &str = "name: John Smith\nEmail: john@x.com\nEducation\nMIT\n\
                              Bachelor of Science in Physics\n2010 - 2014\nSkills:\n• Python\n• Leadership";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 5, 9, 0, 0).unwrap()
    }

    fn request(text: &str) -> ExtractRequest {
        ExtractRequest {
            raw_text: text.to_string(),
            ..Default::default()
        }
    }

    fn pipeline_with(backend: Arc<ScriptedBackend>) -> ExtractionPipeline {
        ExtractionPipeline::new(AiCvBuilder::new(backend))
    }

    #[tokio::test]
    async fn test_ai_success_is_returned() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"personalInfo": {"fullName": "From AI"}, "abilities": ["Rust"]}"#,
        ));
        let record = pipeline_with(backend.clone())
            .extract_at(&request(SCANNED_CV), fixed_now())
            .await;
        assert_eq!(record.personal_info.full_name, "From AI");
        assert_eq!(record.abilities, vec!["Rust"]);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_ai_equals_heuristic_output() {
        let failures: Vec<Arc<ScriptedBackend>> = vec![
            Arc::new(ScriptedBackend::failing(|| LlmError::EmptyContent)),
            Arc::new(ScriptedBackend::failing(|| LlmError::Api {
                status: 500,
                message: "boom".into(),
            })),
            Arc::new(ScriptedBackend::replying("not json at all")),
            Arc::new(ScriptedBackend::replying(r#"{"education": []}"#)),
        ];
        let req = request(SCANNED_CV);
        let expected = HeuristicCvBuilder.build(&req.raw_text, req.source, vec![], fixed_now());

        for backend in failures {
            let record = pipeline_with(backend.clone()).extract_at(&req, fixed_now()).await;
            assert_eq!(record.content(), expected.content());
            assert_eq!(record.name, expected.name);
            assert_eq!(backend.call_count(), 1, "AI is attempted exactly once");
        }
    }

    #[tokio::test]
    async fn test_unconfigured_ai_goes_straight_to_heuristics() {
        let backend = Arc::new(ScriptedBackend::unconfigured());
        let pipeline = pipeline_with(backend.clone());
        assert!(!pipeline.ai_enabled());
        let record = pipeline.extract_at(&request(SCANNED_CV), fixed_now()).await;
        assert_eq!(record.personal_info.full_name, "John Smith");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pipeline_is_total_on_arbitrary_text() {
        let pipeline = pipeline_with(Arc::new(ScriptedBackend::unconfigured()));
        for text in ["", "   ", "\u{0}\u{7f}", "ñ", "🙂🙂🙂", "Education\nSkills\nExperience"] {
            let record = pipeline.extract(&request(text)).await;
            assert!(record.updated_at >= record.created_at);
        }
    }

    #[tokio::test]
    async fn test_voice_source_naming_flows_through() {
        let pipeline = pipeline_with(Arc::new(ScriptedBackend::unconfigured()));
        let req = ExtractRequest {
            raw_text: "write to me at a@b.co, thanks!".into(),
            locale: Locale::Es,
            source: CaptureSource::Voice,
            source_refs: vec!["note.wav".into()],
        };
        let record = pipeline.extract_at(&req, fixed_now()).await;
        assert_eq!(record.name, "Voice CV 20241105_090000");
        assert_eq!(record.source_references, vec!["note.wav"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_extraction_returns_nothing() {
        struct Stalled;

        #[async_trait::async_trait]
        impl crate::llm_client::CompletionBackend for Stalled {
            fn is_configured(&self) -> bool {
                true
            }

            async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("{}".into())
            }
        }

        let pipeline = ExtractionPipeline::new(AiCvBuilder::new(Arc::new(Stalled)));
        let req = request(SCANNED_CV);
        let outcome = tokio::time::timeout(Duration::from_secs(5), pipeline.extract(&req)).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_completion_timeout_falls_back_to_heuristics() {
        use crate::llm_client::{LlmClient, LlmConfig};

        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let client = LlmClient::new(LlmConfig {
            api_key: Some("sk-test".into()),
            api_url: format!("http://{addr}/v1/chat/completions"),
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        let pipeline = ExtractionPipeline::new(AiCvBuilder::new(Arc::new(client)));
        assert!(pipeline.ai_enabled());

        let req = request(SCANNED_CV);
        let expected = HeuristicCvBuilder.build(&req.raw_text, req.source, vec![], fixed_now());
        let record = tokio::time::timeout(Duration::from_secs(10), pipeline.extract_at(&req, fixed_now()))
            .await
            .expect("client timeout should end the AI attempt");

        assert_eq!(record.content(), expected.content());
        assert_eq!(record.name, "John Smith's CV");
        silent.abort();
    }

    #[test]
    fn test_join_ocr_pages() {
        let pages = ["  Jane Doe \n", "", "Education\nMIT"];
        assert_eq!(join_ocr_pages(&pages), "Jane Doe\n\nEducation\nMIT");
        assert_eq!(join_ocr_pages::<&str>(&[]), "");
    }
}
