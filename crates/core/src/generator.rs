use std::{future::Future, sync::Arc, time::Duration};

use tracing::Instrument;
use uuid::Uuid;

use crate::{
    decode::decode_study_notes,
    error::{NotesError, Result},
    prompt::{build_prompt, study_notes_schema},
    service::GenerationService,
    types::{GenerationRequest, ListPolicy, NotesRequest, StudyNotes},
};

/// Turns raw lecture notes into [`StudyNotes`] with one call to the
/// injected [`GenerationService`].
///
/// Cloning is cheap; clones share the same service.
#[derive(Clone)]
pub struct NotesGenerator {
    service: Arc<dyn GenerationService>,
    model: String,
    timeout: Option<Duration>,
    list_policy: ListPolicy,
}

impl NotesGenerator {
    pub fn new(service: Arc<dyn GenerationService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
            timeout: None,
            list_policy: ListPolicy::default(),
        }
    }

    /// Default timeout for requests that do not carry their own.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_list_policy(mut self, list_policy: ListPolicy) -> Self {
        self.list_policy = list_policy;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate study notes for `notes`. The text is sent as-is.
    pub async fn generate(&self, notes: &str) -> Result<StudyNotes> {
        self.generate_request(NotesRequest::new(notes)).await
    }

    pub async fn generate_request(&self, request: NotesRequest) -> Result<StudyNotes> {
        let span = tracing::info_span!(
            "generate_notes",
            request_id = %Uuid::new_v4(),
            model = %self.model,
            chars = request.notes.len(),
        );

        async move {
            let generation = GenerationRequest {
                model: self.model.clone(),
                prompt: build_prompt(&request.notes),
                schema: study_notes_schema(),
            };
            let timeout = request.timeout.or(self.timeout);
            let cancel = request.cancel.unwrap_or_default();

            let text = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("generation cancelled by caller");
                    return Err(NotesError::Cancelled);
                }
                result = bounded(self.service.generate_text(&generation), timeout) => result?,
            };

            let text = text
                .filter(|text| !text.is_empty())
                .ok_or(NotesError::EmptyResponse)?;
            let notes = self.list_policy.apply(decode_study_notes(&text)?)?;

            tracing::debug!(
                key_points = notes.key_points.len(),
                exam_questions = notes.exam_questions.len(),
                "study notes decoded"
            );
            Ok(notes)
        }
        .instrument(span)
        .await
    }
}

async fn bounded<T>(
    call: impl Future<Output = Result<T>>,
    timeout: Option<Duration>,
) -> Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| NotesError::Timeout(limit))?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::testing::{MockService, PHOTOSYNTHESIS_REPLY, Reply};

    fn generator(service: &Arc<MockService>) -> NotesGenerator {
        NotesGenerator::new(service.clone(), "test-model")
    }

    #[tokio::test]
    async fn returns_service_structure_unchanged() {
        let service = Arc::new(MockService::text(PHOTOSYNTHESIS_REPLY));
        let notes = generator(&service)
            .generate("Photosynthesis converts light into chemical energy.")
            .await
            .unwrap();

        assert_eq!(
            notes,
            StudyNotes {
                summary: "Plants convert light to energy.".to_string(),
                key_points: vec!["Light energy to chemical energy".to_string()],
                exam_questions: vec!["What is photosynthesis?".to_string()],
            }
        );
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn sends_prompt_schema_and_model() {
        let service = Arc::new(MockService::text(PHOTOSYNTHESIS_REPLY));
        generator(&service).generate("Cells divide.").await.unwrap();

        let request = service.last_request().unwrap();
        assert_eq!(request.model, "test-model");
        assert!(request.prompt.ends_with("Lecture Notes:\nCells divide."));
        assert_eq!(request.schema, study_notes_schema());
    }

    #[tokio::test]
    async fn missing_text_is_empty_response() {
        for reply in [Reply::Text(None), Reply::Text(Some(String::new()))] {
            let service = Arc::new(MockService::new(reply));
            let err = generator(&service).generate("notes").await.unwrap_err();
            assert!(matches!(err, NotesError::EmptyResponse));
        }
    }

    #[tokio::test]
    async fn non_json_text_is_parse_error() {
        let service = Arc::new(MockService::text("Sure! Here are your notes."));
        let err = generator(&service).generate("notes").await.unwrap_err();
        assert!(matches!(err, NotesError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_field_is_not_defaulted() {
        let service = Arc::new(MockService::text(r#"{"summary":"x","examQuestions":[]}"#));
        let err = generator(&service).generate("notes").await.unwrap_err();
        assert!(matches!(err, NotesError::MissingField { field: "keyPoints" }));
    }

    #[tokio::test]
    async fn service_errors_propagate() {
        let service = Arc::new(MockService::new(Reply::Api(429)));
        let err = generator(&service).generate("notes").await.unwrap_err();
        assert!(matches!(err, NotesError::Api { status: 429, .. }));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn list_policy_is_applied_after_decoding() {
        let service = Arc::new(MockService::text(
            r#"{"summary":"x","keyPoints":["a"],"examQuestions":["b"]}"#,
        ));
        let err = generator(&service)
            .with_list_policy(ListPolicy::Strict)
            .generate("notes")
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::ListLength { field: "keyPoints", .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn request_timeout_overrides_default() {
        let service = Arc::new(MockService::new(Reply::Hang));
        let generator = generator(&service).with_timeout(Some(Duration::from_secs(600)));

        let err = generator
            .generate_request(NotesRequest::new("notes").with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::Timeout(limit) if limit == Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn default_timeout_applies() {
        let service = Arc::new(MockService::new(Reply::Hang));
        let err = generator(&service)
            .with_timeout(Some(Duration::from_secs(30)))
            .generate("notes")
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::Timeout(_)));
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let service = Arc::new(MockService::new(Reply::Hang));
        let cancel = CancellationToken::new();
        let generator = generator(&service);

        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                generator
                    .generate_request(NotesRequest::new("notes").with_cancel(cancel))
                    .await
            }
        });
        tokio::task::yield_now().await;
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, NotesError::Cancelled));
    }

    #[tokio::test]
    async fn already_cancelled_request_issues_no_call() {
        let service = Arc::new(MockService::text(PHOTOSYNTHESIS_REPLY));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = generator(&service)
            .generate_request(NotesRequest::new("notes").with_cancel(cancel))
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::Cancelled));
        assert_eq!(service.calls(), 0);
    }
}
