use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    error::{NotesError, Result},
    service::GenerationService,
    types::GenerationRequest,
};

pub(crate) enum Reply {
    Text(Option<String>),
    Api(u16),
    /// Never resolves.
    Hang,
}

/// In-process stand-in for the generation service.
pub(crate) struct MockService {
    reply: Reply,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockService {
    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::new(Reply::Text(Some(text.to_string())))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for MockService {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Api(status) => Err(NotesError::Api {
                status: *status,
                body: "mock failure".to_string(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub(crate) const PHOTOSYNTHESIS_REPLY: &str = r#"{"summary":"Plants convert light to energy.","keyPoints":["Light energy to chemical energy"],"examQuestions":["What is photosynthesis?"]}"#;
