//! Deterministic completion stub that records every request.

use std::sync::Mutex;

use kba_core::{AppError, AppResult};
use kba_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

type Responder = Box<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

pub(crate) struct StubClient {
    responder: Responder,
    requests: Mutex<Vec<LlmRequest>>,
}

impl StubClient {
    pub(crate) fn with<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    pub(crate) fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::with(move |_| Err(AppError::Llm(message.clone())))
    }

    pub(crate) fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for StubClient {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let content = (self.responder)(request)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
