use crate::error::ProviderError;
use crate::providers::ChatProvider;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted provider for tests
///
/// Returns the same result for every call and records each prompt it sees.
pub struct MockProvider {
    response: Result<String, ProviderError>,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    /// Create a mock that always answers with `text`
    pub fn reply(text: &str) -> Self {
        Self::with_response(Ok(text.to_string()))
    }

    /// Create a mock that always fails with `error`
    pub fn error(error: ProviderError) -> Self {
        Self::with_response(Err(error))
    }

    pub fn with_response(response: Result<String, ProviderError>) -> Self {
        Self {
            response,
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Delay every reply by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            *self.call_count.lock().unwrap() += 1;
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.response.clone()
        })
    }
}
