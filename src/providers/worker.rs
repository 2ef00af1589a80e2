use crate::error::ProviderError;
use crate::providers::ChatProvider;
use log::{debug, error, info};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WORKER_THREAD_NAME: &str = "nova-request";

/// A provider request running on a background worker thread
///
/// The worker owns a current-thread tokio runtime for the duration of the call
/// and delivers exactly one result over the channel. Dropping the handle
/// abandons the result; the worker's send then fails silently.
#[derive(Debug)]
pub struct PendingRequest {
    receiver: Receiver<Result<String, ProviderError>>,
    started: Instant,
}

impl PendingRequest {
    /// Spawn a worker that sends `prompt` to `provider`
    pub fn spawn(provider: Arc<dyn ChatProvider>, prompt: String) -> Result<Self, ProviderError> {
        let (sender, receiver) = mpsc::channel();
        let provider_name = provider.name().to_string();

        thread::Builder::new()
            // The provider name comes from the config file and may hold a NUL
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let start_time = Instant::now();
                let result = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt.block_on(provider.generate(&prompt)),
                    Err(e) => Err(ProviderError::WorkerError(format!(
                        "Failed to start runtime: {}",
                        e
                    ))),
                };

                match &result {
                    Ok(reply) => info!(
                        "{} request completed in {:?} ({} chars)",
                        provider_name,
                        start_time.elapsed(),
                        reply.len()
                    ),
                    Err(e) => error!(
                        "{} request failed after {:?}: {}",
                        provider_name,
                        start_time.elapsed(),
                        e
                    ),
                }

                if sender.send(result).is_err() {
                    debug!("Request result dropped, window already closed");
                }
            })
            .map_err(|e| ProviderError::WorkerError(e.to_string()))?;

        Ok(Self {
            receiver,
            started: Instant::now(),
        })
    }

    /// When the request was issued
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Time since the request was issued
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Non-blocking check for the worker's result
    ///
    /// Returns `None` while the request is still running. A worker that exits
    /// without replying is reported as a [`ProviderError::WorkerError`].
    pub fn try_result(&self) -> Option<Result<String, ProviderError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ProviderError::WorkerError(
                "Request worker exited without a reply".to_string(),
            ))),
        }
    }
}
