use reqwest::header::CONTENT_TYPE;
use std::{future::Future, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{
    config::{ClientConfig, RetryPolicy},
    envelope::{Envelope, SoapResponse},
    error::SoapError,
};

/// Cooperative cancellation shared between a caller and in-flight calls.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

/// Async SOAP transport with per-attempt timeouts and bounded retries.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);

        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called on any clone of this token.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender is owned by `self`, so the channel stays open while waiting.
        receiver.wait_for(|cancelled| *cancelled).await.ok();
    }
}

/// Runs `operation` until it succeeds, fails terminally or exhausts the
/// policy. Cancellation is observed while an attempt is running and while
/// backing off.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut operation: F,
) -> Result<T, SoapError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SoapError>>,
{
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(SoapError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SoapError::Cancelled),
            result = operation(attempt) => result,
        };

        match result {
            Ok(value) => return Ok(value),

            Err(error) if error.is_transient() && attempt < policy.max_retries => {
                let delay = policy.backoff(attempt);
                warn!(attempt = attempt + 1, ?delay, %error, "transient SOAP failure, retrying");

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SoapError::Cancelled),
                    _ = tokio::time::sleep(delay) => (),
                }

                attempt += 1;
            }

            Err(error) => return Err(error),
        }
    }
}

impl SoapClient {
    pub fn new(config: ClientConfig) -> Result<Self, SoapError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn dispatch(
        &self,
        action: &str,
        envelope: Envelope,
        cancel: &CancelToken,
    ) -> Result<SoapResponse, SoapError> {
        let body = envelope.to_xml();
        debug!(action, endpoint = %self.config.endpoint, "dispatching SOAP call");

        with_retry(&self.config.retry, cancel, |_| self.attempt(action, &body)).await
    }

    async fn attempt(&self, action: &str, body: &str) -> Result<SoapResponse, SoapError> {
        let send = async {
            let response = self
                .http
                .post(&self.config.endpoint)
                .header("SOAPAction", format!("\"{}\"", action))
                .header(CONTENT_TYPE, "text/xml; charset=utf-8")
                .body(body.to_owned())
                .send()
                .await?;

            let status = response.status().as_u16();
            let text = response.text().await?;
            SoapResponse::from_http(status, text)
        };

        match tokio::time::timeout(self.config.attempt_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(SoapError::Timeout),
        }
    }
}
