use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

use super::{
    config::ClientConfig,
    envelope::{Envelope, SoapResponse},
    error::SoapError,
};

/// Synchronous transport: one attempt per call, bounded by a per-call timeout.
#[derive(Debug, Clone)]
pub struct BlockingSoapClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl BlockingSoapClient {
    pub fn new(config: ClientConfig) -> Result<Self, SoapError> {
        Ok(Self {
            http: reqwest::blocking::Client::builder().build()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `timeout` overrides the configured attempt timeout for this call.
    pub fn call(
        &self,
        action: &str,
        envelope: Envelope,
        timeout: Option<Duration>,
    ) -> Result<SoapResponse, SoapError> {
        debug!(action, endpoint = %self.config.endpoint, "calling SOAP operation");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("SOAPAction", format!("\"{}\"", action))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .timeout(timeout.unwrap_or(self.config.attempt_timeout))
            .body(envelope.to_xml())
            .send()
            .map_err(|error| {
                if error.is_timeout() {
                    SoapError::Timeout
                } else {
                    SoapError::Transport(error)
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text()?;
        SoapResponse::from_http(status, text)
    }
}
