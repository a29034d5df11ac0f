use std::fmt;
use thiserror::Error;

/// A SOAP fault reported by the service in place of a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    pub code: String,
    pub string: String,
    pub actor: Option<String>,
    /// Raw XML of the `detail` element, if present.
    pub detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum SoapError {
    #[error("Transport error")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}")]
    Http { status: u16, body: String },

    #[error("Attempt timed out")]
    Timeout,

    #[error("Call was cancelled")]
    Cancelled,

    #[error("SOAP fault: {0}")]
    Fault(Fault),

    #[error("Error serialising message: {0}")]
    Serialize(String),

    #[error("Error deserialising message: {0}")]
    Deserialize(String),

    #[error("Malformed SOAP envelope: {0}")]
    MalformedEnvelope(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.string)?;

        if let Some(actor) = &self.actor {
            write!(f, " (actor {})", actor)?;
        }

        Ok(())
    }
}

impl SoapError {
    /// Whether another attempt at the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SoapError::Transport(error) => error.is_connect() || error.is_timeout(),
            SoapError::Http { status, .. } => matches!(status, 408 | 429 | 502 | 503 | 504),
            SoapError::Timeout => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_and_throttling_statuses_are_transient() {
        for status in [408, 429, 502, 503, 504] {
            let error = SoapError::Http {
                status,
                body: String::new(),
            };
            assert!(error.is_transient(), "{} should be transient", status);
        }

        for status in [400, 401, 404, 500] {
            let error = SoapError::Http {
                status,
                body: String::new(),
            };
            assert!(!error.is_transient(), "{} should be terminal", status);
        }
    }

    #[test]
    fn faults_and_cancellation_are_terminal() {
        assert!(SoapError::Timeout.is_transient());
        assert!(!SoapError::Cancelled.is_transient());
        assert!(!SoapError::Fault(Fault::default()).is_transient());
        assert!(!SoapError::Deserialize("bad".into()).is_transient());
    }

    #[test]
    fn fault_display_includes_actor() {
        let fault = Fault {
            code: "soap:Server".into(),
            string: "boom".into(),
            actor: Some("urn:calc".into()),
            detail: None,
        };

        assert_eq!(fault.to_string(), "soap:Server: boom (actor urn:calc)");
    }
}
