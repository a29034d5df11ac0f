use std::{fmt, str::FromStr, sync::Arc};

use super::binding::{HeaderPolicy, ReservedNamePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One file per generated module.
    #[default]
    MultiFile,
    /// Every module inline in `src/lib.rs`.
    SingleFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Async `reqwest` transport with timeouts, retries and cancellation.
    #[default]
    Http,
    /// Blocking transport, one attempt per call.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub namespace: String,
    pub layout: Layout,
    pub transport: Transport,
    pub header_policy: Arc<dyn HeaderPolicy>,
}

impl GeneratorOptions {
    pub fn new<S: Into<String>>(namespace: S) -> Self {
        Self {
            namespace: namespace.into(),
            layout: Layout::default(),
            transport: Transport::default(),
            header_policy: Arc::new(ReservedNamePolicy::default()),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_header_policy<P: HeaderPolicy + 'static>(mut self, policy: P) -> Self {
        self.header_policy = Arc::new(policy);
        self
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Transport::Http),
            "legacy" => Ok(Transport::Legacy),
            other => Err(format!("unknown transport `{}`, expected `http` or `legacy`", other)),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Http => write!(f, "http"),
            Transport::Legacy => write!(f, "legacy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<Transport>(), Ok(Transport::Http));
        assert_eq!("legacy".parse::<Transport>(), Ok(Transport::Legacy));
        assert!("grpc".parse::<Transport>().is_err());
    }

    #[test]
    fn builder_defaults() {
        let options = GeneratorOptions::new("calculator").with_layout(Layout::SingleFile);

        assert_eq!(options.namespace, "calculator");
        assert_eq!(options.layout, Layout::SingleFile);
        assert_eq!(options.transport, Transport::Http);
    }
}
