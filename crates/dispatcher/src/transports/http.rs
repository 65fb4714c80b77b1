//! HttpTransport - GET each target with a shared reqwest client

use std::error::Error as StdError;
use std::time::Duration;

use contracts::{ContractError, HttpSection, Target, Transport, TransportResponse};
use reqwest::redirect::Policy;
use tracing::{debug, instrument};

use crate::error::DispatchError;

/// Configuration for HttpTransport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Overrides reqwest's default User-Agent
    pub user_agent: Option<String>,
    pub follow_redirects: bool,
    pub accept_invalid_certs: bool,
    /// Client-wide ceiling; each request also carries the engine timeout
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            follow_redirects: true,
            accept_invalid_certs: false,
            timeout: contracts::DEFAULT_TIMEOUT,
        }
    }
}

impl HttpTransportConfig {
    /// Build from the `[http]` config section
    pub fn from_section(section: &HttpSection, timeout: Duration) -> Self {
        Self {
            user_agent: section.user_agent.clone(),
            follow_redirects: section.follow_redirects,
            accept_invalid_certs: section.accept_invalid_certs,
            timeout,
        }
    }
}

/// Transport that issues one HTTP GET per target and reads the full body.
///
/// The client is built once and shared by every worker.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    name: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(name: impl Into<String>, config: &HttpTransportConfig) -> Result<Self, DispatchError> {
        let name = name.into();
        let redirect = if config.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| DispatchError::transport_build(&name, describe(&e)))?;

        debug!(
            transport = %name,
            follow_redirects = config.follow_redirects,
            accept_invalid_certs = config.accept_invalid_certs,
            "HttpTransport ready"
        );

        Ok(Self { name, client })
    }

    fn map_error(&self, err: reqwest::Error, timeout: Duration) -> ContractError {
        if err.is_timeout() {
            ContractError::transport_timeout(timeout)
        } else {
            ContractError::transport_request(&self.name, describe(&err))
        }
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_transport_send",
        skip(self, timeout),
        fields(transport = %self.name, target = %target)
    )]
    async fn send(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> Result<TransportResponse, ContractError> {
        let response = self
            .client
            .get(target.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(e, timeout))?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(TransportResponse {
            status,
            body_size: body.len() as u64,
        })
    }
}

/// reqwest's top-level message hides the cause; flatten the source chain.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
