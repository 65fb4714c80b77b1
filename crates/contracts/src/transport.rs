//! Transport trait - Dispatcher network interface
//!
//! One call, one target, one response. Implementations are shared by all
//! workers of a run, so `send` takes `&self`.

use std::time::Duration;

use crate::{ContractError, Target};

/// What a successful transport call reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    /// Protocol status code (HTTP status for the HTTP transport)
    pub status: u16,
    /// Size of the response body in bytes
    pub body_size: u64,
}

/// Network call trait
///
/// All transport implementations must implement this trait.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Perform one request for `target`.
    ///
    /// `timeout` is the caller's budget for this call; the engine enforces it
    /// as well, so implementations may treat it as a hint.
    ///
    /// # Errors
    /// Returns a transport error describing why no response was obtained
    async fn send(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> Result<TransportResponse, ContractError>;
}
