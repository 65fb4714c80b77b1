//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Flow
//! - `Target` list in, one `Outcome` per dispatched target out
//! - `Transport` is the only network seam; everything else is pure data

mod blueprint;
mod delay;
mod dispatch_config;
mod error;
mod outcome;
mod target;
mod transport;

pub use blueprint::*;
pub use delay::{DelayMode, MAX_DELAY_SECS};
pub use dispatch_config::*;
pub use error::*;
pub use outcome::{Outcome, OutcomeKind};
pub use target::Target;
pub use transport::{LocalTransport, Transport, TransportResponse};
