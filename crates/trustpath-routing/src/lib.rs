//! Trustpath Routing: payment path resolution over trustlines.
//!
//! This crate provides:
//! - [`PathResolver`]: finds the routes by which a payer can deliver an
//!   amount of a quote asset, either directly from a balance (zero hops) or by
//!   crossing one trustline (one hop).
//! - [`Candidate`]: one such route, with the base asset and amount debited.
//! - [`price`]: exact, round-up conversion of quote amounts through a
//!   trustline's integer price ratio.

pub mod candidate;
pub mod error;
pub mod price;
pub mod resolver;

// Re-exports for convenience.
pub use candidate::{Candidate, Funding};
pub use error::RoutingError;
pub use price::{base_amount_for, convert, surcharge};
pub use resolver::{one_hop, zero_hop, PathResolver};
