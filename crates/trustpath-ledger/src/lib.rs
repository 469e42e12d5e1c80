//! Trustpath ledger access
//!
//! Defines how the resolver reads the payer's assets, balances and the
//! trustlines around an asset: the per-request [`Context`], the
//! [`LedgerSource`] trait, the [`LedgerError`] union, and an in-memory
//! ledger adapter.

pub mod adapters;
pub mod context;
pub mod error;
pub mod traits;

pub use adapters::memory::{MemoryLedger, Resource};
pub use context::Context;
pub use error::LedgerError;
pub use traits::LedgerSource;
