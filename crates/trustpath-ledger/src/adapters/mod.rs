//! Concrete [`LedgerSource`](crate::LedgerSource) implementations.

pub mod memory;
