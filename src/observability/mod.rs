//! Observability
//!
//! Structured engine events emitted through the `log` facade.

pub mod audit;
