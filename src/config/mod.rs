//! Configuration
//!
//! Engine configuration, named presets, and startup validation.

pub mod presets;
pub mod types;
pub mod validator;
