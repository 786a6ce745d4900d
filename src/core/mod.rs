//! Core types shared across the build pipeline.
//!
//! Currently this is the error taxonomy; see [`error`] for the
//! [`WpackError`] enum and the user-facing [`ErrorContext`] wrapper.

pub mod error;

pub use error::{ErrorContext, WpackError, user_friendly_error};
