//! Utility types and functions for UEFormat.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the [`EngineToYUp`] coordinate bridge
//! - [`reshape`] - flat stream to fixed-width row conversion

mod error;
mod math;
pub mod reshape;

pub use error::*;
pub use math::*;
