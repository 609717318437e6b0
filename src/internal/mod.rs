//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Raw memory-mapped register primitives and ZAP bit fields
//! - [`constants`]: Driver-wide sizes and timing values
//! - [`logging`]: Feature-gated logging macros

pub(crate) mod constants;
pub(crate) mod logging;
pub(crate) mod register;
