//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `http` - remote speech API returning 16-bit PCM (enabled by default)

#[cfg(feature = "http")]
pub mod http;
