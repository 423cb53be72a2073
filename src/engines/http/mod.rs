//! Remote speech API engine.
//!
//! This module provides a synthesis engine that POSTs prompt text to an HTTP
//! speech service and receives raw 16-bit PCM back. Requests are wrapped in an
//! SSML `<amazon:auto-breaths>` envelope by default so long prompts get
//! natural breathing pauses.
//!
//! # Request Format
//!
//! ```text
//! POST <endpoint>
//! Content-Type: application/json
//! Authorization: Bearer <token>        (optional)
//!
//! {"Text": "<speak>...</speak>", "TextType": "ssml", "VoiceId": "Vicki",
//!  "OutputFormat": "pcm", "SampleRate": "16000"}
//! ```
//!
//! The response body is headerless little-endian mono PCM at the requested
//! sample rate.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sound_prompts::{AudioFormat, SynthesisEngine, engines::http::{HttpEngine, HttpInferenceParams}};
//! use std::path::PathBuf;
//!
//! let mut engine = HttpEngine::new();
//! engine.open()?;
//!
//! let params = HttpInferenceParams {
//!     voice: "Hans".to_string(),
//!     ..Default::default()
//! };
//!
//! engine.synthesize_to_file(
//!     "Bitte hinterlassen Sie eine Nachricht.",
//!     &PathBuf::from("vm-intro.wav"),
//!     AudioFormat::Wav,
//!     Some(params),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod engine;

pub use client::SynthesisError;
pub use engine::{
    HttpConfig, HttpEngine, HttpEngineParams, HttpEngineParamsBuilder, HttpInferenceParams,
};
