//! # sound-prompts
//!
//! Tooling for Asterisk-style sound prompt transcripts: parse `key: value`
//! transcript files into a CSV table, then synthesize one audio file per row
//! through a speech engine.
//!
//! ## Features
//!
//! - **Transcript parsing**: multi-line quoted and bracketed values, comments,
//!   duplicate detection
//! - **CSV tables**: `index,<language>` output, column selection for synthesis
//! - **HTTP synthesis**: remote speech API engine behind the `http` feature
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sound-prompts = { version = "2026.10", features = ["http"] }
//! ```
//!
//! ```ignore
//! use std::path::Path;
//! use sound_prompts::{tabular, transcript};
//!
//! let transcript = transcript::parse_file(Path::new("core-sounds-en.txt"))?;
//! tabular::write_table_file(Path::new("sounds.csv"), "english", &transcript.table)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod engines;
pub mod tabular;
pub mod transcript;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Container written for each synthesized prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// 16-bit PCM in a RIFF/WAV container.
    #[default]
    Wav,
    /// Headerless 16-bit little-endian PCM.
    Pcm,
}

impl AudioFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
        }
    }
}

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains mono 16-bit samples and the sample rate of the output audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Signed 16-bit mono samples
    pub samples: Vec<i16>,
    /// Sample rate of the audio (16000 by default)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Build a result from little-endian 16-bit PCM bytes.
    ///
    /// Returns `None` if the byte count is odd.
    pub fn from_pcm_le(bytes: &[u8], sample_rate: u32) -> Option<Self> {
        if bytes.len() % 2 != 0 {
            return None;
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Some(Self {
            samples,
            sample_rate,
        })
    }

    /// Write the audio to a 16-bit mono WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Write the samples as raw little-endian PCM.
    pub fn write_pcm(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = BufWriter::new(File::create(path)?);
        for &sample in &self.samples {
            out.write_all(&sample.to_le_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the audio in the given format.
    pub fn write(&self, path: &Path, format: AudioFormat) -> Result<(), Box<dyn std::error::Error>> {
        match format {
            AudioFormat::Wav => self.write_wav(path),
            AudioFormat::Pcm => self.write_pcm(path),
        }
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// Engines are opened with engine-specific parameters (endpoint, timeouts,
/// credentials) and then answer any number of synthesis requests.
pub trait SynthesisEngine {
    /// Parameters for a single request (voice, sample rate, etc.)
    type SynthesisParams;
    /// Parameters for opening the engine
    type EngineParams: Default;

    /// Open the engine using default parameters.
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.open_with_params(Self::EngineParams::default())
    }

    /// Open the engine with custom parameters.
    fn open_with_params(
        &mut self,
        params: Self::EngineParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Release any resources held by the engine.
    fn close(&mut self);

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech from the given text and write it to `path`.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        path: &Path,
        format: AudioFormat,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, params)?.write(path, format)
    }
}
