use std::time::Duration;

use serde::Serialize;

/// Opening tag wrapped around every SSML request.
pub const SSML_PREFIX: &str = "<speak><amazon:auto-breaths>";

/// Closing tag wrapped around every SSML request.
pub const SSML_SUFFIX: &str = "</amazon:auto-breaths></speak>";

/// Output sample rate requested unless configured otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Largest response body accepted unless configured otherwise.
///
/// 64 MiB holds about 35 minutes of 16 kHz mono PCM.
pub const DEFAULT_MAX_AUDIO_BYTES: u64 = 64 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Speech service returned an odd number of PCM bytes ({0})")]
    InvalidAudio(usize),
    #[error("Speech service returned no audio for {0:?}")]
    EmptyAudio(String),
    #[error("Engine not open. Call open() first.")]
    NotOpen,
    #[error("Invalid engine config: {0}")]
    Config(String),
}

/// JSON body of a speech request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechRequest<'a> {
    text: &'a str,
    text_type: &'static str,
    voice_id: &'a str,
    output_format: &'static str,
    sample_rate: String,
}

/// Wrap plain prompt text in the SSML envelope sent to the service.
pub fn wrap_ssml(text: &str) -> String {
    format!("{SSML_PREFIX}{text}{SSML_SUFFIX}")
}

/// Blocking client for a speech endpoint that answers with raw 16-bit PCM.
pub struct SpeechClient {
    agent: ureq::Agent,
    endpoint: String,
    auth_token: Option<String>,
    max_audio_bytes: u64,
}

impl SpeechClient {
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        auth_token: Option<String>,
        max_audio_bytes: u64,
    ) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            endpoint: endpoint.to_string(),
            auth_token,
            max_audio_bytes,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request speech for `text` and return the PCM bytes of the response.
    ///
    /// Bodies larger than the configured limit fail with
    /// `ureq::Error::BodyExceedsLimit`.
    pub fn synthesize_pcm(
        &self,
        text: &str,
        voice: &str,
        sample_rate: u32,
        ssml: bool,
    ) -> Result<Vec<u8>, SynthesisError> {
        let wrapped;
        let (text, text_type) = if ssml {
            wrapped = wrap_ssml(text);
            (wrapped.as_str(), "ssml")
        } else {
            (text, "text")
        };

        let body = serde_json::to_string(&SpeechRequest {
            text,
            text_type,
            voice_id: voice,
            output_format: "pcm",
            sample_rate: sample_rate.to_string(),
        })
        .map_err(|e| SynthesisError::Config(format!("Failed to encode request: {e}")))?;

        let mut request = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = request.send(body)?;
        let audio = response
            .body_mut()
            .with_config()
            .limit(self.max_audio_bytes)
            .read_to_vec()?;
        log::debug!(
            "Speech service answered {} with {} bytes",
            response.status(),
            audio.len()
        );
        Ok(audio)
    }
}
