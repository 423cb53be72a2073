use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{AudioFormat, SynthesisEngine, SynthesisResult};

use super::client::{SpeechClient, SynthesisError, DEFAULT_MAX_AUDIO_BYTES, DEFAULT_SAMPLE_RATE};

/// Parameters for opening an [`HttpEngine`].
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct HttpEngineParams {
    /// URL the speech requests are POSTed to.
    pub endpoint: String,
    /// Global timeout for one request, in seconds.
    pub timeout_secs: u64,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[builder(setter(into, strip_option))]
    pub auth_token: Option<String>,
    /// Largest accepted audio response, in bytes.
    pub max_audio_bytes: u64,
}

impl Default for HttpEngineParams {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/speech".to_string(),
            timeout_secs: 30,
            auth_token: None,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

/// Parameters for a single speech request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpInferenceParams {
    /// Voice identifier understood by the service.
    pub voice: String,
    /// Requested PCM sample rate in Hz.
    pub sample_rate: u32,
    /// Wrap the text in the auto-breaths SSML envelope.
    pub ssml: bool,
}

impl Default for HttpInferenceParams {
    fn default() -> Self {
        Self {
            voice: "Vicki".to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            ssml: true,
        }
    }
}

/// Complete synthesis configuration as stored in a JSON file.
///
/// ```json
/// {
///   "engine": { "endpoint": "https://speech.example.com/v1/speech", "timeout_secs": 20 },
///   "request": { "voice": "Vicki", "sample_rate": 16000 },
///   "format": "wav"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub engine: HttpEngineParams,
    pub request: HttpInferenceParams,
    pub format: AudioFormat,
}

impl HttpConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SynthesisError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SynthesisError::Config(format!("Failed to parse {}: {e}", path.display())))
    }
}

/// Speech engine backed by a remote HTTP API.
///
/// The service receives a JSON body with `Text`, `TextType`, `VoiceId`,
/// `OutputFormat` and `SampleRate` fields and answers with headerless 16-bit
/// little-endian mono PCM.
///
/// ```rust,no_run
/// use sound_prompts::{SynthesisEngine, engines::http::{HttpEngine, HttpEngineParamsBuilder}};
///
/// let mut engine = HttpEngine::new();
/// engine.open_with_params(
///     HttpEngineParamsBuilder::default()
///         .endpoint("https://speech.example.com/v1/speech")
///         .timeout_secs(10u64)
///         .build()?,
/// )?;
/// let result = engine.synthesize("Hello, world!", None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpEngine {
    client: Option<SpeechClient>,
}

impl Default for HttpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpEngine {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

impl Drop for HttpEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl SynthesisEngine for HttpEngine {
    type SynthesisParams = HttpInferenceParams;
    type EngineParams = HttpEngineParams;

    fn open_with_params(
        &mut self,
        params: Self::EngineParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if params.endpoint.is_empty() {
            return Err(SynthesisError::Config("endpoint must not be empty".to_string()).into());
        }
        log::info!(
            "Using speech endpoint {} (timeout {}s)",
            params.endpoint,
            params.timeout_secs
        );
        self.client = Some(SpeechClient::new(
            &params.endpoint,
            Duration::from_secs(params.timeout_secs),
            params.auth_token,
            params.max_audio_bytes,
        ));
        Ok(())
    }

    fn close(&mut self) {
        self.client = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let client = self.client.as_ref().ok_or(SynthesisError::NotOpen)?;

        let p = params.unwrap_or_default();
        let pcm = client.synthesize_pcm(text, &p.voice, p.sample_rate, p.ssml)?;
        if pcm.is_empty() {
            return Err(SynthesisError::EmptyAudio(text.to_string()).into());
        }

        let result = SynthesisResult::from_pcm_le(&pcm, p.sample_rate)
            .ok_or(SynthesisError::InvalidAudio(pcm.len()))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serve exactly one request and return its body.
    fn one_shot_server(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/speech", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let header_end = loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length: usize = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: audio/pcm\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();

            String::from_utf8(request[header_end..].to_vec()).unwrap()
        });

        (url, handle)
    }

    fn open_engine(url: &str) -> HttpEngine {
        open_engine_with_limit(url, DEFAULT_MAX_AUDIO_BYTES)
    }

    fn open_engine_with_limit(url: &str, max_audio_bytes: u64) -> HttpEngine {
        let mut engine = HttpEngine::new();
        engine
            .open_with_params(
                HttpEngineParamsBuilder::default()
                    .endpoint(url)
                    .timeout_secs(5u64)
                    .max_audio_bytes(max_audio_bytes)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        engine
    }

    #[test]
    fn synthesizes_pcm_from_service() {
        let (url, server) = one_shot_server("200 OK", vec![0x10, 0x00, 0xf0, 0xff]);
        let mut engine = open_engine(&url);

        let result = engine.synthesize("Hello", None).unwrap();
        assert_eq!(result.samples, vec![16, -16]);
        assert_eq!(result.sample_rate, 16000);

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(
            sent["Text"],
            "<speak><amazon:auto-breaths>Hello</amazon:auto-breaths></speak>"
        );
        assert_eq!(sent["TextType"], "ssml");
        assert_eq!(sent["VoiceId"], "Vicki");
        assert_eq!(sent["SampleRate"], "16000");
    }

    #[test]
    fn plain_text_request_is_not_wrapped() {
        let (url, server) = one_shot_server("200 OK", vec![0, 0]);
        let mut engine = open_engine(&url);

        let params = HttpInferenceParams {
            voice: "Hans".to_string(),
            sample_rate: 8000,
            ssml: false,
        };
        let result = engine.synthesize("Hallo", Some(params)).unwrap();
        assert_eq!(result.sample_rate, 8000);

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["Text"], "Hallo");
        assert_eq!(sent["TextType"], "text");
        assert_eq!(sent["VoiceId"], "Hans");
    }

    #[test]
    fn error_status_is_reported() {
        let (url, server) = one_shot_server("500 Internal Server Error", Vec::new());
        let mut engine = open_engine(&url);

        assert!(engine.synthesize("Hello", None).is_err());
        server.join().unwrap();
    }

    #[test]
    fn odd_length_audio_is_rejected() {
        let (url, server) = one_shot_server("200 OK", vec![0, 0, 0]);
        let mut engine = open_engine(&url);

        let err = engine.synthesize("Hello", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SynthesisError>(),
            Some(SynthesisError::InvalidAudio(3))
        ));
        server.join().unwrap();
    }

    #[test]
    fn oversized_audio_is_rejected() {
        let (url, server) = one_shot_server("200 OK", vec![0; 8]);
        let mut engine = open_engine_with_limit(&url, 4);

        let err = engine.synthesize("Hello", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SynthesisError>(),
            Some(SynthesisError::Http(ureq::Error::BodyExceedsLimit(_)))
        ));
        let _ = server.join();
    }

    #[test]
    fn audio_limit_defaults_above_ten_megabytes() {
        let params = HttpEngineParams::default();
        assert_eq!(params.max_audio_bytes, DEFAULT_MAX_AUDIO_BYTES);
        assert!(params.max_audio_bytes > 10 * 1024 * 1024);
    }

    #[test]
    fn synthesize_requires_open_engine() {
        let mut engine = HttpEngine::new();
        let err = engine.synthesize("Hello", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SynthesisError>(),
            Some(SynthesisError::NotOpen)
        ));
    }

    #[test]
    fn config_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"engine": {{"endpoint": "https://speech.example.com"}}, "format": "pcm"}}"#
        )
        .unwrap();

        let config = HttpConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.engine.endpoint, "https://speech.example.com");
        assert_eq!(config.engine.timeout_secs, 30);
        assert_eq!(config.request.voice, "Vicki");
        assert_eq!(config.format, AudioFormat::Pcm);
    }
}
