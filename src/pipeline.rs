//! Payload-to-WAV conversion pipeline
//!
//! Base64 decode, then PCM decode, then WAV encode. Each stage consumes only
//! its predecessor's output.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use log::{debug, trace};
use crate::audio::{payload, encode_wav, PcmDecoder, PcmFormat, SoftwarePcmDecoder, WavContainer};
use crate::config::Config;
use crate::error::{VoiceoverError, Result};

pub struct VoiceoverPipeline {
    format: PcmFormat,
    decoder: Box<dyn PcmDecoder>,
}

impl std::fmt::Debug for VoiceoverPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceoverPipeline")
            .field("format", &self.format)
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub frames: usize,
    pub duration_seconds: f64,
    pub output_bytes: usize,
    pub processing_time_seconds: f64,
}

impl Default for VoiceoverPipeline {
    fn default() -> Self {
        Self::new(PcmFormat::SPEECH, Box::new(SoftwarePcmDecoder))
    }
}

impl VoiceoverPipeline {
    pub fn new(format: PcmFormat, decoder: Box<dyn PcmDecoder>) -> Self {
        Self { format, decoder }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.pcm_format(), config.decoder.backend.create_decoder()))
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Convert one base64 payload into a WAV container.
    pub fn convert(&self, encoded: &str) -> Result<WavContainer> {
        trace!("Payload: {} chars, ~{} bytes", encoded.len(), payload::decoded_len(encoded));

        let bytes = payload::decode(encoded)?;
        debug!("Decoded payload: {} bytes", bytes.len());

        let audio = self.decoder.decode(&bytes, self.format)?;
        debug!(
            "Decoded PCM with {} decoder: {} frames, {} channel(s), {:.3}s",
            self.decoder.name(),
            audio.num_frames(),
            audio.channel_count(),
            audio.duration()
        );

        let wav = encode_wav(&audio)?;
        debug!("Encoded WAV: {} bytes", wav.len());
        Ok(wav)
    }

    /// Read a payload from `input` (`-` for stdin), write the WAV to `output`.
    pub fn process_file(&self, input_path: &Path, output_path: &Path) -> Result<ConversionResult> {
        let start_time = Instant::now();

        let encoded = read_payload(input_path)?;
        let wav = self.convert(&encoded)?;
        wav.save_to_file(output_path)?;
        debug!("Saved: {}", output_path.display());

        let header = wav.header();
        Ok(ConversionResult {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            frames: header.num_frames(),
            duration_seconds: header.duration_secs(),
            output_bytes: wav.len(),
            processing_time_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}

/// Read a payload file, or stdin when the path is `-`. Surrounding
/// whitespace is dropped.
pub fn read_payload(path: &Path) -> Result<String> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => VoiceoverError::malformed_input(format!(
                "Payload {} is not valid UTF-8 text", path.display()
            )),
            _ => VoiceoverError::Io(e),
        })?
    };
    Ok(raw.trim().to_string())
}

/// Convert a 24 kHz mono speech payload with the software decoder.
pub fn payload_to_wav(encoded: &str) -> Result<WavContainer> {
    VoiceoverPipeline::default().convert(encoded)
}
