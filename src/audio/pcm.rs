//! Raw PCM decoding
//!
//! Interprets bytes as interleaved little-endian 16-bit signed samples and
//! splits them into normalized float channels.

use std::io::Cursor;
use ndarray::Array1;
use crate::audio::buffer::DecodedAudioBuffer;
use crate::audio::wav::WavHeader;
use crate::error::{VoiceoverError, Result};

pub const BYTES_PER_SAMPLE: usize = 2;

/// i16 -> f32 scale; maps [-32768, 32767] onto [-1.0, 0.99997].
pub const PCM_SCALE: f32 = 32768.0;

/// Sample format of an unframed PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    /// What the speech-generation service emits: 24 kHz mono.
    pub const SPEECH: PcmFormat = PcmFormat { sample_rate: 24000, channels: 1 };

    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self { sample_rate, channels }
    }

    pub fn frame_size(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(VoiceoverError::invalid_parameter("Sample rate must be greater than 0"));
        }
        if self.channels == 0 {
            return Err(VoiceoverError::invalid_parameter("Channel count must be at least 1"));
        }
        Ok(())
    }

    /// Checks that `len` bytes hold a whole number of frames.
    pub fn check_layout(&self, len: usize) -> Result<()> {
        if len % self.frame_size() != 0 {
            return Err(VoiceoverError::invalid_sample_layout(format!(
                "{} bytes is not a multiple of the {}-byte frame size ({} channel(s) of 16-bit samples)",
                len,
                self.frame_size(),
                self.channels
            )));
        }
        Ok(())
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// A decode capability for raw 16-bit PCM.
///
/// Every implementation must produce the same buffer for the same input.
pub trait PcmDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8], format: PcmFormat) -> Result<DecodedAudioBuffer>;
}

/// Pure-software decoder. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwarePcmDecoder;

impl PcmDecoder for SoftwarePcmDecoder {
    fn name(&self) -> &'static str {
        "software"
    }

    fn decode(&self, bytes: &[u8], format: PcmFormat) -> Result<DecodedAudioBuffer> {
        format.validate()?;
        format.check_layout(bytes.len())?;

        let channel_count = format.channels as usize;
        let frames = bytes.len() / format.frame_size();
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frames))
            .collect();

        for (i, chunk) in bytes.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            channels[i % channel_count].push(sample as f32 / PCM_SCALE);
        }

        Ok(DecodedAudioBuffer {
            sample_rate: format.sample_rate,
            channels: channels.into_iter().map(Array1::from).collect(),
        })
    }
}

/// Decoder that hands sample parsing to `hound`'s WAV reader.
///
/// The payload is framed with a canonical header in memory and read back
/// as a WAV stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoundPcmDecoder;

impl PcmDecoder for HoundPcmDecoder {
    fn name(&self) -> &'static str {
        "hound"
    }

    fn decode(&self, bytes: &[u8], format: PcmFormat) -> Result<DecodedAudioBuffer> {
        format.validate()?;
        format.check_layout(bytes.len())?;

        if bytes.is_empty() {
            return Ok(DecodedAudioBuffer::empty(format.sample_rate, format.channels));
        }

        let frames = bytes.len() / format.frame_size();
        let header = WavHeader::new(format.sample_rate, format.channels, frames)?;
        let mut framed = Vec::with_capacity(header.file_size());
        framed.extend_from_slice(&header.to_bytes());
        framed.extend_from_slice(bytes);

        let mut reader = hound::WavReader::new(Cursor::new(framed))
            .map_err(|e| VoiceoverError::malformed_input(format!("Cannot create WAV reader: {}", e)))?;

        let channel_count = format.channels as usize;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frames))
            .collect();

        for (i, sample) in reader.samples::<i16>().enumerate() {
            let sample = sample.map_err(|e| {
                VoiceoverError::malformed_input(format!("Failed to read sample: {}", e))
            })?;
            channels[i % channel_count].push(sample as f32 / PCM_SCALE);
        }

        Ok(DecodedAudioBuffer {
            sample_rate: format.sample_rate,
            channels: channels.into_iter().map(Array1::from).collect(),
        })
    }
}

/// Decode with the software decoder.
pub fn decode_pcm(bytes: &[u8], sample_rate: u32, channel_count: u16) -> Result<DecodedAudioBuffer> {
    SoftwarePcmDecoder.decode(bytes, PcmFormat::new(sample_rate, channel_count))
}
