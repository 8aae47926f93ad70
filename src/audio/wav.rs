//! WAV container encoding
//!
//! Writes canonical 44-byte RIFF/WAVE PCM headers by hand; no codec library
//! is involved on the encode path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::audio::buffer::DecodedAudioBuffer;
use crate::error::{VoiceoverError, Result};

pub const WAV_HEADER_LEN: usize = 44;
pub const WAV_MIME_TYPE: &str = "audio/wav";

const PCM_FORMAT_TAG: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const FMT_CHUNK_SIZE: u32 = 16;

/// BlockAlign is a u16, so at most this many 16-bit channels fit in a frame.
pub const MAX_CHANNELS: u16 = u16::MAX / 2;

fn fits_header(sample_rate: u32, channels: u16) -> bool {
    channels <= MAX_CHANNELS && sample_rate.checked_mul(channels as u32 * 2).is_some()
}

/// Fields of a canonical PCM WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub data_size: u32,
}

impl WavHeader {
    pub fn new(sample_rate: u32, channels: u16, num_frames: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VoiceoverError::invalid_parameter("Sample rate cannot be 0"));
        }
        if channels == 0 {
            return Err(VoiceoverError::invalid_parameter("Channel count cannot be 0"));
        }
        if !fits_header(sample_rate, channels) {
            return Err(VoiceoverError::invalid_parameter(format!(
                "{} Hz with {} channel(s) cannot be described by a WAV header",
                sample_rate, channels
            )));
        }

        // ChunkSize is 36 + data_size and must also fit in a u32.
        let data_size = num_frames
            .checked_mul(channels as usize * 2)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| n.checked_add(36).is_some())
            .ok_or_else(|| VoiceoverError::invalid_parameter(format!(
                "{} frames of {} channel(s) exceed the 4 GiB WAV size limit",
                num_frames, channels
            )))?;

        Ok(Self { channels, sample_rate, data_size })
    }

    pub fn for_buffer(audio: &DecodedAudioBuffer) -> Result<Self> {
        audio.validate()?;
        Self::new(audio.sample_rate, audio.channel_count() as u16, audio.num_frames())
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    pub fn chunk_size(&self) -> u32 {
        self.data_size.saturating_add(36)
    }

    pub fn file_size(&self) -> usize {
        WAV_HEADER_LEN + self.data_size as usize
    }

    pub fn num_frames(&self) -> usize {
        self.data_size as usize / self.block_align() as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];

        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.chunk_size().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");

        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        out[20..22].copy_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());

        out
    }

    /// Parse the header of a canonical 16-bit PCM WAV byte stream.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(VoiceoverError::malformed_input(format!(
                "WAV data too short: {} bytes, header needs {}",
                bytes.len(),
                WAV_HEADER_LEN
            )));
        }

        let tag = |offset: usize, expected: &[u8; 4]| -> Result<()> {
            if &bytes[offset..offset + 4] != expected {
                return Err(VoiceoverError::malformed_input(format!(
                    "Expected {:?} at offset {}",
                    String::from_utf8_lossy(expected),
                    offset
                )));
            }
            Ok(())
        };
        let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
        };

        tag(0, b"RIFF")?;
        tag(8, b"WAVE")?;
        tag(12, b"fmt ")?;
        tag(36, b"data")?;

        if u32_at(16) != FMT_CHUNK_SIZE {
            return Err(VoiceoverError::malformed_input(format!(
                "Unsupported fmt chunk size: {}", u32_at(16)
            )));
        }
        if u16_at(20) != PCM_FORMAT_TAG {
            return Err(VoiceoverError::malformed_input(format!(
                "Unsupported audio format: {}", u16_at(20)
            )));
        }
        if u16_at(34) != BITS_PER_SAMPLE {
            return Err(VoiceoverError::malformed_input(format!(
                "Unsupported bit depth: {}", u16_at(34)
            )));
        }

        let channels = u16_at(22);
        let sample_rate = u32_at(24);
        let data_size = u32_at(40);
        if channels == 0 || sample_rate == 0 || !fits_header(sample_rate, channels) {
            return Err(VoiceoverError::malformed_input(format!(
                "Unsupported channel count {} at {} Hz", channels, sample_rate
            )));
        }

        if data_size.checked_add(36) != Some(u32_at(4)) {
            return Err(VoiceoverError::malformed_input(format!(
                "RIFF chunk size {} does not match data size {}", u32_at(4), data_size
            )));
        }

        let header = Self { channels, sample_rate, data_size };
        if u32_at(28) != header.byte_rate()
            || u16_at(32) != header.block_align()
        {
            return Err(VoiceoverError::malformed_input("Inconsistent WAV header sizes"));
        }
        if data_size % header.block_align() as u32 != 0 {
            return Err(VoiceoverError::malformed_input(
                "Data size is not a whole number of frames"
            ));
        }

        Ok(header)
    }
}

/// A complete WAV file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    header: WavHeader,
    bytes: Vec<u8>,
}

impl WavContainer {
    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The interleaved sample bytes after the header.
    pub fn pcm_bytes(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

/// Float sample to 16-bit PCM: clamp to [-1, 1], scale by 32768, round,
/// saturate to the i16 range. Non-finite samples become silence.
pub fn sample_to_i16(sample: f32) -> i16 {
    if !sample.is_finite() {
        return 0;
    }
    let scaled = (sample.clamp(-1.0, 1.0) * 32768.0).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Encode decoded audio into a canonical 16-bit PCM WAV container.
pub fn encode_wav(audio: &DecodedAudioBuffer) -> Result<WavContainer> {
    let header = WavHeader::for_buffer(audio)?;

    let mut bytes = Vec::with_capacity(header.file_size());
    bytes.extend_from_slice(&header.to_bytes());

    for frame in 0..audio.num_frames() {
        for channel in &audio.channels {
            bytes.extend_from_slice(&sample_to_i16(channel[frame]).to_le_bytes());
        }
    }

    Ok(WavContainer { header, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use tempfile::NamedTempFile;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_layout() {
        let audio = DecodedAudioBuffer::new(
            44100,
            vec![Array1::from(vec![0.0; 10]), Array1::from(vec![0.0; 10])],
        ).unwrap();
        let wav = encode_wav(&audio).unwrap();
        let bytes = wav.as_bytes();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(bytes, 4), 36 + 40);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(bytes, 16), 16);
        assert_eq!(u16_at(bytes, 20), 1);
        assert_eq!(u16_at(bytes, 22), 2);
        assert_eq!(u32_at(bytes, 24), 44100);
        assert_eq!(u32_at(bytes, 28), 44100 * 2 * 2);
        assert_eq!(u16_at(bytes, 32), 4);
        assert_eq!(u16_at(bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(bytes, 40), 40);
        assert_eq!(bytes.len(), 84);
    }

    #[test]
    fn test_scenario_encoding() {
        let audio = DecodedAudioBuffer::new_mono(
            24000,
            Array1::from(vec![0.0, 32767.0 / 32768.0, -1.0]),
        );
        let wav = encode_wav(&audio).unwrap();

        assert_eq!(wav.len(), 50);
        assert_eq!(u32_at(wav.as_bytes(), 40), 6);
        assert_eq!(wav.pcm_bytes(), &[0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80]);
        assert_eq!(wav.mime_type(), "audio/wav");
    }

    #[test]
    fn test_empty_buffer_encodes_header_only() {
        let wav = encode_wav(&DecodedAudioBuffer::empty(24000, 1)).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert!(wav.pcm_bytes().is_empty());
        assert_eq!(u32_at(wav.as_bytes(), 4), 36);
        assert_eq!(u32_at(wav.as_bytes(), 40), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(sample_to_i16(1.5), 32767);
        assert_eq!(sample_to_i16(-1.5), -32768);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(-1.0), -32768);
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(0.5), 16384);
        assert_eq!(sample_to_i16(f32::NAN), 0);
        assert_eq!(sample_to_i16(f32::INFINITY), 0);
    }

    #[test]
    fn test_every_i16_survives_scale_and_back() {
        for s in i16::MIN..=i16::MAX {
            assert_eq!(sample_to_i16(s as f32 / 32768.0), s);
        }
    }

    #[test]
    fn test_stereo_interleave_order() {
        let audio = DecodedAudioBuffer::new(
            24000,
            vec![
                Array1::from(vec![1.0 / 32768.0, 3.0 / 32768.0]),
                Array1::from(vec![2.0 / 32768.0, 4.0 / 32768.0]),
            ],
        ).unwrap();
        let wav = encode_wav(&audio).unwrap();
        assert_eq!(wav.pcm_bytes(), &[1, 0, 2, 0, 3, 0, 4, 0]);
    }

    #[test]
    fn test_ragged_channels_rejected() {
        let audio = DecodedAudioBuffer {
            sample_rate: 24000,
            channels: vec![Array1::from(vec![0.0, 0.0]), Array1::from(vec![0.0])],
        };
        assert!(matches!(
            encode_wav(&audio),
            Err(VoiceoverError::InconsistentChannelLength { .. })
        ));
    }

    #[test]
    fn test_header_size_limit() {
        assert!(WavHeader::new(24000, 1, (u32::MAX / 2) as usize).is_err());
        assert!(WavHeader::new(24000, 1, 1000).is_ok());
        assert!(WavHeader::new(0, 1, 10).is_err());
        assert!(WavHeader::new(24000, 0, 10).is_err());
        assert!(WavHeader::new(24000, MAX_CHANNELS + 1, 0).is_err());
        assert!(WavHeader::new(u32::MAX, 2, 0).is_err());
    }

    #[test]
    fn test_header_parse() {
        let header = WavHeader::new(24000, 2, 12000).unwrap();
        let parsed = WavHeader::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.num_frames(), 12000);
        assert!((parsed.duration_secs() - 0.5).abs() < f64::EPSILON);

        let mut bad = header.to_bytes();
        bad[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(WavHeader::parse(&bad), Err(VoiceoverError::MalformedInput { .. })));

        let mut bad = header.to_bytes();
        bad[34] = 24;
        assert!(WavHeader::parse(&bad).is_err());

        let mut bad = header.to_bytes();
        bad[4] ^= 0x01;
        assert!(WavHeader::parse(&bad).is_err());

        assert!(WavHeader::parse(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_header_parse_rejects_data_size_overflow() {
        let mut bytes = WavHeader::new(24000, 1, 10).unwrap().to_bytes();
        bytes[40..44].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());
        assert!(matches!(WavHeader::parse(&bytes), Err(VoiceoverError::MalformedInput { .. })));

        // Chunk size wrapped around to match the oversized data chunk
        bytes[4..8].copy_from_slice(&0xFFFF_FFFEu32.wrapping_add(36).to_le_bytes());
        assert!(matches!(WavHeader::parse(&bytes), Err(VoiceoverError::MalformedInput { .. })));

        let header = WavHeader { channels: 1, sample_rate: 24000, data_size: 0xFFFF_FFFE };
        assert_eq!(header.chunk_size(), u32::MAX);
    }

    #[test]
    fn test_wav_readable_by_hound() {
        let data = Array1::from(vec![0.1, -0.2, 0.3, -0.4, 0.5]);
        let audio = DecodedAudioBuffer::new_mono(16000, data.clone());
        let wav = encode_wav(&audio).unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        wav.save_to_file(temp_file.path()).unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), data.len());
        for (loaded, original) in samples.iter().zip(data.iter()) {
            assert!((*loaded as f32 / 32768.0 - original).abs() < 1e-4);
        }
    }

    #[test]
    fn test_write_to_sink() {
        let wav = encode_wav(&DecodedAudioBuffer::new_mono(8000, Array1::from(vec![0.25]))).unwrap();
        let mut sink = Vec::new();
        wav.write_to(&mut sink).unwrap();
        assert_eq!(sink, wav.clone().into_bytes());
    }
}
