//! Decoded audio held as normalized float samples per channel

use ndarray::Array1;
use crate::error::{VoiceoverError, Result};

/// Decoded audio: one `Array1<f32>` per channel, samples in [-1.0, 1.0].
///
/// Fields are public so callers can build buffers by hand; `validate` checks
/// the invariants the encoder relies on (non-zero rate, at least one channel,
/// all channels the same length).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudioBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Array1<f32>>,
}

impl DecodedAudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Array1<f32>>) -> Result<Self> {
        let buffer = Self { sample_rate, channels };
        buffer.validate()?;
        Ok(buffer)
    }

    pub fn new_mono(sample_rate: u32, data: Array1<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![data],
        }
    }

    /// Buffer with `channel_count` zero-length channels.
    pub fn empty(sample_rate: u32, channel_count: u16) -> Self {
        Self {
            sample_rate,
            channels: (0..channel_count).map(|_| Array1::zeros(0)).collect(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&Array1<f32>> {
        self.channels.get(index)
    }

    /// Frames per channel, taken from the first channel.
    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(VoiceoverError::invalid_parameter("Sample rate cannot be 0"));
        }

        if self.channels.is_empty() {
            return Err(VoiceoverError::invalid_parameter("Audio must have at least one channel"));
        }

        if self.channels.len() > u16::MAX as usize {
            return Err(VoiceoverError::invalid_parameter(
                format!("Too many channels: {}", self.channels.len())
            ));
        }

        let expected = self.num_frames();
        for (channel, data) in self.channels.iter().enumerate().skip(1) {
            if data.len() != expected {
                return Err(VoiceoverError::InconsistentChannelLength {
                    channel,
                    expected,
                    actual: data.len(),
                });
            }
        }

        Ok(())
    }
}
