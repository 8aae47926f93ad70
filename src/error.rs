//! Error Types

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum VoiceoverError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Invalid sample layout: {message}")]
    InvalidSampleLayout { message: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Inconsistent channel length: channel {channel} has {actual} samples, expected {expected}")]
    InconsistentChannelLength {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoiceoverError {
    pub fn malformed_input<S: Into<String>>(msg: S) -> Self { Self::MalformedInput { message: msg.into() } }
    pub fn invalid_sample_layout<S: Into<String>>(msg: S) -> Self { Self::InvalidSampleLayout { message: msg.into() } }
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self { Self::InvalidParameter { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
}

pub type Result<T> = std::result::Result<T, VoiceoverError>;
