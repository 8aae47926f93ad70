//! Voiceover Audio - speech payload to WAV conversion
//!
//! Decodes base64 payloads of raw 16-bit PCM and re-encodes them as
//! self-contained WAV files without an audio codec library.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;

pub use audio::{DecodedAudioBuffer, PcmDecoder, PcmFormat, WavContainer, WavHeader, decode_pcm, encode_wav};
pub use config::{Config, Args};
pub use error::{VoiceoverError, Result};
pub use pipeline::{VoiceoverPipeline, ConversionResult, payload_to_wav};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install the env_logger backend. `RUST_LOG` still takes precedence.
pub fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .parse_default_env()
        .try_init()
        .ok();
}
