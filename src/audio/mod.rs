//! Audio Processing Module
//!
//! Base64 payload decoding, raw 16-bit PCM interpretation, and WAV container
//! encoding.

pub mod buffer;
pub mod payload;
pub mod pcm;
pub mod wav;

pub use buffer::DecodedAudioBuffer;
pub use pcm::{PcmDecoder, PcmFormat, SoftwarePcmDecoder, HoundPcmDecoder, decode_pcm};
pub use wav::{WavContainer, WavHeader, encode_wav, WAV_HEADER_LEN, WAV_MIME_TYPE};
