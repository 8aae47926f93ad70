//! Base64 payload decoding
//!
//! Speech payloads arrive as standard-alphabet base64 with no framing. Both
//! padded and unpadded input are accepted; anything else outside the alphabet
//! is rejected.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use crate::error::{VoiceoverError, Result};

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 payload into raw bytes. Empty input yields an empty buffer.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    PAYLOAD_ENGINE
        .decode(input)
        .map_err(|e| VoiceoverError::malformed_input(format!("Invalid base64 payload: {}", e)))
}

/// Exact decoded length for a well-formed payload, without decoding it.
pub fn decoded_len(input: &str) -> usize {
    let unpadded = input.trim_end_matches('=').len();
    unpadded * 3 / 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn test_decode_empty() {
        assert!(decode("").unwrap().is_empty());
        assert_eq!(decoded_len(""), 0);
    }

    #[test]
    fn test_decode_scenario_payload() {
        // 0, 32767, -32768 as little-endian int16
        let bytes = decode("AAD/fwCA").unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80]);
    }

    #[test]
    fn test_padded_and_unpadded_accepted() {
        assert_eq!(decode("AQI=").unwrap(), vec![0x01, 0x02]);
        assert_eq!(decode("AQI").unwrap(), vec![0x01, 0x02]);
        assert_eq!(decode("AQ==").unwrap(), vec![0x01]);
        assert_eq!(decode("AQ").unwrap(), vec![0x01]);
    }

    #[test]
    fn test_rejects_characters_outside_alphabet() {
        for bad in ["AA#A", "AA-_", "AA A", "AAAA\n", "ÄAAA"] {
            match decode(bad) {
                Err(VoiceoverError::MalformedInput { .. }) => {}
                other => panic!("Expected MalformedInput for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_rejects_misplaced_padding_and_bad_length() {
        assert!(decode("A=AA").is_err());
        assert!(decode("A").is_err());
        assert!(decode("AAAAA").is_err());
    }

    #[test]
    fn test_reference_encoder_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 0..64usize {
            let bytes: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
            assert_eq!(decode(&STANDARD.encode(&bytes)).unwrap(), bytes);
            assert_eq!(decode(&STANDARD_NO_PAD.encode(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_decoded_len_matches_decode() {
        for len in 0..16usize {
            let encoded = STANDARD.encode(vec![0xABu8; len]);
            assert_eq!(decoded_len(&encoded), len);
        }
    }
}
