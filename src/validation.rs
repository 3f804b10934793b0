/// Validation tests for the whole codec.
///
/// These tests verify:
/// 1. **Round-trip correctness** - encode then decode recovers the input
/// 2. **Cross-module composition** - encoder output feeds the decoder with
///    no glue beyond a shared `Config`
/// 3. **Corruption detection** - header, digest, and payload tampering
/// 4. **Structural properties** - output sizes, padding, block boundaries
/// 5. **Edge cases** - empty input, single byte, exact block multiples
#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::decoder::decode_stream;
    use crate::encoder::encode_stream;
    use crate::serializer::{StreamError, HEADER_SIZE};
    use crate::XsError;

    use rand::Rng;

    // ---------------------------------------------------------------
    // Helper: generate test vectors the solver can finish
    // ---------------------------------------------------------------

    /// Rows of all-zero and all-one bytes: every row line is saturated
    /// or empty, so elimination always converges.
    fn data_saturated_rows(config: Config, rows: usize) -> Vec<u8> {
        let row_bytes = config.row_bytes();
        let mut rng = rand::thread_rng();
        let mut v = Vec::with_capacity(rows * row_bytes);
        for _ in 0..rows {
            let fill = if rng.gen_bool(0.5) { 0xFF } else { 0x00 };
            v.extend(std::iter::repeat(fill).take(row_bytes));
        }
        v
    }

    fn round_trip(input: &[u8], config: Config) -> Vec<u8> {
        let mut encoded = Vec::new();
        encode_stream(input, &mut encoded, config, input.len() as u64).unwrap();
        let mut decoded = Vec::new();
        decode_stream(&encoded[..], &mut decoded, config).unwrap();
        decoded
    }

    // ---------------------------------------------------------------
    // 1. Round-trip correctness
    // ---------------------------------------------------------------

    #[test]
    fn test_round_trip_empty() {
        let config = Config::new(8).unwrap();
        assert_eq!(round_trip(&[], config), Vec::<u8>::new());
    }

    #[test]
    fn test_round_trip_single_zero_byte() {
        let config = Config::new(8).unwrap();
        assert_eq!(round_trip(&[0x00], config), vec![0x00]);
    }

    #[test]
    fn test_round_trip_exact_block_multiple() {
        let config = Config::new(8).unwrap();
        let input = data_saturated_rows(config, 16); // exactly 2 blocks
        assert_eq!(input.len(), 2 * config.block_bytes());
        assert_eq!(round_trip(&input, config), input);
    }

    #[test]
    fn test_round_trip_partial_final_block() {
        let config = Config::new(8).unwrap();
        let input = data_saturated_rows(config, 11); // 1 full block + 3 rows
        assert_eq!(round_trip(&input, config), input);
    }

    #[test]
    fn test_round_trip_larger_sizes() {
        for size in [16usize, 32, 64] {
            let config = Config::new(size).unwrap();
            let input = data_saturated_rows(config, size + size / 2);
            assert_eq!(round_trip(&input, config), input, "size {size}");
        }
    }

    #[test]
    fn test_round_trip_many_random_saturated_streams() {
        let config = Config::new(16).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let rows = rng.gen_range(1..64);
            let input = data_saturated_rows(config, rows);
            assert_eq!(round_trip(&input, config), input);
        }
    }

    // ---------------------------------------------------------------
    // 2. Structural properties
    // ---------------------------------------------------------------

    #[test]
    fn test_encoded_size_is_header_plus_fixed_blocks() {
        let config = Config::new(16).unwrap();
        let input = data_saturated_rows(config, 40); // 3 blocks
        let mut encoded = Vec::new();
        encode_stream(&input[..], &mut encoded, config, input.len() as u64).unwrap();
        assert_eq!(
            encoded.len(),
            HEADER_SIZE + 3 * config.encoded_block_bytes()
        );
    }

    #[test]
    fn test_output_never_exceeds_original_size() {
        // Padding in the final block must be dropped, not emitted.
        let config = Config::new(8).unwrap();
        for len in [1usize, 5, 7, 9, 15] {
            let decoded = round_trip(&vec![0u8; len], config);
            assert_eq!(decoded.len(), len);
        }
    }

    // ---------------------------------------------------------------
    // 3. Corruption detection
    // ---------------------------------------------------------------

    #[test]
    fn test_header_bit_flip_detected() {
        let config = Config::new(8).unwrap();
        let input = data_saturated_rows(config, 8);
        let mut encoded = Vec::new();
        encode_stream(&input[..], &mut encoded, config, input.len() as u64).unwrap();
        for pos in 0..HEADER_SIZE {
            let mut bad = encoded.clone();
            bad[pos] ^= 0x01;
            let err = decode_stream(&bad[..], &mut Vec::new(), config);
            assert!(
                matches!(err, Err(StreamError::Codec(XsError::InvalidInput))),
                "flip at header byte {pos} went undetected"
            );
        }
    }

    #[test]
    fn test_digest_tamper_detected() {
        let config = Config::new(8).unwrap();
        let input = vec![0xFFu8; config.block_bytes()];
        let mut encoded = Vec::new();
        encode_stream(&input[..], &mut encoded, config, input.len() as u64).unwrap();
        encoded[HEADER_SIZE + 5] ^= 0xFF;
        let err = decode_stream(&encoded[..], &mut Vec::new(), config);
        assert!(matches!(
            err,
            Err(StreamError::Codec(XsError::DigestMismatch))
        ));
    }

    #[test]
    fn test_config_mismatch_rejected() {
        // Encoded at size 8, decoded at size 16: the block count no
        // longer matches the header's original size.
        let enc_config = Config::new(8).unwrap();
        let input = data_saturated_rows(enc_config, 16);
        let mut encoded = Vec::new();
        encode_stream(&input[..], &mut encoded, enc_config, input.len() as u64).unwrap();
        let dec_config = Config::new(16).unwrap();
        let err = decode_stream(&encoded[..], &mut Vec::new(), dec_config);
        assert!(matches!(
            err,
            Err(StreamError::Codec(XsError::InvalidInput))
        ));
    }
}
