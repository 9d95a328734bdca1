//! Payload Checksums

/// Sum of all bytes, widened to 32 bits.
///
/// Cannot wrap for inputs shorter than 16 MiB; beyond that it saturates at
/// `u32::MAX` instead of wrapping.
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| acc.saturating_add(u32::from(b)))
}

/// Sum of all bytes modulo 2^16.
///
/// Bit-compatible with the 16-bit accumulator used by legacy ECU firmware.
/// Wraparound is the intended behavior here.
pub fn legacy_checksum16(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(legacy_checksum16(&[]), 0);
    }

    #[test]
    fn test_small_sum() {
        let data = [0x41, 0x0C, 0x1A, 0x2B];
        assert_eq!(checksum(&data), 0x41 + 0x0C + 0x1A + 0x2B);
        assert_eq!(legacy_checksum16(&data), 0x41 + 0x0C + 0x1A + 0x2B);
    }

    #[test]
    fn test_no_wraparound_past_16_bits() {
        // 300 * 255 = 76500, which overflows a u16 accumulator
        let data = vec![0xFF; 300];
        assert_eq!(checksum(&data), 76_500);
        assert_eq!(legacy_checksum16(&data), (76_500u32 % 65_536) as u16);
    }

    proptest! {
        #[test]
        fn prop_legacy_is_widened_mod_2_16(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let wide = checksum(&data);
            prop_assert_eq!(u32::from(legacy_checksum16(&data)), wide % 65_536);
        }
    }
}
