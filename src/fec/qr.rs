//! Quadratic Residue(16,7,6) code used to protect the EMB field.
//!
//! Parity generation follows `dmrfec/quadres_16_7.c` in the reference
//! implementation verbatim (the nine XOR equations below). Decoding
//! precomputes the 128 legal data→parity mappings at init and verifies
//! by table equality, also per the reference; single-bit correction is
//! added on top (required by the testable property for this code) by
//! searching the same table against each of the 16 possible single-bit
//! flips.

use crate::error::DmrError;
use once_cell::sync::Lazy;

/// Precomputed table of the 9-bit parity value for every possible 7-bit
/// data value (index = data value 0..127).
static VALID_PARITY: Lazy<[u16; 128]> = Lazy::new(|| {
    let mut table = [0u16; 128];
    for (data, entry) in table.iter_mut().enumerate() {
        *entry = parity_bits(data as u8);
    }
    table
});

/// Computes the 9 parity bits for a 7-bit data value, per the DMR AI
/// spec generator matrix.
fn parity_bits(data: u8) -> u16 {
    let b = |i: u8| -> bool { (data >> (6 - i)) & 1 != 0 };
    let p = [
        b(1) ^ b(2) ^ b(3) ^ b(4),
        b(2) ^ b(3) ^ b(4) ^ b(5),
        b(0) ^ b(3) ^ b(4) ^ b(5) ^ b(6),
        b(2) ^ b(3) ^ b(5) ^ b(6),
        b(1) ^ b(2) ^ b(6),
        b(0) ^ b(1) ^ b(4),
        b(0) ^ b(1) ^ b(2) ^ b(5),
        b(0) ^ b(1) ^ b(2) ^ b(3) ^ b(6),
        b(0) ^ b(2) ^ b(4) ^ b(5) ^ b(6),
    ];
    p.iter().fold(0u16, |acc, &bit| (acc << 1) | bit as u16)
}

/// Encodes a 7-bit data value into the 16-bit codeword (7 data bits
/// followed by 9 parity bits, MSB first), as it would be packed into 2
/// bytes with the MSB of the second byte reserved/unused.
pub fn encode(data: u8) -> u16 {
    let data = data & 0x7f;
    ((data as u16) << 9) | parity_bits(data)
}

/// Decodes a 16-bit codeword, correcting a single-bit error if present.
pub fn decode(codeword: u16) -> Result<u8, DmrError> {
    let data = ((codeword >> 9) & 0x7f) as u8;
    let parity = codeword & 0x1ff;
    if VALID_PARITY[data as usize] == parity {
        return Ok(data);
    }

    for bit in 0..16 {
        let flipped = codeword ^ (1 << (15 - bit));
        let candidate_data = ((flipped >> 9) & 0x7f) as u8;
        let candidate_parity = flipped & 0x1ff;
        if VALID_PARITY[candidate_data as usize] == candidate_parity {
            return Ok(candidate_data);
        }
    }
    Err(DmrError::FecUncorrectable("qr_16_7"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_7bit_value_round_trips() {
        for v in 0..128u8 {
            let codeword = encode(v);
            assert_eq!(decode(codeword).unwrap(), v);
        }
    }

    #[test]
    fn single_bit_flip_is_corrected() {
        for v in 0..128u8 {
            let codeword = encode(v);
            for bit in 0..16 {
                let flipped = codeword ^ (1 << bit);
                assert_eq!(decode(flipped).unwrap(), v, "value {v} flip at bit {bit}");
            }
        }
    }
}
