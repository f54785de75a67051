//! Embedded signalling (EMB): the QR(16,7,6)-protected color
//! code/PI/LCSS triplet carried in every voice burst, and the VBPTC(16,11)
//! super-frame used to smuggle a full LC across bursts B-F.
//!
//! Grounded on `src/dmr/payload/emb.c`.

use crate::error::DmrError;
use crate::fec::{qr, vbptc16_11::Vbptc1611};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lcss {
    SingleFragment = 0,
    FirstFragment = 1,
    LastFragment = 2,
    Continuation = 3,
}

impl Lcss {
    fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0 => Lcss::SingleFragment,
            1 => Lcss::FirstFragment,
            2 => Lcss::LastFragment,
            _ => Lcss::Continuation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emb {
    pub color_code: u8,
    pub pi: bool,
    pub lcss: Lcss,
}

/// Extracts and QR(16,7,6)-corrects the EMB from burst offsets 13/14 and
/// 18/19 (Table E.6: voice burst with embedded signalling fragment 1).
pub fn decode(raw: &[u8]) -> Result<Emb, DmrError> {
    let emb_bytes = [
        (raw[13] << 4) & 0xf0 | (raw[14] >> 4) & 0x0f,
        (raw[18] << 4) & 0xf0 | (raw[19] >> 4) & 0x0f,
    ];
    let codeword = ((emb_bytes[0] as u16) << 8) | emb_bytes[1] as u16;
    let data = qr::decode(codeword)?;

    Ok(Emb {
        color_code: data & 0x0f,
        pi: (data >> 4) & 1 != 0,
        lcss: Lcss::from_u8((data >> 5) & 0x03),
    })
}

/// QR(16,7,6)-encodes `emb` and writes it into burst offsets 13/14 and
/// 18/19, OR-ed into whatever is already present.
pub fn encode(raw: &mut [u8], emb: Emb) {
    let data = (emb.color_code & 0x0f) | ((emb.pi as u8) << 4) | ((emb.lcss as u8) << 5);
    let codeword = qr::encode(data);
    let bytes = [((codeword >> 8) & 0xff) as u8, (codeword & 0xff) as u8];

    raw[13] = (raw[13] & 0xf0) | (bytes[0] >> 4);
    raw[14] = (raw[14] & 0x0f) | (bytes[0] << 4);
    raw[18] = (raw[18] & 0xf0) | (bytes[1] >> 4);
    raw[19] = (raw[19] & 0x0f) | (bytes[1] << 4);
}

/// Writes one 32-bit fragment (of 4) of a VBPTC(16,11)-coded LC signalling
/// super-frame into burst offsets 14..19, then re-writes the EMB (the
/// color code/PI/LCSS triplet accompanying this fragment).
pub fn encode_lc_fragment(raw: &mut [u8], emb: Emb, vbptc: &Vbptc1611, fragment: u8) {
    let bits = vbptc.get_fragment(fragment as usize * 32, 32);
    let lc_bytes = crate::bits::pack_bits(&bits);

    raw[14] = (raw[14] & 0xf0) | (lc_bytes[0] >> 4);
    raw[15] = (lc_bytes[0] << 4) | (lc_bytes[1] >> 4);
    raw[16] = (lc_bytes[1] << 4) | (lc_bytes[2] >> 4);
    raw[17] = (lc_bytes[2] << 4) | (lc_bytes[3] >> 4);
    raw[18] = (lc_bytes[3] << 4) | (raw[18] >> 4);

    encode(raw, emb);
}

/// Checksummed signalling-LC bit block used to smuggle a full LC across
/// the B-F bursts of a voice super-frame: 9 data bytes (72 bits) plus a
/// 5-bit mod-31 checksum, interleaved at fixed positions before being fed
/// to the VBPTC(16,11) accumulator.
pub fn signalling_lc_bits(bytes: &[u8; 9]) -> [bool; 77] {
    let checksum = crate::crc::emb_lc_checksum(bytes);
    let checksum_bits: [bool; 5] = std::array::from_fn(|i| (checksum >> (4 - i)) & 1 != 0);
    let data_bits = crate::bits::unpack_bits(bytes);

    // Checksum bits land at fixed positions 32, 43, 54, 65, 76 among the
    // 72 data bits (Table E.6); every other position consumes the data
    // bits in order.
    let checksum_positions = [32usize, 43, 54, 65, 76];
    let mut interleaved = [false; 77];
    let mut data_idx = 0;
    let mut checksum_idx = 0;
    for (i, slot) in interleaved.iter_mut().enumerate() {
        if checksum_positions.contains(&i) {
            *slot = checksum_bits[checksum_idx];
            checksum_idx += 1;
        } else {
            *slot = data_bits[data_idx];
            data_idx += 1;
        }
    }
    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BURST_BYTES;

    #[test]
    fn emb_round_trips() {
        let emb = Emb {
            color_code: 7,
            pi: true,
            lcss: Lcss::FirstFragment,
        };
        let mut raw = [0u8; BURST_BYTES];
        encode(&mut raw, emb);
        assert_eq!(decode(&raw).unwrap(), emb);
    }

    #[test]
    fn signalling_lc_bits_places_checksum_at_fixed_offsets() {
        let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        let bits = signalling_lc_bits(&bytes);
        assert_eq!(bits.len(), 77);
    }
}
