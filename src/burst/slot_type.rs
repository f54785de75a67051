//! The Golay(20,8)-protected slot type: a 4-bit color code and a 4-bit
//! data type, carried at burst byte offsets 12, 13, 19 and 20.
//!
//! Grounded on `dmr_slot_type_encode`/`dmr_slot_type_decode` in
//! `src/dmr/packet.c`.

use crate::error::DmrError;
use crate::fec::golay;

/// The slot-type data type field (Table 9.5 DATA TYPE), also used to
/// index [`crate::constants::CRC_MASK_LC`] when the data type carries a
/// full LC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    PrivacyIndicator = 0,
    VoiceLc = 1,
    TerminatorWithLc = 2,
    Csbk = 3,
    MultiBlockControl = 4,
    MultiBlockControlCont = 5,
    Data = 6,
    Rate12Data = 7,
    Rate34Data = 8,
    Idle = 9,
    VoiceBurstA = 10,
    VoiceBurstB = 11,
    VoiceBurstC = 12,
    VoiceBurstD = 13,
    VoiceBurstE = 14,
    VoiceBurstF = 15,
}

impl DataType {
    pub fn from_u8(value: u8) -> Result<Self, DmrError> {
        Ok(match value {
            0 => DataType::PrivacyIndicator,
            1 => DataType::VoiceLc,
            2 => DataType::TerminatorWithLc,
            3 => DataType::Csbk,
            4 => DataType::MultiBlockControl,
            5 => DataType::MultiBlockControlCont,
            6 => DataType::Data,
            7 => DataType::Rate12Data,
            8 => DataType::Rate34Data,
            9 => DataType::Idle,
            10 => DataType::VoiceBurstA,
            11 => DataType::VoiceBurstB,
            12 => DataType::VoiceBurstC,
            13 => DataType::VoiceBurstD,
            14 => DataType::VoiceBurstE,
            15 => DataType::VoiceBurstF,
            other => {
                return Err(DmrError::InvalidArgument(format!(
                    "data type 0x{other:02x} out of range"
                )))
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotType {
    pub color_code: u8,
    pub data_type: DataType,
}

/// Extracts the slot type's 3 Golay-coded bytes from burst offsets
/// 12, 13, 19 and 20, per Table E.1's transmit bit order.
fn extract(raw: &[u8]) -> [u8; 3] {
    [
        (raw[12] << 2) & 0xfc | (raw[13] >> 6) & 0x03,
        (raw[13] << 2) & 0xc0 | (raw[19] << 2) & 0xf0 | (raw[20] >> 6) & 0x03,
        (raw[20] << 2) & 0xf0,
    ]
}

/// Decodes and Golay-corrects the slot type.
pub fn decode(raw: &[u8]) -> Result<SlotType, DmrError> {
    let bytes = extract(raw);
    // `bytes` packs the 20-bit Golay codeword top-aligned in 24 bits (the
    // low 4 bits of bytes[2] are always zero); golay::decode wants the
    // 20 bits bottom-aligned.
    let codeword =
        (((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32) >> 4;
    let code = golay::decode(codeword)?;
    Ok(SlotType {
        color_code: (code & 0xf0) >> 4,
        data_type: DataType::from_u8(code & 0x0f)?,
    })
}

/// Encodes `slot` into `raw`'s slot-type bytes, OR-ed into whatever is
/// already present, per `dmr_slot_type_encode`.
pub fn encode(raw: &mut [u8], slot: SlotType) -> Result<(), DmrError> {
    if !(1..=15).contains(&slot.color_code) {
        return Err(DmrError::InvalidArgument(format!(
            "color code {} out of range 1..=15",
            slot.color_code
        )));
    }
    let data = (slot.color_code << 4) | (slot.data_type as u8 & 0x0f);
    // Top-align the 20-bit codeword into the 24-bit 3-byte field the
    // nibble-packing below expects (low 4 bits of the last byte unused).
    let codeword = golay::encode(data) << 4;
    let bytes = [
        ((codeword >> 16) & 0xff) as u8,
        ((codeword >> 8) & 0xff) as u8,
        (codeword & 0xff) as u8,
    ];

    raw[12] = (raw[12] & 0xc0) | ((bytes[0] >> 2) & 0x3f);
    raw[13] = (raw[13] & 0x0f) | ((bytes[0] << 6) & 0xc0) | ((bytes[1] >> 2) & 0x30);
    raw[19] = (raw[19] & 0xf0) | ((bytes[1] >> 2) & 0x0f);
    raw[20] = (raw[20] & 0x03) | ((bytes[1] << 6) & 0xc0) | ((bytes[2] >> 2) & 0x3c);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BURST_BYTES;

    #[test]
    fn every_data_type_round_trips() {
        for dt in 1..=11u8 {
            let mut raw = [0u8; BURST_BYTES];
            let slot = SlotType {
                color_code: 1,
                data_type: DataType::from_u8(dt).unwrap(),
            };
            encode(&mut raw, slot).unwrap();
            assert_eq!(decode(&raw).unwrap(), slot, "data type {dt}");
        }
    }

    #[test]
    fn color_code_zero_is_rejected() {
        let mut raw = [0u8; BURST_BYTES];
        let slot = SlotType {
            color_code: 0,
            data_type: DataType::Idle,
        };
        assert!(encode(&mut raw, slot).is_err());
    }
}
