//! Full Link Control: the 9-byte FLCO/FID/dst/src payload, RS(12,9,4)
//! protected (with a per-data-type CRC mask) and then BPTC(196,96)
//! protected across a burst's two info halves.
//!
//! Grounded on `src/dmr/payload/lc.c`.

use crate::burst::slot_type::DataType;
use crate::constants::CRC_MASK_LC;
use crate::error::DmrError;
use crate::fec::{bptc196, rs12_9};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flco {
    GroupVoiceChannelUser,
    UnitToUnitVoiceChannelUser,
}

impl Flco {
    fn to_pdu(self) -> u8 {
        match self {
            Flco::GroupVoiceChannelUser => 0x00,
            Flco::UnitToUnitVoiceChannelUser => 0x03,
        }
    }

    fn from_pdu(value: u8) -> Self {
        match value & 0x3f {
            0x03 => Flco::UnitToUnitVoiceChannelUser,
            _ => Flco::GroupVoiceChannelUser,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullLc {
    pub flco: Flco,
    pub fid: u8,
    pub dst_id: u32,
    pub src_id: u32,
}

fn crc_mask(data_type: DataType) -> [u8; 3] {
    // Data types with no defined mask (MBCC, IDLE, and the voice-burst
    // types that never carry a full LC) fall back to unmasked, per
    // `dmr_crc_mask_lc`'s own "not required" entries.
    let byte = CRC_MASK_LC.get(data_type as usize).copied().unwrap_or(0);
    // The reference table stores a single XOR byte reused across all
    // three parity bytes, not three independent bytes.
    [byte, byte, byte]
}

impl FullLc {
    fn to_bytes(self) -> [u8; 9] {
        let mut bytes = [0u8; 9];
        bytes[0] = self.flco.to_pdu()
            | if matches!(self.flco, Flco::UnitToUnitVoiceChannelUser) {
                0x80
            } else {
                0x00
            };
        bytes[1] = self.fid;
        bytes[3] = (self.dst_id >> 16) as u8;
        bytes[4] = (self.dst_id >> 8) as u8;
        bytes[5] = self.dst_id as u8;
        bytes[6] = (self.src_id >> 16) as u8;
        bytes[7] = (self.src_id >> 8) as u8;
        bytes[8] = self.src_id as u8;
        bytes
    }

    fn from_bytes(bytes: &[u8; 9]) -> Self {
        Self {
            flco: Flco::from_pdu(bytes[0]),
            fid: bytes[1],
            dst_id: ((bytes[3] as u32) << 16) | ((bytes[4] as u32) << 8) | bytes[5] as u32,
            src_id: ((bytes[6] as u32) << 16) | ((bytes[7] as u32) << 8) | bytes[8] as u32,
        }
    }
}

/// Encodes `lc`'s 9 bytes into the 12-byte RS(12,9,4)-protected block
/// (parity masked by `data_type`), ready for BPTC(196,96) encoding.
pub fn encode_bytes(lc: FullLc, data_type: DataType) -> [u8; 12] {
    rs12_9::encode(&lc.to_bytes(), &crc_mask(data_type))
}

/// Encodes `lc` into 196 raw info bits, via RS(12,9,4) then BPTC(196,96).
pub fn encode(lc: FullLc, data_type: DataType) -> [bool; 196] {
    let bytes12 = encode_bytes(lc, data_type);
    let bits96 = crate::bits::unpack_bits(&bytes12);
    let mut data = [false; 96];
    data.copy_from_slice(&bits96[..96]);
    bptc196::encode(&data)
}

/// Decodes 196 raw info bits into a full LC, BPTC(196,96)-correcting then
/// RS(12,9,4)-correcting (after un-masking the parity by `data_type`).
pub fn decode(info: &[bool; 196], data_type: DataType) -> Result<FullLc, DmrError> {
    let data96 = bptc196::decode(info)?;
    let mut bytes12_bits = [false; 96];
    bytes12_bits.copy_from_slice(&data96);
    let packed = crate::bits::pack_bits(&bytes12_bits);
    let mut bytes12 = [0u8; 12];
    bytes12.copy_from_slice(&packed);

    let data9 = rs12_9::decode(&bytes12, &crc_mask(data_type))?;
    Ok(FullLc::from_bytes(&data9))
}
