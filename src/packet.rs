//! The parsed packet: the inter-transport currency shared by the Homebrew
//! and MMDVM transports and the repeater core.
//!
//! Grounded on `dmr_parsed_packet` (`include/dmr/packet.h`) and the
//! slot-info/control-byte bit layouts in `protocol/homebrew.c` and
//! `protocol/mmdvm.c`.

use crate::burst::slot_type::DataType;
use crate::burst::Burst;
use crate::error::DmrError;

/// DMR's two TDMA timeslots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ts {
    Ts1 = 0,
    Ts2 = 1,
}

impl Ts {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 != 0 {
            Ts::Ts2
        } else {
            Ts::Ts1
        }
    }

    pub fn as_bit(self) -> u8 {
        self as u8
    }
}

/// Call type, as carried at the parsed-packet level (a coarser view than
/// [`crate::burst::full_lc::Flco`]'s PDU-level opcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flco {
    Group,
    Private,
    Invalid,
}

/// The parsed-packet's data type: either a voice burst (no slot type, the
/// burst carries a sync pattern instead), a voice-sync burst, or one of the
/// slot-type-carrying data bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDataType {
    Voice,
    VoiceSync,
    Slot(DataType),
}

impl ParsedDataType {
    /// Reconstructs a parsed data type from a slot-info/control nibble and
    /// a 2-bit type selector, per the Homebrew and MMDVM wire encodings:
    /// `0b00` voice, `0b01` voice-sync, `0b10` data (nibble carries the
    /// slot-type [`DataType`] ordinal).
    pub fn from_selector(selector: u8, nibble: u8) -> Result<Self, DmrError> {
        Ok(match selector & 0x03 {
            0x00 => ParsedDataType::Voice,
            0x01 => ParsedDataType::VoiceSync,
            _ => ParsedDataType::Slot(DataType::from_u8(nibble & 0x0f)?),
        })
    }

    /// The 2-bit type selector for this data type, per [`Self::from_selector`].
    pub fn selector(self) -> u8 {
        match self {
            ParsedDataType::Voice => 0x00,
            ParsedDataType::VoiceSync => 0x01,
            ParsedDataType::Slot(_) => 0x02,
        }
    }

    /// The nibble accompanying this data type on the wire: the voice-frame
    /// index for [`ParsedDataType::Voice`] (supplied by the caller, since
    /// it isn't carried by the data type itself), 0 for voice-sync, or the
    /// slot-type ordinal for a data burst.
    pub fn nibble(self, voice_frame: u8) -> u8 {
        match self {
            ParsedDataType::Voice => voice_frame & 0x0f,
            ParsedDataType::VoiceSync => 0,
            ParsedDataType::Slot(dt) => dt as u8,
        }
    }
}

/// The inter-transport currency: everything a transport or the repeater
/// core needs to know about one received burst, without re-decoding it.
#[derive(Clone, Copy)]
pub struct ParsedPacket {
    pub ts: Ts,
    pub flco: Flco,
    pub src_id: u32,
    pub dst_id: u32,
    pub repeater_id: u32,
    pub data_type: ParsedDataType,
    pub voice_frame: u8,
    pub color_code: u8,
    pub stream_id: u32,
    pub sequence: u8,
    pub burst: Burst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_selector_round_trips() {
        for dt in [
            ParsedDataType::Voice,
            ParsedDataType::VoiceSync,
            ParsedDataType::Slot(DataType::VoiceLc),
        ] {
            let selector = dt.selector();
            let nibble = dt.nibble(3);
            assert_eq!(
                ParsedDataType::from_selector(selector, nibble).unwrap(),
                dt
            );
        }
    }

    #[test]
    fn ts_bit_round_trips() {
        assert_eq!(Ts::from_bit(Ts::Ts1.as_bit()), Ts::Ts1);
        assert_eq!(Ts::from_bit(Ts::Ts2.as_bit()), Ts::Ts2);
    }
}
