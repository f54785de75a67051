//! DMR baseband protocol constants
//!
//! Byte/bit-level constants used throughout the FEC, burst and transport
//! layers, taken from ETSI TS 102 361 as reflected in the reference
//! implementation this crate's behaviour was grounded on.

/// Burst length in bytes (264 bits).
pub const BURST_BYTES: usize = 33;

/// Burst length in bits.
pub const BURST_BITS: usize = 264;

/// Number of info bits carried in each of the two burst halves.
pub const BURST_INFO_BITS: usize = 98;

// ----------------------------------------------------------------------------
// Sync patterns (48 bits / 6 bytes each), carried at burst byte offset 17..23
// ----------------------------------------------------------------------------

/// Base station sourced, voice burst.
pub const SYNC_BS_SOURCED_VOICE: [u8; 6] = [0x75, 0x5f, 0xd7, 0xdf, 0x75, 0xf7];
/// Base station sourced, data/control burst.
pub const SYNC_BS_SOURCED_DATA: [u8; 6] = [0xdf, 0xf5, 0x7d, 0x75, 0xdf, 0x5d];
/// Mobile station sourced, voice burst.
pub const SYNC_MS_SOURCED_VOICE: [u8; 6] = [0x7f, 0x7d, 0x5d, 0xd5, 0x7d, 0xfd];
/// Mobile station sourced, data/control burst.
pub const SYNC_MS_SOURCED_DATA: [u8; 6] = [0xd5, 0xd7, 0xf7, 0x7f, 0xd7, 0x57];
/// Mobile station sourced, reverse channel burst.
pub const SYNC_MS_SOURCED_RC: [u8; 6] = [0x77, 0xd5, 0x5f, 0x7d, 0xfd, 0x77];
/// Direct mode, voice burst, timeslot 1.
pub const SYNC_DIRECT_VOICE_TS1: [u8; 6] = [0x5d, 0x57, 0x7f, 0x77, 0x57, 0xff];
/// Direct mode, data burst, timeslot 1.
pub const SYNC_DIRECT_DATA_TS1: [u8; 6] = [0xf7, 0xfd, 0xd5, 0xdd, 0xfd, 0x55];
/// Direct mode, voice burst, timeslot 2.
pub const SYNC_DIRECT_VOICE_TS2: [u8; 6] = [0x7d, 0xff, 0xd5, 0xf5, 0x5d, 0x5f];
/// Direct mode, data burst, timeslot 2.
pub const SYNC_DIRECT_DATA_TS2: [u8; 6] = [0xd7, 0x55, 0x7f, 0x5f, 0xf7, 0xf5];

/// The nine defined sync patterns, used by the classifier that matches a
/// received burst's sync field against known patterns. A burst whose sync
/// field matches none of these classifies as unknown.
pub const ALL_SYNC_PATTERNS: [(&str, [u8; 6]); 9] = [
    ("bs_sourced_voice", SYNC_BS_SOURCED_VOICE),
    ("bs_sourced_data", SYNC_BS_SOURCED_DATA),
    ("ms_sourced_voice", SYNC_MS_SOURCED_VOICE),
    ("ms_sourced_data", SYNC_MS_SOURCED_DATA),
    ("ms_sourced_rc", SYNC_MS_SOURCED_RC),
    ("direct_voice_ts1", SYNC_DIRECT_VOICE_TS1),
    ("direct_data_ts1", SYNC_DIRECT_DATA_TS1),
    ("direct_voice_ts2", SYNC_DIRECT_VOICE_TS2),
    ("direct_data_ts2", SYNC_DIRECT_DATA_TS2),
];

// ----------------------------------------------------------------------------
// CRC polynomials and masks
// ----------------------------------------------------------------------------

/// CRC-9 polynomial used for confirmed data block checking.
pub const CRC9_POLY: u16 = 0x059;
/// CRC-16 polynomial (CCITT) used for data header checking.
pub const CRC16_POLY: u16 = 0x1021;
/// Final XOR applied after CRC-16 computation.
pub const CRC16_XOR_OUT: u16 = 0xcccc;
/// CRC-32 polynomial used for confirmed higher-layer checking.
pub const CRC32_POLY: u32 = 0x04c11db7;

/// Per-data-type XOR mask applied to the full LC's 9 payload bytes before
/// RS(12,9,4) parity is computed/checked, indexed by the slot-type data
/// type ordinal (see [`crate::burst::slot_type::DataType`]). `MBCC` and
/// `IDLE` carry no defined mask and are left unmasked (`0x00`).
pub const CRC_MASK_LC: [u8; 10] = [
    0x69, 0x96, 0x99, 0xa5, 0xaa, 0x00, 0xcc, 0xf0, 0xff, 0x00,
];

// ----------------------------------------------------------------------------
// MMDVM serial protocol
// ----------------------------------------------------------------------------

/// Frame start byte for every MMDVM serial frame.
pub const MMDVM_FRAME_START: u8 = 0xe0;

pub const MMDVM_GET_VERSION: u8 = 0x00;
pub const MMDVM_GET_STATUS: u8 = 0x01;
pub const MMDVM_SET_CONFIG: u8 = 0x02;
pub const MMDVM_SET_MODE: u8 = 0x03;
pub const MMDVM_SET_RF_CONFIG: u8 = 0x04;
pub const MMDVM_RSSI_DATA: u8 = 0x0a;
pub const MMDVM_SEND_CWID: u8 = 0x0b;
pub const MMDVM_DSTAR_HEADER: u8 = 0x10;
pub const MMDVM_DSTAR_DATA: u8 = 0x11;
pub const MMDVM_DSTAR_LOST: u8 = 0x12;
pub const MMDVM_DSTAR_EOT: u8 = 0x13;
pub const MMDVM_DMR_DATA1: u8 = 0x18;
pub const MMDVM_DMR_LOST1: u8 = 0x19;
pub const MMDVM_DMR_DATA2: u8 = 0x1a;
pub const MMDVM_DMR_LOST2: u8 = 0x1b;
pub const MMDVM_DMR_SHORTLC: u8 = 0x1c;
pub const MMDVM_DMR_START: u8 = 0x1d;
pub const MMDVM_YSF_DATA: u8 = 0x20;
pub const MMDVM_YSF_LOST: u8 = 0x21;
pub const MMDVM_P25_HDR: u8 = 0x30;
pub const MMDVM_P25_DATA: u8 = 0x31;
pub const MMDVM_P25_LOST: u8 = 0x32;
pub const MMDVM_ACK: u8 = 0x70;
pub const MMDVM_NAK: u8 = 0x7f;
pub const MMDVM_DEBUG1: u8 = 0xf0;
pub const MMDVM_DEBUG2: u8 = 0xf1;
pub const MMDVM_DEBUG3: u8 = 0xf2;
pub const MMDVM_DEBUG4: u8 = 0xf3;
pub const MMDVM_DEBUG5: u8 = 0xf4;
pub const MMDVM_SAMPLES: u8 = 0xf8;

/// NAK reason codes, returned as the single byte following the NAK'd
/// command in a [`MMDVM_NAK`] frame.
pub const MMDVM_NAK_INVALID_VALUE: u8 = 0x01;
pub const MMDVM_NAK_WRONG_MODE: u8 = 0x02;
pub const MMDVM_NAK_TOO_LONG: u8 = 0x03;
pub const MMDVM_NAK_DATA_INCORRECT: u8 = 0x04;
pub const MMDVM_NAK_NOT_ENOUGH_SPACE: u8 = 0x05;

/// Silence period after which the repeater core synthesises a leading
/// `VOICE_LC` burst on stream resumption, as specified in milliseconds.
pub const VOICE_STREAM_SILENCE_MS: u64 = 120;

// ----------------------------------------------------------------------------
// Homebrew (IP Site Connect) UDP protocol
// ----------------------------------------------------------------------------

pub const HOMEBREW_TAG_RPTL: &[u8; 4] = b"RPTL";
pub const HOMEBREW_TAG_RPTK: &[u8; 4] = b"RPTK";
pub const HOMEBREW_TAG_RPTC: &[u8; 4] = b"RPTC";
pub const HOMEBREW_TAG_RPTCL: &[u8; 5] = b"RPTCL";
pub const HOMEBREW_TAG_RPTACK: &[u8; 6] = b"RPTACK";
pub const HOMEBREW_TAG_RPTPONG: &[u8; 7] = b"RPTPONG";
pub const HOMEBREW_TAG_MSTNAK: &[u8; 6] = b"MSTNAK";
pub const HOMEBREW_TAG_MSTCL: &[u8; 5] = b"MSTCL";
pub const HOMEBREW_TAG_RPTPING: &[u8; 7] = b"RPTPING";
pub const HOMEBREW_TAG_MSTPING: &[u8; 7] = b"MSTPING";
pub const HOMEBREW_TAG_RPTSBKN: &[u8; 7] = b"RPTSBKN";
pub const HOMEBREW_TAG_DMRD: &[u8; 4] = b"DMRD";

/// Length in bytes of a `DMRD` frame (4-byte tag + 49-byte body).
pub const HOMEBREW_DMRD_LEN: usize = 53;
