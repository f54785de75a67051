//! The 33-byte (264-bit) DMR burst and its typed views.
//!
//! Grounded on `src/dmr/packet.c` and `src/dmr/payload/info.c`: a burst is
//! a flat byte array, and every field within it (sync, slot type, EMB,
//! full LC, data header/block) is read and written at a fixed byte/nibble
//! offset rather than through a parsed intermediate structure. This
//! module mirrors that: [`Burst`] is a thin wrapper around the raw bytes,
//! and each submodule's `decode`/`encode` functions take the raw array
//! (or a `&mut` to it) directly.

pub mod data;
pub mod emb;
pub mod full_lc;
pub mod slot_type;
pub mod sync;

use crate::constants::BURST_BYTES;

/// A single 33-byte DMR burst.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub raw: [u8; BURST_BYTES],
}

impl Burst {
    pub fn new() -> Self {
        Self {
            raw: [0u8; BURST_BYTES],
        }
    }

    pub fn from_bytes(raw: [u8; BURST_BYTES]) -> Self {
        Self { raw }
    }

    /// Extracts the burst's 196 info bits: 98 bits from the first half
    /// (byte-bit offset 0) and 98 bits from the second half (offset 166,
    /// i.e. past the 98-bit first half, the 68-bit sync/slot-type/CACH
    /// gap, per `dmr_payload_get_info_bits`).
    pub fn info_bits(&self) -> [bool; 196] {
        let all = crate::bits::unpack_bits(&self.raw);
        let mut info = [false; 196];
        info[..98].copy_from_slice(&all[0..98]);
        info[98..].copy_from_slice(&all[166..264]);
        info
    }

    /// Writes 196 info bits back into the burst, inverse of [`Self::info_bits`].
    pub fn set_info_bits(&mut self, info: &[bool; 196]) {
        let mut all = crate::bits::unpack_bits(&self.raw);
        all[0..98].copy_from_slice(&info[..98]);
        all[166..264].copy_from_slice(&info[98..]);
        self.raw = crate::bits::pack_bits(&all)
            .try_into()
            .expect("264 bits always packs to 33 bytes");
    }
}

impl Default for Burst {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_bits_round_trip() {
        let mut burst = Burst::new();
        let mut bits = [false; 196];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = i % 5 == 0;
        }
        burst.set_info_bits(&bits);
        assert_eq!(burst.info_bits(), bits);
    }
}
