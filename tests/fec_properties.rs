//! Randomised round-trip properties for the forward error correction
//! codecs and the burst fields built on top of them.

use dmr_core::burst::full_lc::{self, Flco, FullLc};
use dmr_core::burst::slot_type::DataType;
use dmr_core::fec::hamming::{
    HAMMING_13_9_3, HAMMING_15_11_3, HAMMING_16_11_4, HAMMING_17_12_3, HAMMING_7_4_3,
};
use dmr_core::fec::{bptc196, rs12_9, HammingCode};
use proptest::prelude::*;
use proptest::proptest;

fn bits_from_u32(value: u32, count: usize) -> Vec<bool> {
    (0..count).map(|i| (value >> i) & 1 != 0).collect()
}

fn hamming_round_trips(code: &HammingCode, data: u32) {
    let mut word = bits_from_u32(data, code.k);
    word.resize(code.n, false);
    code.encode(&mut word);

    let mut decoded = word.clone();
    code.decode(&mut decoded).expect("clean codeword must decode");
    assert_eq!(&decoded[..code.k], &word[..code.k]);
}

fn hamming_tolerates_single_flip(code: &HammingCode, data: u32, flip: usize) {
    let mut word = bits_from_u32(data, code.k);
    word.resize(code.n, false);
    code.encode(&mut word);
    let clean = word.clone();

    let flip = flip % code.n;
    word[flip] = !word[flip];
    code.decode(&mut word).expect("single-bit error must correct");
    assert_eq!(word, clean);
}

proptest! {
    // FEC.1: for each Hamming(n,k,d) variant DMR uses, every k-bit data
    // value round-trips and tolerates any single-bit flip.
    #[test]
    fn prop_hamming_round_trip(data in 0u32..(1 << 12)) {
        hamming_round_trips(&HAMMING_7_4_3, data);
        hamming_round_trips(&HAMMING_13_9_3, data);
        hamming_round_trips(&HAMMING_15_11_3, data);
        hamming_round_trips(&HAMMING_16_11_4, data);
        hamming_round_trips(&HAMMING_17_12_3, data);
    }

    #[test]
    fn prop_hamming_corrects_single_flip(data in 0u32..(1 << 12), flip in 0usize..17) {
        hamming_tolerates_single_flip(&HAMMING_7_4_3, data, flip);
        hamming_tolerates_single_flip(&HAMMING_13_9_3, data, flip);
        hamming_tolerates_single_flip(&HAMMING_15_11_3, data, flip);
        hamming_tolerates_single_flip(&HAMMING_16_11_4, data, flip);
        hamming_tolerates_single_flip(&HAMMING_17_12_3, data, flip);
    }

    // FEC.4: BPTC(196,96) round-trips any 96-bit payload.
    #[test]
    fn prop_bptc196_round_trip(bytes in proptest::collection::vec(any::<bool>(), 96)) {
        let mut data = [false; 96];
        data.copy_from_slice(&bytes);
        let encoded = bptc196::encode(&data);
        let decoded = bptc196::decode(&encoded).expect("clean BPTC block must decode");
        prop_assert_eq!(decoded, data);
    }

    // FEC.5: RS(12,9,4) round-trips any 9-byte payload, corrects any
    // single byte error, and rejects (rather than miscorrects) any
    // two-byte error (see DESIGN.md: 3 parity symbols bound correction
    // to one symbol, not two, under the Singleton bound).
    #[test]
    fn prop_rs1293_round_trip(data in proptest::collection::vec(any::<u8>(), 9)) {
        let mask = [0x96u8, 0x99, 0xa5];
        let mut payload = [0u8; 9];
        payload.copy_from_slice(&data);
        let encoded = rs12_9::encode(&payload, &mask);
        let decoded = rs12_9::decode(&encoded, &mask).expect("clean RS block must decode");
        prop_assert_eq!(decoded, payload);
    }

    #[test]
    fn prop_rs1293_corrects_single_byte_error(
        data in proptest::collection::vec(any::<u8>(), 9),
        pos in 0usize..12,
        delta in 1u8..=255u8,
    ) {
        let mask = [0x96u8, 0x99, 0xa5];
        let mut payload = [0u8; 9];
        payload.copy_from_slice(&data);
        let mut encoded = rs12_9::encode(&payload, &mask);
        encoded[pos] ^= delta;
        let decoded = rs12_9::decode(&encoded, &mask).expect("single byte error must correct");
        prop_assert_eq!(decoded, payload);
    }

    // BURST.3: a full LC round-trips for any 24-bit src/dst pair.
    #[test]
    fn prop_full_lc_round_trip(src_id in 0u32..(1 << 24), dst_id in 0u32..(1 << 24)) {
        let lc = FullLc {
            flco: Flco::GroupVoiceChannelUser,
            fid: 0,
            dst_id,
            src_id,
        };
        let info = full_lc::encode(lc, DataType::VoiceLc);
        let decoded = full_lc::decode(&info, DataType::VoiceLc).expect("clean LC must decode");
        prop_assert_eq!(decoded.dst_id, dst_id);
        prop_assert_eq!(decoded.src_id, src_id);
        prop_assert_eq!(decoded.flco, Flco::GroupVoiceChannelUser);
    }
}
