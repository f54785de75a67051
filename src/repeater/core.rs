//! Per-timeslot repeater state and the inbound routing path, guarded by
//! a mutex per slot rather than a single lock across both timeslots.

use std::sync::Mutex;
use std::time::Instant;

use crate::burst::full_lc::{self, Flco as LcFlco, FullLc};
use crate::burst::slot_type::{self, DataType, SlotType};
use crate::burst::sync::{self, SyncPattern};
use crate::fec::vbptc16_11::Vbptc1611;
use crate::packet::{Flco, ParsedDataType, ParsedPacket};

use super::policy::{RoutingOutcome, RoutingPolicy};

/// Per-timeslot bookkeeping: last-seen source/destination, last stream id,
/// last data type, wallclock of the last frame, a running sequence
/// counter, and the EMB LC super-frame accumulator.
struct SlotState {
    last_src: Option<u32>,
    last_dst: Option<u32>,
    last_stream_id: Option<u32>,
    last_data_type: Option<ParsedDataType>,
    last_frame_at: Option<Instant>,
    sequence: u8,
    emb_lc: Vbptc1611,
}

impl Default for SlotState {
    fn default() -> Self {
        Self {
            last_src: None,
            last_dst: None,
            last_stream_id: None,
            last_data_type: None,
            last_frame_at: None,
            sequence: 0,
            emb_lc: Vbptc1611::new(5),
        }
    }
}

fn to_lc_flco(flco: Flco) -> Option<LcFlco> {
    match flco {
        Flco::Group => Some(LcFlco::GroupVoiceChannelUser),
        Flco::Private => Some(LcFlco::UnitToUnitVoiceChannelUser),
        Flco::Invalid => None,
    }
}

/// The repeater's routing core: holds per-slot state and a routing
/// policy, but performs no transport I/O itself — [`crate::reactor`]
/// drives transports and calls [`RepeaterCore::route`] for each inbound
/// packet.
pub struct RepeaterCore {
    slots: [Mutex<SlotState>; 2],
    policy: Box<dyn RoutingPolicy>,
    color_code: u8,
}

impl RepeaterCore {
    pub fn new(color_code: u8, policy: Box<dyn RoutingPolicy>) -> Self {
        Self {
            slots: [Mutex::new(SlotState::default()), Mutex::new(SlotState::default())],
            policy,
            color_code,
        }
    }

    /// Records `packet` as this slot's most recent frame and returns the
    /// next value of the per-slot running sequence counter.
    fn observe(&self, packet: &ParsedPacket) -> u8 {
        let mut slot = self.slots[packet.ts as usize].lock().expect("slot mutex poisoned");
        slot.last_src = Some(packet.src_id);
        slot.last_dst = Some(packet.dst_id);
        slot.last_stream_id = Some(packet.stream_id);
        slot.last_data_type = Some(packet.data_type);
        slot.last_frame_at = Some(Instant::now());
        let sequence = slot.sequence;
        slot.sequence = slot.sequence.wrapping_add(1);
        sequence
    }

    /// Rebuilds any headers the downstream transport needs but the
    /// packet doesn't carry on its own: a fresh full LC for VOICE_LC /
    /// TERMINATOR_WITH_LC bursts, a re-stamped sync pattern for the first
    /// burst (A) of a voice super-frame, and the repeater's own color
    /// code into the Golay-protected slot type.
    fn restore_headers(&self, packet: &mut ParsedPacket) {
        match packet.data_type {
            ParsedDataType::Slot(dt) => {
                if matches!(dt, DataType::VoiceLc | DataType::TerminatorWithLc) {
                    if let Some(flco) = to_lc_flco(packet.flco) {
                        let lc = FullLc {
                            flco,
                            fid: 0,
                            dst_id: packet.dst_id,
                            src_id: packet.src_id,
                        };
                        let info = full_lc::encode(lc, dt);
                        packet.burst.set_info_bits(&info);
                    }
                }
                let _ = slot_type::encode(
                    &mut packet.burst.raw,
                    SlotType {
                        color_code: self.color_code,
                        data_type: dt,
                    },
                );
            }
            ParsedDataType::Voice if packet.voice_frame == 0 => {
                packet.burst.raw[17..23].fill(0);
                let _ = sync::encode(&mut packet.burst.raw, SyncPattern::BsSourcedVoice);
            }
            _ => {}
        }
    }

    /// Routes `packet`, received on transport `source` out of
    /// `num_transports` total, returning `(destination, rewritten
    /// packet)` pairs for every transport the policy permits. The source
    /// transport is never a candidate destination (duplicate
    /// suppression).
    pub fn route(
        &self,
        source: usize,
        num_transports: usize,
        packet: ParsedPacket,
    ) -> Vec<(usize, ParsedPacket)> {
        let sequence = self.observe(&packet);
        let mut out = Vec::new();

        for dest in 0..num_transports {
            if dest == source {
                continue;
            }
            let mut candidate = packet;
            candidate.sequence = sequence;

            match self.policy.decide(source, dest, &mut candidate) {
                RoutingOutcome::Reject => continue,
                RoutingOutcome::PermitUnmodified => {
                    self.restore_headers(&mut candidate);
                    out.push((dest, candidate));
                }
                RoutingOutcome::Permit => {
                    self.restore_headers(&mut candidate);
                    out.push((dest, candidate));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::Burst;
    use crate::packet::Ts;
    use crate::repeater::policy::AllowAll;

    fn sample(dt: DataType) -> ParsedPacket {
        ParsedPacket {
            ts: Ts::Ts1,
            flco: Flco::Group,
            src_id: 1000,
            dst_id: 2000,
            repeater_id: 0x00112233,
            data_type: ParsedDataType::Slot(dt),
            voice_frame: 0,
            color_code: 1,
            stream_id: 0xaabbccdd,
            sequence: 0,
            burst: Burst::new(),
        }
    }

    #[test]
    fn skips_the_source_transport() {
        let core = RepeaterCore::new(3, Box::new(AllowAll));
        let routed = core.route(0, 2, sample(DataType::Idle));
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].0, 1);
    }

    #[test]
    fn restamps_slot_type_with_repeaters_color_code() {
        let core = RepeaterCore::new(7, Box::new(AllowAll));
        let routed = core.route(0, 2, sample(DataType::TerminatorWithLc));
        let restamped = slot_type::decode(&routed[0].1.burst.raw).unwrap();
        assert_eq!(restamped.color_code, 7);
        assert_eq!(restamped.data_type, DataType::TerminatorWithLc);
    }

    #[test]
    fn rebuilds_full_lc_with_current_src_dst() {
        let core = RepeaterCore::new(1, Box::new(AllowAll));
        let routed = core.route(0, 2, sample(DataType::VoiceLc));
        let info = routed[0].1.burst.info_bits();
        let lc = full_lc::decode(&info, DataType::VoiceLc).expect("rebuilt LC must decode");
        assert_eq!(lc.dst_id, 2000);
        assert_eq!(lc.src_id, 1000);
    }

    #[test]
    fn stamps_bs_sourced_voice_on_frame_a() {
        let core = RepeaterCore::new(1, Box::new(AllowAll));
        let mut packet = sample(DataType::Idle);
        packet.data_type = ParsedDataType::Voice;
        packet.voice_frame = 0;
        let routed = core.route(0, 2, packet);
        assert_eq!(sync::decode(&routed[0].1.burst.raw), Some(SyncPattern::BsSourcedVoice));
    }
}
