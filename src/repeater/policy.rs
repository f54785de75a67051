//! Routing policy: decides whether a packet received on one transport is
//! forwarded to another, and may rewrite it in the process.
//!
//! The reference implementation leaves this decision to an embedded
//! scripting hook, explicitly out of scope here; this trait is the typed
//! equivalent an embedding application implements instead of loading a
//! script, covering the same `{reject, permit, permit-unmodified}`
//! routing outcomes.

use crate::packet::ParsedPacket;

/// The outcome of a routing decision for one (source, destination) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingOutcome {
    /// The packet is not forwarded to this destination.
    Reject,
    /// The packet is forwarded; `decide` may have rewritten it in place.
    Permit,
    /// The packet is forwarded exactly as received.
    PermitUnmodified,
}

/// Decides whether a packet received on `source` is forwarded to `dest`.
pub trait RoutingPolicy: Send + Sync {
    fn decide(&self, source: usize, dest: usize, packet: &mut ParsedPacket) -> RoutingOutcome;
}

/// Forwards every packet to every other transport unmodified.
pub struct AllowAll;

impl RoutingPolicy for AllowAll {
    fn decide(&self, _source: usize, _dest: usize, _packet: &mut ParsedPacket) -> RoutingOutcome {
        RoutingOutcome::PermitUnmodified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::Burst;
    use crate::packet::{Flco, ParsedDataType, Ts};

    fn sample() -> ParsedPacket {
        ParsedPacket {
            ts: Ts::Ts1,
            flco: Flco::Group,
            src_id: 1,
            dst_id: 2,
            repeater_id: 3,
            data_type: ParsedDataType::VoiceSync,
            voice_frame: 0,
            color_code: 1,
            stream_id: 0,
            sequence: 0,
            burst: Burst::new(),
        }
    }

    #[test]
    fn allow_all_permits_unmodified() {
        let mut packet = sample();
        let outcome = AllowAll.decide(0, 1, &mut packet);
        assert_eq!(outcome, RoutingOutcome::PermitUnmodified);
    }
}
