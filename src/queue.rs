//! Packet and raw-byte FIFOs.
//!
//! Grounded on `dmr_packetq`/`dmr_rawq` (`include/dmr/packetq.h`,
//! `include/dmr/raw.h`): a packet queue is unbounded, since back-pressure
//! is only meaningful for raw transport buffers; a raw queue may be capped.

use crate::error::DmrError;
use crate::packet::ParsedPacket;
use std::collections::VecDeque;

/// Unbounded FIFO of owned parsed packets.
#[derive(Default)]
pub struct PacketQueue {
    items: VecDeque<ParsedPacket>,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: ParsedPacket) {
        self.items.push_back(packet);
    }

    pub fn pop(&mut self) -> Option<ParsedPacket> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// FIFO of owned raw byte buffers, optionally capped. Pushing past the cap
/// fails without dropping any existing entry (back-pressure).
pub struct RawQueue {
    items: VecDeque<Vec<u8>>,
    cap: Option<usize>,
}

impl RawQueue {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            cap,
        }
    }

    pub fn push(&mut self, buf: Vec<u8>) -> Result<(), DmrError> {
        if let Some(cap) = self.cap {
            if self.items.len() >= cap {
                return Err(DmrError::OutOfMemory);
            }
        }
        self.items.push_back(buf);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::Burst;
    use crate::packet::{Flco, ParsedDataType, Ts};

    fn sample_packet() -> ParsedPacket {
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
    fn packet_queue_is_fifo() {
        let mut q = PacketQueue::new();
        let mut a = sample_packet();
        a.sequence = 1;
        let mut b = sample_packet();
        b.sequence = 2;
        q.push(a);
        q.push(b);
        assert_eq!(q.pop().unwrap().sequence, 1);
        assert_eq!(q.pop().unwrap().sequence, 2);
        assert!(q.pop().is_none());
    }

    #[test]
    fn raw_queue_cap_backpressures_without_dropping() {
        let mut q = RawQueue::new(Some(1));
        q.push(vec![1]).unwrap();
        assert!(q.push(vec![2]).is_err());
        assert_eq!(q.pop(), Some(vec![1]));
    }

    #[test]
    fn raw_queue_uncapped_accepts_any_depth() {
        let mut q = RawQueue::new(None);
        for i in 0..100u8 {
            q.push(vec![i]).unwrap();
        }
        assert_eq!(q.len(), 100);
    }
}
