//! End-to-end scenarios exercising the public API across module
//! boundaries: a Homebrew login round-trip over real loopback UDP, a
//! DMRD decode, and the repeater core's header-restore/policy-rewrite
//! behaviour.

use std::net::SocketAddr;
use std::time::Duration;

use dmr_core::burst::{full_lc, slot_type, sync, Burst};
use dmr_core::packet::{Flco, ParsedDataType, ParsedPacket, Ts};
use dmr_core::repeater::{AllowAll, RoutingOutcome, RoutingPolicy};
use dmr_core::transport::homebrew::{Homebrew, HomebrewConfig};
use dmr_core::transport::Transport;
use dmr_core::RepeaterCore;
use sha2::{Digest, Sha256};
use tokio::net::UdpSocket;
use tokio::time::timeout;

async fn local_udp() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

/// S1: Homebrew login. A fresh repeater sends `RPTL`, a mock master
/// replies with a nonce-bearing `MSTACK`, and the repeater must answer
/// with `RPTK` carrying hex(SHA-256(nonce ++ secret)).
#[tokio::test]
async fn homebrew_login_computes_rptk_digest() {
    let (master, master_addr) = local_udp().await;

    let mut config = HomebrewConfig::default();
    config.repeater_id = 0x00112233;
    let mut repeater = Homebrew::new(config, master_addr).await.unwrap();

    repeater.auth("passw0rd").await.unwrap();

    let mut rptl = [0u8; 32];
    let (n, repeater_addr) = master.recv_from(&mut rptl).await.unwrap();
    assert_eq!(&rptl[..4], b"RPTL");
    assert_eq!(&rptl[4..n], &0x00112233u32.to_be_bytes());

    let nonce = [0u8; 8];
    let mut mstack = Vec::new();
    mstack.extend_from_slice(b"MSTACK");
    mstack.extend_from_slice(format!("{:08x}", 0x00112233u32).as_bytes());
    mstack.extend_from_slice(&nonce);
    assert_eq!(mstack.len(), 22);
    master.send_to(&mstack, repeater_addr).await.unwrap();

    assert!(repeater.recv().await.unwrap().is_none());

    let mut rptk = [0u8; 128];
    let n = timeout(Duration::from_secs(1), master.recv_from(&mut rptk))
        .await
        .unwrap()
        .unwrap()
        .0;
    let rptk = &rptk[..n];

    assert_eq!(&rptk[..4], b"RPTK");
    assert_eq!(&rptk[4..8], &0x00112233u32.to_be_bytes());

    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(b"passw0rd");
    let expected = hex::encode(hasher.finalize());
    assert_eq!(&rptk[8..], expected.as_bytes());
}

fn dmrd_frame() -> Vec<u8> {
    let mut raw = Vec::with_capacity(53);
    raw.extend_from_slice(b"DMRD");
    raw.push(0x01); // sequence
    raw.extend_from_slice(&[0x00, 0x12, 0x34]); // src
    raw.extend_from_slice(&[0x00, 0xab, 0xcd]); // dst
    raw.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // repeater id
    raw.push(0x05); // slot_info: TS2, group, voice-sync
    raw.extend_from_slice(&0xdeadbeefu32.to_be_bytes()); // stream id
    raw.extend_from_slice(&[0u8; 33]);
    raw
}

/// S2: decoding a `DMRD` datagram yields the fields the slot-info byte
/// encodes (timeslot, call type, addresses, data type, stream id).
#[tokio::test]
async fn homebrew_decodes_dmrd_fields() {
    let (master, master_addr) = local_udp().await;

    let config = HomebrewConfig::default();
    let mut repeater = Homebrew::new(config, master_addr).await.unwrap();

    // RPTL is the cheapest way to learn the repeater's ephemeral bound
    // port, exactly as a real master would on first contact.
    repeater.auth("passw0rd").await.unwrap();
    let mut rptl = [0u8; 32];
    let (_, repeater_addr) = master.recv_from(&mut rptl).await.unwrap();

    let frame = dmrd_frame();
    master.send_to(&frame, repeater_addr).await.unwrap();

    let packet = repeater.recv().await.unwrap().expect("a DMRD packet");
    assert_eq!(packet.ts, Ts::Ts2);
    assert_eq!(packet.flco, Flco::Group);
    assert_eq!(packet.src_id, 0x1234);
    assert_eq!(packet.dst_id, 0xabcd);
    assert_eq!(packet.data_type, ParsedDataType::VoiceSync);
    assert_eq!(packet.stream_id, 0xdeadbeef);
}

struct SwapTs1ForTs2AndRewriteDst;

impl RoutingPolicy for SwapTs1ForTs2AndRewriteDst {
    fn decide(&self, _source: usize, _dest: usize, packet: &mut ParsedPacket) -> RoutingOutcome {
        if packet.ts == Ts::Ts1 {
            packet.ts = Ts::Ts2;
        }
        packet.dst_id = 9000;
        RoutingOutcome::Permit
    }
}

fn voice_lc_sample(ts: Ts, src_id: u32, dst_id: u32) -> ParsedPacket {
    ParsedPacket {
        ts,
        flco: Flco::Group,
        src_id,
        dst_id,
        repeater_id: 1,
        data_type: ParsedDataType::Slot(slot_type::DataType::VoiceLc),
        voice_frame: 0,
        color_code: 1,
        stream_id: 0xaabbccdd,
        sequence: 0,
        burst: Burst::new(),
    }
}

/// S5: a voice-sync burst routed across the core arrives re-stamped
/// with a BS-sourced-voice sync pattern and the repeater's own,
/// Golay-encoded color code.
#[test]
fn repeater_restores_headers_on_route() {
    let core = RepeaterCore::new(9, Box::new(dmr_core::repeater::AllowAll));
    let mut packet = voice_lc_sample(Ts::Ts1, 1000, 2000);
    packet.voice_frame = 0;
    packet.data_type = ParsedDataType::Voice;

    let routed = core.route(0, 2, packet);
    assert_eq!(routed.len(), 1);
    assert_eq!(
        sync::decode(&routed[0].1.burst.raw),
        Some(sync::SyncPattern::BsSourcedVoice)
    );
}

/// S6: a routing policy that rewrites timeslot and destination takes
/// effect, and the full LC rebuilt on egress reflects the new
/// destination id.
#[test]
fn routing_policy_rewrite_reflected_in_full_lc() {
    let core = RepeaterCore::new(3, Box::new(SwapTs1ForTs2AndRewriteDst));
    let packet = voice_lc_sample(Ts::Ts1, 1000, 2000);

    let routed = core.route(0, 2, packet);
    assert_eq!(routed.len(), 1);
    let (_, egress) = &routed[0];
    assert_eq!(egress.ts, Ts::Ts2);
    assert_eq!(egress.dst_id, 9000);

    let info = egress.burst.info_bits();
    let lc = full_lc::decode(&info, slot_type::DataType::VoiceLc).expect("rebuilt LC decodes");
    assert_eq!(lc.dst_id, 9000);
}
