//! Homebrew IP Site Connect: the UDP protocol spoken by Brandmeister-style
//! DMR master servers.
//!
//! Grounded on `src/dmr/protocol/homebrew.c` / `homebrew_io.c`, the newer
//! of the two login state machines carried in the reference implementation
//! (see the Open Question resolution in DESIGN.md: the older
//! `src/dmr/proto/homebrew.c` is a stub and is not normative here).

use crate::burst::Burst;
use crate::constants::{
    HOMEBREW_DMRD_LEN, HOMEBREW_TAG_DMRD, HOMEBREW_TAG_MSTPING, HOMEBREW_TAG_RPTC,
    HOMEBREW_TAG_RPTCL, HOMEBREW_TAG_RPTK, HOMEBREW_TAG_RPTL,
};
use crate::error::DmrError;
use crate::packet::{Flco, ParsedDataType, ParsedPacket, Ts};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use zeroize::Zeroizing;

/// Default Homebrew/IPSC UDP port.
pub const DEFAULT_PORT: u16 = 62030;

/// Repeater is torn down if no `RPTPONG` arrives within this long after the
/// last `MSTPING`.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);
/// Ping interval once logged in.
const PING_INTERVAL: Duration = Duration::from_secs(5);

/// Login/session state, per `dmr_homebrew_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomebrewState {
    None,
    Init,
    Config,
    Done,
}

/// Static repeater identity and site metadata sent in the `RPTC` frame.
#[derive(Debug, Clone)]
pub struct HomebrewConfig {
    pub call: String,
    pub repeater_id: u32,
    pub rx_freq: u32,
    pub tx_freq: u32,
    pub tx_power: u8,
    pub color_code: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: u16,
    pub location: String,
    pub description: String,
    pub url: String,
    pub software_id: String,
    pub package_id: String,
}

impl Default for HomebrewConfig {
    fn default() -> Self {
        Self {
            call: String::new(),
            repeater_id: 0,
            rx_freq: 0,
            tx_freq: 0,
            tx_power: 0,
            color_code: 1,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            location: "Unknown".into(),
            description: "dmr-core repeater".into(),
            url: String::new(),
            software_id: "dmr-core".into(),
            package_id: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// A Homebrew (IP Site Connect) client connection to one master.
pub struct Homebrew {
    id: String,
    socket: UdpSocket,
    config: HomebrewConfig,
    secret: Zeroizing<String>,
    state: HomebrewState,
    nonce: [u8; 8],
    last_ping: Instant,
    last_pong: Instant,
}

impl Homebrew {
    /// Binds a UDP socket and connects it to `peer_addr`, ready for
    /// [`Self::auth`].
    pub async fn new(config: HomebrewConfig, peer_addr: SocketAddr) -> Result<Self, DmrError> {
        let bind_addr: SocketAddr = if peer_addr.is_ipv6() {
            "[::]:0".parse().unwrap()
        } else {
            "0.0.0.0:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DmrError::WriteFailure(format!("bind: {e}")))?;
        socket
            .connect(peer_addr)
            .await
            .map_err(|e| DmrError::WriteFailure(format!("connect: {e}")))?;

        let id = format!("homebrew[{}]", config.repeater_id);
        let now = Instant::now();
        Ok(Self {
            id,
            socket,
            config,
            secret: Zeroizing::new(String::new()),
            state: HomebrewState::None,
            nonce: [0u8; 8],
            last_ping: now,
            last_pong: now,
        })
    }

    pub fn state(&self) -> HomebrewState {
        self.state
    }

    /// Sends `RPTL` to begin the login handshake.
    pub async fn auth(&mut self, secret: impl Into<String>) -> Result<(), DmrError> {
        if self.config.repeater_id == 0 {
            return Err(DmrError::InvalidArgument("repeater_id can't be 0".into()));
        }
        self.secret = Zeroizing::new(secret.into());
        self.state = HomebrewState::None;

        let mut raw = Vec::with_capacity(8);
        raw.extend_from_slice(HOMEBREW_TAG_RPTL);
        raw.extend_from_slice(&self.config.repeater_id.to_be_bytes());
        self.send_raw(&raw).await
    }

    /// True once the 10 s `RPTPONG` timeout has been exceeded while logged
    /// in; the caller should tear this transport down.
    pub fn pong_timed_out(&self) -> bool {
        self.state == HomebrewState::Done && self.last_pong.elapsed() > PONG_TIMEOUT
    }

    /// Sends `MSTPING` if we're logged in and the ping interval has
    /// elapsed. The caller drives this on its own timer tick.
    pub async fn maybe_ping(&mut self) -> Result<(), DmrError> {
        if self.state != HomebrewState::Done || self.last_ping.elapsed() < PING_INTERVAL {
            return Ok(());
        }
        let mut raw = Vec::with_capacity(11);
        raw.extend_from_slice(HOMEBREW_TAG_MSTPING);
        raw.extend_from_slice(&self.config.repeater_id.to_be_bytes());
        self.send_raw(&raw).await?;
        self.last_ping = Instant::now();
        Ok(())
    }

    async fn send_raw(&self, buf: &[u8]) -> Result<(), DmrError> {
        self.socket
            .send(buf)
            .await
            .map_err(|e| DmrError::WriteFailure(e.to_string()))?;
        Ok(())
    }

    async fn send_config(&mut self) -> Result<(), DmrError> {
        let c = &self.config;
        let mut raw = Vec::with_capacity(306);
        raw.extend_from_slice(HOMEBREW_TAG_RPTC);
        raw.extend_from_slice(format!("{:<8}", c.call).as_bytes());
        raw.extend_from_slice(format!("{:08x}", c.repeater_id).as_bytes());
        raw.extend_from_slice(format!("{:09}", c.rx_freq).as_bytes());
        raw.extend_from_slice(format!("{:09}", c.tx_freq).as_bytes());
        raw.extend_from_slice(format!("{:02}", c.tx_power.min(99)).as_bytes());
        raw.extend_from_slice(format!("{:02}", c.color_code).as_bytes());
        raw.extend_from_slice(format!("{:08.4}", c.latitude).as_bytes());
        raw.extend_from_slice(format!("{:09.4}", c.longitude).as_bytes());
        raw.extend_from_slice(format!("{:03}", c.altitude.min(999)).as_bytes());
        raw.extend_from_slice(format!("{:<20}", c.location).as_bytes());
        raw.extend_from_slice(format!("{:<20}", c.description).as_bytes());
        raw.extend_from_slice(format!("{:<124}", c.url).as_bytes());
        raw.extend_from_slice(format!("{:<40}", c.software_id).as_bytes());
        raw.extend_from_slice(format!("{:<40}", c.package_id).as_bytes());

        self.state = HomebrewState::Config;
        self.send_raw(&raw).await
    }

    async fn send_key(&mut self) -> Result<(), DmrError> {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce);
        hasher.update(self.secret.as_bytes());
        let digest = hasher.finalize();

        let mut raw = Vec::with_capacity(76);
        raw.extend_from_slice(HOMEBREW_TAG_RPTK);
        raw.extend_from_slice(&self.config.repeater_id.to_be_bytes());
        raw.extend_from_slice(hex::encode(digest).as_bytes());

        self.state = HomebrewState::Init;
        self.send_raw(&raw).await
    }

    /// Sends `RPTCL` (close) if currently logged in at all.
    pub async fn close(&mut self) -> Result<(), DmrError> {
        if self.state == HomebrewState::None {
            return Ok(());
        }
        let mut raw = Vec::with_capacity(12);
        raw.extend_from_slice(HOMEBREW_TAG_RPTCL);
        raw.extend_from_slice(&self.config.repeater_id.to_be_bytes());
        self.send_raw(&raw).await
    }

    fn parse_dmrd(&self, buf: &[u8]) -> Result<ParsedPacket, DmrError> {
        if buf.len() != HOMEBREW_DMRD_LEN {
            return Err(DmrError::InvalidArgument("not a DMRD frame".into()));
        }
        let sequence = buf[4];
        let src_id = u32::from(buf[5]) << 16 | u32::from(buf[6]) << 8 | u32::from(buf[7]);
        let dst_id = u32::from(buf[8]) << 16 | u32::from(buf[9]) << 8 | u32::from(buf[10]);
        let repeater_id = u32::from_be_bytes([buf[11], buf[12], buf[13], buf[14]]);
        let slot_info = buf[15];
        let ts = Ts::from_bit(slot_info);
        let flco = if slot_info & 0x02 != 0 {
            Flco::Private
        } else {
            Flco::Group
        };
        let selector = (slot_info >> 2) & 0x03;
        let nibble = slot_info >> 4;
        let data_type = ParsedDataType::from_selector(selector, nibble)?;
        let voice_frame = if matches!(data_type, ParsedDataType::Voice) {
            nibble
        } else {
            0
        };
        let stream_id = u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]]);

        let mut raw = [0u8; crate::constants::BURST_BYTES];
        raw.copy_from_slice(&buf[20..53]);

        Ok(ParsedPacket {
            ts,
            flco,
            src_id,
            dst_id,
            repeater_id,
            data_type,
            voice_frame,
            color_code: 0,
            stream_id,
            sequence,
            burst: Burst::from_bytes(raw),
        })
    }

    fn encode_dmrd(&self, parsed: &ParsedPacket) -> Vec<u8> {
        let mut slot_info = 0u8;
        if self.config.rx_freq != self.config.tx_freq {
            slot_info |= parsed.ts.as_bit();
        }
        if parsed.flco == Flco::Private {
            slot_info |= 0x02;
        }
        slot_info |= parsed.data_type.selector() << 2;
        slot_info |= parsed.data_type.nibble(parsed.voice_frame) << 4;

        let mut raw = Vec::with_capacity(HOMEBREW_DMRD_LEN);
        raw.extend_from_slice(HOMEBREW_TAG_DMRD);
        raw.push(parsed.sequence);
        raw.push((parsed.src_id >> 16) as u8);
        raw.push((parsed.src_id >> 8) as u8);
        raw.push(parsed.src_id as u8);
        raw.push((parsed.dst_id >> 16) as u8);
        raw.push((parsed.dst_id >> 8) as u8);
        raw.push(parsed.dst_id as u8);
        raw.extend_from_slice(&parsed.repeater_id.to_be_bytes());
        raw.push(slot_info);
        raw.extend_from_slice(&parsed.stream_id.to_be_bytes());
        raw.extend_from_slice(&parsed.burst.raw);
        raw
    }
}

#[async_trait]
impl super::Transport for Homebrew {
    fn name(&self) -> &str {
        &self.id
    }

    async fn recv(&mut self) -> Result<Option<ParsedPacket>, DmrError> {
        let mut buf = [0u8; HOMEBREW_DMRD_LEN];
        let len = self
            .socket
            .recv(&mut buf)
            .await
            .map_err(|e| DmrError::ReadFailure(e.to_string()))?;
        if len < 14 {
            return Ok(None);
        }
        let buf = &buf[..len];

        match buf[0] {
            b'D' if len == HOMEBREW_DMRD_LEN => Ok(Some(self.parse_dmrd(buf)?)),
            b'M' if len == 14 => {
                if &buf[3..6] == b"ACK" {
                    match self.state {
                        HomebrewState::None => {}
                        HomebrewState::Init => self.send_config().await?,
                        HomebrewState::Config => {
                            self.state = HomebrewState::Done;
                            let now = Instant::now();
                            self.last_ping = now;
                            self.last_pong = now;
                        }
                        HomebrewState::Done => {}
                    }
                    Ok(None)
                } else if &buf[3..6] == b"NAK" {
                    self.state = HomebrewState::None;
                    Err(DmrError::AuthenticationFailure(
                        "master rejected login, NAK received".into(),
                    ))
                } else {
                    Ok(None)
                }
            }
            b'M' if len == 22 && &buf[3..6] == b"ACK" => {
                if self.state == HomebrewState::None {
                    self.nonce.copy_from_slice(&buf[14..22]);
                    self.send_key().await?;
                }
                Ok(None)
            }
            b'R' if len == 15 && &buf[3..7] == b"PONG" => {
                self.last_pong = Instant::now();
                Ok(None)
            }
            b'R' if len == 15 && &buf[3..7] == b"SBKN" => Ok(None),
            _ => Ok(None),
        }
    }

    async fn send(&mut self, packet: &ParsedPacket) -> Result<(), DmrError> {
        let raw = self.encode_dmrd(packet);
        self.send_raw(&raw).await
    }

    async fn tick(&mut self) -> Result<(), DmrError> {
        if self.pong_timed_out() {
            return Err(DmrError::Timeout(format!(
                "{}: no RPTPONG for over {PONG_TIMEOUT:?}",
                self.id
            )));
        }
        self.maybe_ping().await
    }
}
