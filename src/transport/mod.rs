//! The two concrete DMR transports: [`homebrew`] (UDP IP Site Connect) and
//! [`mmdvm`] (serial hotspot modem).
//!
//! Both transports produce and consume [`crate::packet::ParsedPacket`]; the
//! repeater core treats them through the [`Transport`] trait so routing
//! logic does not need to know which concrete wire format it is bridging.

pub mod homebrew;
pub mod mmdvm;

use crate::error::DmrError;
use crate::packet::ParsedPacket;
use async_trait::async_trait;

/// A transport that can hand the core a parsed packet and accept one to
/// send back out, with no knowledge of the core's routing policy.
#[async_trait]
pub trait Transport: Send {
    /// A short, stable name used in log lines (e.g. `"homebrew[312000]"`).
    fn name(&self) -> &str;

    /// Reads and processes the next unit of transport traffic. Returns
    /// `Ok(Some(packet))` for a DMR burst, `Ok(None)` for protocol
    /// housekeeping traffic that produced no packet, and `Err` when the
    /// transport should be torn down (I/O failure, auth failure, timeout).
    async fn recv(&mut self) -> Result<Option<ParsedPacket>, DmrError>;

    /// Sends `packet` out over this transport.
    async fn send(&mut self, packet: &ParsedPacket) -> Result<(), DmrError>;

    /// Services wall-clock-driven housekeeping independent of `recv`/
    /// `send` (ping/pong keepalive, status polling, retry-on-no-ack).
    /// The caller drives this on its own timer tick. Default is a no-op;
    /// `Err` tears the transport down exactly like `recv`.
    async fn tick(&mut self) -> Result<(), DmrError> {
        Ok(())
    }
}
