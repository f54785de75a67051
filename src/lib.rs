//! # dmr-core — a DMR (ETSI TS 102 361) baseband codec and repeater core
//!
//! This crate implements the bit-level codec and repeater pipeline for
//! Digital Mobile Radio: forward error correction for every burst field,
//! a typed view over the 33-byte burst, a parsed-packet model shared by
//! two concrete transports (Homebrew IP Site Connect over UDP, and
//! MMDVM over a serial hotspot modem), and a routing core that
//! de-duplicates streams, restores headers lost over a lossy transport,
//! and applies a caller-supplied routing policy.
//!
//! ## Features
//!
//! - Hamming, Golay, quadratic-residue, BPTC, Reed-Solomon and
//!   Trellis-3/4 codecs for every protected burst field
//! - A typed burst view: sync pattern, slot type, EMB, full link
//!   control, data header/blocks
//! - Homebrew (IP Site Connect) and MMDVM (serial modem) transports,
//!   both producing and consuming the same parsed-packet type
//! - A repeater routing core with pluggable routing policy
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! dmr-core = "0.1.0"
//! ```

pub mod bits;
pub mod burst;
pub mod constants;
pub mod crc;
pub mod error;
pub mod fec;
pub mod idmap;
pub mod logging;
pub mod packet;
pub mod queue;
pub mod reactor;
pub mod repeater;
pub mod transport;

pub use crate::error::DmrError;
pub use crate::logging::{init_logger, log_info};
pub use crate::packet::ParsedPacket;
pub use crate::repeater::{RepeaterCore, RoutingOutcome, RoutingPolicy};
pub use crate::transport::{homebrew::Homebrew, mmdvm::Mmdvm, Transport};
