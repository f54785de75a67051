//! # DMR Error Handling
//!
//! This module defines the `DmrError` enum, the single error type returned
//! by every fallible entry point in the crate. There is no thread-local
//! last-error string: every call that can fail returns a `Result`.

use thiserror::Error;

/// Represents the different error types that can occur in the DMR crate.
#[derive(Debug, Error)]
pub enum DmrError {
    /// Allocation or fixed-capacity buffer exhausted.
    #[error("out of memory")]
    OutOfMemory,

    /// A caller-supplied argument was out of range or otherwise invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested operation or configuration is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A read from a transport (serial, UDP) failed.
    #[error("read failure: {0}")]
    ReadFailure(String),

    /// A write to a transport (serial, UDP) failed.
    #[error("write failure: {0}")]
    WriteFailure(String),

    /// An FEC decoder exhausted its correction capability.
    #[error("uncorrectable FEC error in {0}")]
    FecUncorrectable(&'static str),

    /// A CRC or checksum did not match.
    #[error("CRC mismatch: expected {expected:04x}, calculated {calculated:04x}")]
    CrcMismatch { expected: u32, calculated: u32 },

    /// A transport's framing or state machine fell out of sync.
    #[error("protocol desync: {0}")]
    ProtocolDesync(String),

    /// Homebrew login handshake failed or was rejected by the master.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// A wall-clock deadline (e.g. a ping/pong keepalive) was exceeded.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A catch-all error for uncategorized cases.
    #[error("{0}")]
    Other(String),
}
