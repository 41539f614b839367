//! Error type shared by both cursors.

use thiserror::Error;

/// Error type for TBuffer encoding and decoding operations.
///
/// Each buffer keeps at most one of these as its sticky error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RBytesError {
    #[error("rbytes: unexpected end of buffer (pos={pos} want={want} have={have})")]
    Eof { pos: i64, want: usize, have: i64 },
    #[error(
        "rbytes: read too many bytes. got={got}, want={want} (pos={pos} count={count} start={start}) [class={class:?}]"
    )]
    TooManyBytes {
        got: i64,
        want: i64,
        pos: i64,
        count: i32,
        start: i64,
        class: String,
    },
    #[error(
        "rbytes: read too few bytes. got={got}, want={want} (pos={pos} count={count} start={start}) [class={class:?}]"
    )]
    TooFewBytes {
        got: i64,
        want: i64,
        pos: i64,
        count: i32,
        start: i64,
        class: String,
    },
    #[error("rbytes: invalid {class} version: got={got}, want={want}")]
    InvalidVersion { class: String, got: i16, want: i16 },
    #[error("rbytes: invalid element count {count} for {class}")]
    InvalidCount { class: String, count: i32 },
    #[error("rbytes: invalid tag [{0}] found")]
    UnresolvedReference(i64),
    #[error("rbytes: invalid tag [{0}] found (not an object)")]
    NotAnObject(i64),
    #[error("rbytes: invalid class-tag reference [{0}] found")]
    UnresolvedClass(i64),
    #[error("rbytes: invalid class-tag reference [{0}] found (not a class)")]
    NotAClass(i64),
    #[error("rbytes: no factory registered for class {0:?}")]
    UnknownClass(String),
    #[error("rbytes: tag == 1 means 'self'. not implemented yet")]
    SelfReference,
    #[error("rbytes: no streamers")]
    NoStreamers,
    #[error("rbytes: no streamer info for {name:?} (version={version})")]
    UnknownStreamer { name: String, version: i32 },
    #[error("rbytes: invalid position {0}")]
    InvalidPosition(i64),
    #[error("rbytes: byte count too large for {class:?} ({count} bytes)")]
    ByteCountTooLarge { class: String, count: i64 },
    #[error("rbytes: {class}: {reason}")]
    Object { class: String, reason: String },
}

impl RBytesError {
    /// Builds an object-level error for a class-specific streamer.
    pub fn object(class: impl Into<String>, reason: impl Into<String>) -> Self {
        RBytesError::Object {
            class: class.into(),
            reason: reason.into(),
        }
    }
}
