//! Error types for the protocol layer.
//!
//! Each crate in Huddle defines its own error enum. A `ProtocolError` always
//! means the problem is in turning events into bytes or back, never in
//! networking or lobby state.

/// The underlying serializer/deserializer error, whichever codec raised it.
pub type BoxedCodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] BoxedCodecError),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: bytes that are not the codec's format at all, a
    /// truncated frame, a missing required field for the event's tag, or a
    /// field of the wrong type.
    #[error("decode failed: {0}")]
    Decode(#[source] BoxedCodecError),
}
