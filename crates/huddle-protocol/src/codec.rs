//! Codec trait and implementations for serializing/deserializing events.
//!
//! The lobby never cares HOW an event becomes bytes, only that something
//! implements [`Codec`]. [`CborCodec`] is the production wire format: a
//! compact binary encoding that is still self-describing (field names and
//! types travel with the data), which is what lets decoders skip unknown
//! fields. [`JsonCodec`] produces the same shapes as text and is handy for
//! debugging.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec value is shared by every
/// connection task and by the lobby task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// truncated, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// CborCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses CBOR (RFC 8949) via `ciborium`.
///
/// ## Example
///
/// ```rust
/// use huddle_protocol::{CborCodec, Codec, LobbyEvent};
///
/// let codec = CborCodec;
/// let event = LobbyEvent::NewPlayer { name: "Alice".into() };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: LobbyEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        ciborium::into_writer(value, &mut out)
            .map_err(|e| ProtocolError::Encode(Box::new(e)))?;
        Ok(out)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        ciborium::from_reader(data).map_err(|e| ProtocolError::Decode(Box::new(e)))
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(Box::new(e)))
    }
}
