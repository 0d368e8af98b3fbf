//! Frame encoding for realtime channels.
//!
//! Handlers hold a [`Codec`] rather than calling `serde_json` directly, so
//! the event types stay independent of the wire format.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Turns events into frame payloads and payloads back into events.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Fails with [`ProtocolError::Decode`] on malformed input or when the
    /// payload does not describe a `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// `{"event": .., "data": ..}` JSON text, as the browser client sends it.
///
/// ```rust
/// use covey_protocol::{Codec, JsonCodec, PlayerId, TownEvent};
///
/// let event = TownEvent::PlayerDisconnect { id: PlayerId::from("p1") };
/// let bytes = JsonCodec.encode(&event).unwrap();
/// assert_eq!(JsonCodec.decode::<TownEvent>(&bytes).unwrap(), event);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Direction, TownInbound, UserLocation};

    #[test]
    fn test_decode_inbound_movement_from_client_json() {
        let raw = br#"{"event":"playerMovement","data":{"x":10.5,"y":3,"rotation":"left","moving":true}}"#;

        let msg: TownInbound = JsonCodec.decode(raw).expect("should decode");

        assert_eq!(
            msg,
            TownInbound::PlayerMovement(UserLocation {
                x: 10.5,
                y: 3.0,
                rotation: Direction::Left,
                moving: true,
            })
        );
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<TownInbound, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_unknown_rotation_returns_error() {
        let raw = br#"{"event":"playerMovement","data":{"x":0,"y":0,"rotation":"up","moving":false}}"#;
        let result: Result<TownInbound, _> = JsonCodec.decode(raw);
        assert!(result.is_err(), "rotation must be one of four directions");
    }
}
