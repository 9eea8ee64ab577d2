// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Encoding of values into opaque byte payloads.
//!
//! Backends that store bytes (a remote key-value service, a disk cache) use a
//! [`Codec`] to move between typed values and payloads. The orchestrator never
//! calls a codec itself.

use crate::Error;

/// Converts values to and from byte payloads.
///
/// Decoding an empty payload yields `Ok(None)` rather than an error, so a tier can
/// report "nothing stored" without a special case.
pub trait Codec<V>: Send + Sync {
    /// Encodes `value` into a byte payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this encoding.
    fn encode(&self, value: &V) -> Result<Vec<u8>, Error>;

    /// Decodes a byte payload back into a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid encoding of `V`.
    fn decode(&self, payload: &[u8]) -> Result<Option<V>, Error>;
}

/// A [`Codec`] that stores values as JSON documents.
///
/// # Examples
///
/// ```
/// use inception_tier::{Codec, JsonCodec};
///
/// let payload = JsonCodec.encode(&vec![1, 2, 3])?;
/// let decoded: Option<Vec<i32>> = JsonCodec.decode(&payload)?;
/// assert_eq!(decoded, Some(vec![1, 2, 3]));
/// # Ok::<(), inception_tier::Error>(())
/// ```
#[cfg(any(feature = "serde", test))]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(any(feature = "serde", test))]
impl<V> Codec<V> for JsonCodec
where
    V: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(value).map_err(Error::caused_by)
    }

    fn decode(&self, payload: &[u8]) -> Result<Option<V>, Error> {
        if payload.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(payload).map(Some).map_err(Error::caused_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Profile {
        id: u64,
        name: String,
    }

    #[test]
    fn json_codec_decodes_what_it_encodes() {
        let profile = Profile {
            id: 7,
            name: "ada".to_string(),
        };
        let payload = JsonCodec.encode(&profile).expect("encode failed");
        let decoded: Option<Profile> = JsonCodec.decode(&payload).expect("decode failed");
        assert_eq!(decoded, Some(profile));
    }

    #[test]
    fn json_codec_empty_payload_is_absent() {
        let decoded: Option<Profile> = JsonCodec.decode(&[]).expect("decode failed");
        assert!(decoded.is_none());
    }

    #[test]
    fn json_codec_garbage_payload_is_error() {
        let result: Result<Option<Profile>, Error> = JsonCodec.decode(b"\x00not json");
        assert!(result.is_err());
    }
}
