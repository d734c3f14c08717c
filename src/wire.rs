//! Buffer-bounded message encoding.
//!
//! Messages are `serde` types packed with `hubpack`: fixed-width
//! little-endian integers, and one tag byte in front of every `Option` and
//! enum. Every message also implements [`SerializedSize`], so the worst-case
//! size of a message is known at compile time.

use hubpack::SerializedSize;
use serde::{de::DeserializeOwned, Serialize};

use crate::{Error, Result};

/// Encode `message` into `buffer`, returning the number of bytes written.
///
/// Fails with [`Error::CapacityExceeded`] if the encoding doesn't fit. The
/// contents of `buffer` are unspecified after a failure.
pub fn encode<M: Serialize>(message: &M, buffer: &mut [u8]) -> Result<usize> {
    hubpack::serialize(buffer, message).map_err(|err| match err {
        hubpack::Error::Overrun => Error::CapacityExceeded,
        // Messages are built from fixed-size types only, so anything other
        // than running out of room means the message itself is unencodable.
        _ => Error::MalformedInput,
    })
}

/// Decode a message from exactly `bytes`.
///
/// Presence in the decoded message matches the wire: a field is `Some` only
/// if it was transmitted. Truncated input, invalid tags, and trailing bytes
/// are all [`Error::MalformedInput`]; nothing of a failed decode is returned.
pub fn decode<M: DeserializeOwned>(bytes: &[u8]) -> Result<M> {
    match hubpack::deserialize::<M>(bytes) {
        Ok((message, [])) => Ok(message),
        Ok((_, rest)) => {
            log::warn!("{} trailing bytes after message", rest.len());
            Err(Error::MalformedInput)
        }
        Err(err) => {
            log::warn!("message decode failed: {:?}", err);
            Err(Error::MalformedInput)
        }
    }
}

/// Worst-case encoded size of `M`.
pub const fn max_size<M: SerializedSize>() -> usize {
    M::MAX_SIZE
}
