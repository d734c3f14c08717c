//! Codec errors and RPC status codes.

/// Register codec errors.
///
/// Every error is reported before the failing step touches hardware. An
/// update that spans several registers is not transactional, though: writes
/// that completed before the error stay in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Wire bytes don't parse against the expected message.
    MalformedInput,
    /// The encoded message doesn't fit in the destination buffer.
    CapacityExceeded,
    /// An update supplied more than one layout for the same register word.
    ConflictingVariant,
    /// The channel, unit, or timer index doesn't exist on this part.
    OutOfRange,
}

impl Error {
    /// The status code reported to the remote caller.
    ///
    /// Always negative; `0` is reserved for success.
    pub const fn code(self) -> i8 {
        match self {
            Error::MalformedInput => -1,
            Error::CapacityExceeded => -2,
            Error::ConflictingVariant => -3,
            Error::OutOfRange => -4,
        }
    }
}

/// Collapse an update result into the status code returned over RPC.
pub fn status(result: crate::Result<()>) -> i8 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_distinct_and_negative() {
        let all = [
            Error::MalformedInput,
            Error::CapacityExceeded,
            Error::ConflictingVariant,
            Error::OutOfRange,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(a.code() < 0);
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
        assert_eq!(status(Ok(())), 0);
        assert_eq!(status(Err(Error::MalformedInput)), -1);
    }
}
