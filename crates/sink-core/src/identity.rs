//! Message identities, the key shared by every chunk of one payload.
//!
//! Identities must stay unique across independent sender processes, so the
//! production source draws 128 random bits rather than counting. Sources are
//! injected into the publisher; tests supply deterministic ones.

use std::fmt;

use rand::RngCore;

/// Correlation key for all chunks of one payload, also used as the routing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Random version-4 identifier in the canonical 8-4-4-4-12 layout.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_random_bytes(bytes)
    }

    /// Format 16 random bytes as a version-4, RFC 4122 variant identifier.
    pub fn from_random_bytes(mut bytes: [u8; 16]) -> Self {
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        let h = hex::encode(bytes);
        Self(format!(
            "{}-{}-{}-{}-{}",
            &h[0..8],
            &h[8..12],
            &h[12..16],
            &h[16..20],
            &h[20..32]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies a fresh identity for each publish call.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> MessageId;
}

/// Default source: thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> MessageId {
        MessageId::random()
    }
}

impl<F> IdSource for F
where
    F: Fn() -> MessageId + Send + Sync,
{
    fn next_id(&self) -> MessageId {
        self()
    }
}
