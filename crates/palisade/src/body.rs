//! Replayable request bodies
//!
//! A request body is captured into memory exactly once, at intent
//! construction time, and every physical attempt reads the same bytes from
//! offset zero. Capturing is bounded by available memory; bodies are never
//! re-streamed from their original source.

use bytes::Bytes;
use serde::Serialize;

use crate::error::HttpClientError;

/// A request payload captured once and re-readable on every attempt
///
/// The captured buffer is shared, not copied: handing the body to an attempt
/// clones a reference-counted handle, which is what makes the replay safe
/// and cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayBody {
    bytes: Bytes,
}

impl ReplayBody {
    /// An empty body (GET requests, bodyless DELETEs)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture a byte sequence as the request payload
    ///
    /// The source is consumed here, exactly once; callers must not read it
    /// again directly.
    pub fn capture(data: impl Into<Bytes>) -> Self {
        Self { bytes: data.into() }
    }

    /// Serialize a value to JSON and capture it
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HttpClientError> {
        let data = serde_json::to_vec(value)?;
        Ok(Self::capture(data))
    }

    /// Whether this body is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the captured payload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The full payload, starting from byte zero
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Borrow the captured payload
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for ReplayBody {
    fn from(value: &str) -> Self {
        Self::capture(value.to_owned())
    }
}

impl From<String> for ReplayBody {
    fn from(value: String) -> Self {
        Self::capture(value)
    }
}

impl From<Vec<u8>> for ReplayBody {
    fn from(value: Vec<u8>) -> Self {
        Self::capture(value)
    }
}

impl From<&[u8]> for ReplayBody {
    fn from(value: &[u8]) -> Self {
        Self::capture(value.to_vec())
    }
}

impl From<Bytes> for ReplayBody {
    fn from(value: Bytes) -> Self {
        Self::capture(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_empty_body() {
        let body = ReplayBody::empty();
        assert!(body.is_empty());
        assert_eq!(body.len(), 0);
    }

    #[test]
    fn test_capture_and_replay_identical_bytes() {
        let body = ReplayBody::capture("payload");

        // Every read observes the same bytes from offset zero.
        let first = body.to_bytes();
        let second = body.to_bytes();
        assert_eq!(first, second);
        assert_eq!(&first[..], b"payload");
    }

    #[test]
    fn test_clone_shares_buffer() {
        let body = ReplayBody::capture(vec![1u8, 2, 3]);
        let cloned = body.clone();
        assert_eq!(body.to_bytes(), cloned.to_bytes());
    }

    #[test]
    fn test_json_body() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
            count: u32,
        }

        let body = ReplayBody::json(&Payload {
            name: "widget",
            count: 3,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(body.as_slice()).unwrap();
        assert_eq!(value["name"], "widget");
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(ReplayBody::from("a").as_slice(), b"a");
        assert_eq!(ReplayBody::from("a".to_string()).as_slice(), b"a");
        assert_eq!(ReplayBody::from(vec![b'a']).as_slice(), b"a");
        assert_eq!(ReplayBody::from(&b"a"[..]).as_slice(), b"a");
    }
}
