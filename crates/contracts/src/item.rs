//! Item and Limits - the data handed to and reported by a processor

use bytes::Bytes;
use std::time::Duration;

/// Opaque unit of work.
///
/// The dispatcher never looks inside the payload; only the position of the
/// item in the input sequence matters to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item {
    payload: Bytes,
}

impl Item {
    /// Create an item from raw bytes
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Raw payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl From<Bytes> for Item {
    fn from(payload: Bytes) -> Self {
        Self::new(payload)
    }
}

impl From<Vec<u8>> for Item {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<&str> for Item {
    fn from(payload: &str) -> Self {
        Self::new(Bytes::copy_from_slice(payload.as_bytes()))
    }
}

impl From<String> for Item {
    fn from(payload: String) -> Self {
        Self::new(payload.into_bytes())
    }
}

/// Throughput limits reported by a processor before every batch.
///
/// Both values may change between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of items accepted in one call
    pub max_batch_size: usize,
    /// Minimum time between the start of two consecutive calls
    pub min_period: Duration,
}

impl Limits {
    pub fn new(max_batch_size: usize, min_period: Duration) -> Self {
        Self {
            max_batch_size,
            min_period,
        }
    }

    /// Number of items to take from `remaining` pending items
    #[inline]
    pub fn batch_len(&self, remaining: usize) -> usize {
        self.max_batch_size.min(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_conversions() {
        let a = Item::from("hello");
        let b = Item::from(b"hello".to_vec());
        let c = Item::from(String::from("hello"));

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.len(), 5);
        assert_eq!(a.payload().as_ref(), b"hello");
        assert!(Item::default().is_empty());
    }

    #[test]
    fn test_batch_len_clamps_to_remaining() {
        let limits = Limits::new(10, Duration::from_millis(5));
        assert_eq!(limits.batch_len(3), 3);
        assert_eq!(limits.batch_len(25), 10);
        assert_eq!(Limits::new(0, Duration::ZERO).batch_len(7), 0);
    }
}
