//! Snapshot envelope: a captured state as self-describing, checksummed bytes.
//!
//! Layout (little-endian):
//! [ magic: u32 "SNAP" ][ version: u16 ][ codec: u8 ][ reserved: u8 ]
//! [ uncompressed_len: u64 ][ payload_len: u64 ]
//! [ payload bytes … ][ blake3(header || payload): 32 bytes ]
//!
//! The payload is the JSON encoding of a `Resumable::State`, compressed with
//! the header's codec.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::hash::Hash256;
use snapiter_core::Resumable;

use crate::codec::{self, Codec};
use crate::error::{Error, Result};

pub const MAGIC: u32 = u32::from_le_bytes(*b"SNAP");
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 8;
pub const CHECKSUM_LEN: usize = 32;

/// Default cap on encoded and decoded sizes (matches `SnapiterConfig`).
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u16,
    pub codec: Codec,
    pub uncompressed_len: u64,
    pub payload_len: u64,
}

impl SnapshotHeader {
    pub fn new(codec: Codec, uncompressed_len: u64, payload_len: u64) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            codec,
            uncompressed_len,
            payload_len,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.codec as u8);
        out.push(0u8); // reserved
        out.extend_from_slice(&self.uncompressed_len.to_le_bytes());
        out.extend_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::BadHeader(format!(
                "short header: {} of {HEADER_LEN} bytes",
                bytes.len()
            )));
        }
        let magic = u32::from_le_bytes(le_array(&bytes[0..4])?);
        let version = u16::from_le_bytes(le_array(&bytes[4..6])?);
        if magic != MAGIC {
            return Err(Error::BadHeader(format!("bad magic {magic:#010x}")));
        }
        if version != VERSION {
            return Err(Error::BadHeader(format!("unsupported version {version}")));
        }
        let codec = Codec::from_u8(bytes[6])?;
        // bytes[7] reserved
        let uncompressed_len = u64::from_le_bytes(le_array(&bytes[8..16])?);
        let payload_len = u64::from_le_bytes(le_array(&bytes[16..24])?);

        Ok(Self {
            magic,
            version,
            codec,
            uncompressed_len,
            payload_len,
        })
    }

    /// Reject sizes that would cause excessive allocations on decode.
    pub fn validate_sizes(&self, max_bytes: u64) -> Result<()> {
        if self.uncompressed_len > max_bytes {
            return Err(Error::TooLarge {
                len: self.uncompressed_len,
                max: max_bytes,
            });
        }
        if self.payload_len > max_bytes {
            return Err(Error::TooLarge {
                len: self.payload_len,
                max: max_bytes,
            });
        }
        if self.codec == Codec::None && self.payload_len != self.uncompressed_len {
            return Err(Error::BadHeader(
                "payload_len != uncompressed_len for uncompressed payload".into(),
            ));
        }
        Ok(())
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| Error::BadHeader("truncated field".into()))
}

/// A captured producer state, encoded and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    header: SnapshotHeader,
    payload: Vec<u8>,
    checksum: [u8; 32],
}

impl Snapshot {
    /// Capture `producer` and encode its state with `codec`.
    pub fn capture<P: Resumable>(producer: &P, codec: Codec) -> Result<Self> {
        let state = producer.capture()?;
        Self::from_state(&state, codec, DEFAULT_MAX_BYTES)
    }

    /// Encode an already captured state, refusing anything over `max_bytes`.
    pub fn from_state<S: Serialize>(state: &S, codec: Codec, max_bytes: u64) -> Result<Self> {
        let json =
            serde_json::to_vec(state).map_err(|e| Error::Serde(format!("json serialize: {e}")))?;
        let uncompressed_len = json.len() as u64;
        let payload = codec::compress(codec, &json)?;
        let payload_len = payload.len() as u64;

        let total = (HEADER_LEN + CHECKSUM_LEN) as u64 + payload_len;
        if total > max_bytes || uncompressed_len > max_bytes {
            return Err(Error::TooLarge {
                len: total.max(uncompressed_len),
                max: max_bytes,
            });
        }

        let header = SnapshotHeader::new(codec, uncompressed_len, payload_len);
        let checksum = checksum_of(&header.to_bytes(), &payload);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            codec = codec.name(),
            uncompressed_len,
            payload_len,
            "encoded snapshot"
        );

        Ok(Self {
            header,
            payload,
            checksum,
        })
    }

    /// Decode the state and rebuild the producer it was captured from.
    pub fn restore<P: Resumable>(&self) -> Result<P> {
        let state: P::State = self.state()?;
        let producer = P::restore(state)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(fingerprint = %self.fingerprint(), "restored producer from snapshot");
        Ok(producer)
    }

    /// Decode the raw state without rebuilding a producer.
    pub fn state<S: DeserializeOwned>(&self) -> Result<S> {
        let json = codec::decompress(self.header.codec, &self.payload)?;
        if json.len() as u64 != self.header.uncompressed_len {
            return Err(Error::Codec(format!(
                "decoded {} bytes, header says {}",
                json.len(),
                self.header.uncompressed_len
            )));
        }
        serde_json::from_slice(&json).map_err(|e| Error::Serde(format!("json deserialize: {e}")))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = self.header.to_bytes();
        let mut out = Vec::with_capacity(header.len() + self.payload.len() + CHECKSUM_LEN);
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(&self.checksum);
        out
    }

    /// Parse and verify an envelope with the default size cap.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_limited(bytes, DEFAULT_MAX_BYTES)
    }

    /// Parse and verify an envelope. The checksum is verified before the
    /// payload is trusted.
    pub fn from_bytes_limited(bytes: &[u8], max_bytes: u64) -> Result<Self> {
        let header = SnapshotHeader::from_bytes(bytes)?;
        header.validate_sizes(max_bytes)?;

        let payload_end = HEADER_LEN + header.payload_len as usize;
        let expected = payload_end + CHECKSUM_LEN;
        if bytes.len() != expected {
            return Err(Error::BadHeader(format!(
                "envelope is {} bytes, header implies {expected}",
                bytes.len()
            )));
        }

        let payload = &bytes[HEADER_LEN..payload_end];
        let stored: [u8; 32] = bytes[payload_end..]
            .try_into()
            .map_err(|_| Error::BadHeader("truncated checksum".into()))?;
        if checksum_of(&bytes[..HEADER_LEN], payload) != stored {
            return Err(Error::ChecksumMismatch);
        }

        Ok(Self {
            header,
            payload: payload.to_vec(),
            checksum: stored,
        })
    }

    pub fn header(&self) -> &SnapshotHeader {
        &self.header
    }

    pub fn codec(&self) -> Codec {
        self.header.codec
    }

    pub fn checksum(&self) -> [u8; 32] {
        self.checksum
    }

    /// Size of `to_bytes()`.
    pub fn encoded_len(&self) -> u64 {
        (HEADER_LEN + CHECKSUM_LEN) as u64 + self.header.payload_len
    }

    /// Content hash of the envelope; equal fingerprints mean equal states.
    pub fn fingerprint(&self) -> Hash256 {
        Hash256(self.checksum)
    }
}

fn checksum_of(header: &[u8], payload: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(header);
    hasher.update(payload);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapiter_core::range::RangeProducer;
    use snapiter_core::sequence::SequenceProducer;
    use snapiter_core::{Producer, RangeSpec};

    #[test]
    fn header_layout_is_stable() {
        let h = SnapshotHeader::new(Codec::None, 10, 10);
        let bytes = h.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[0..4], b"SNAP");
        assert_eq!(SnapshotHeader::from_bytes(&bytes).unwrap(), h);
    }

    #[test]
    fn bytes_round_trip_resumes_producer() {
        let mut p = RangeProducer::new(RangeSpec::new(0, 10, 2).unwrap());
        p.next().unwrap();
        p.next().unwrap();

        let snap = Snapshot::capture(&p, Codec::None).unwrap();
        let bytes = snap.to_bytes();
        assert_eq!(bytes.len() as u64, snap.encoded_len());

        let back = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(back, snap);
        let mut q: RangeProducer = back.restore().unwrap();
        assert_eq!(q.drain_vec().unwrap(), vec![4, 6, 8]);
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let p = SequenceProducer::new(vec![1u32, 2, 3]);
        let mut bytes = Snapshot::capture(&p, Codec::None).unwrap().to_bytes();
        bytes[HEADER_LEN + 1] ^= 0xff;
        assert!(matches!(Snapshot::from_bytes(&bytes), Err(Error::ChecksumMismatch)));
    }

    #[test]
    fn truncated_and_foreign_bytes_are_rejected() {
        let p = SequenceProducer::new(vec![1u32]);
        let bytes = Snapshot::capture(&p, Codec::None).unwrap().to_bytes();
        assert!(matches!(
            Snapshot::from_bytes(&bytes[..bytes.len() - 1]),
            Err(Error::BadHeader(_))
        ));
        assert!(matches!(Snapshot::from_bytes(b"nope"), Err(Error::BadHeader(_))));

        let mut foreign = bytes.clone();
        foreign[0] = b'X';
        assert!(matches!(Snapshot::from_bytes(&foreign), Err(Error::BadHeader(_))));
    }

    #[test]
    fn size_cap_applies_to_encode_and_decode() {
        let p = SequenceProducer::new(vec![0u64; 64]);
        let state = p.capture().unwrap();
        assert!(matches!(
            Snapshot::from_state(&state, Codec::None, 16),
            Err(Error::TooLarge { .. })
        ));
        let bytes = Snapshot::from_state(&state, Codec::None, DEFAULT_MAX_BYTES)
            .unwrap()
            .to_bytes();
        assert!(matches!(
            Snapshot::from_bytes_limited(&bytes, 16),
            Err(Error::TooLarge { .. })
        ));
    }

    #[test]
    fn restoring_into_wrong_type_fails_cleanly() {
        let p = SequenceProducer::new(vec!["a".to_string()]);
        let snap = Snapshot::capture(&p, Codec::None).unwrap();
        assert!(snap.restore::<RangeProducer>().is_err());
    }
}
