//! Incremental gzip decoding for the response body

use std::io::Write;

use bytes::Bytes;
use flate2::write::GzDecoder;

use crate::error::{Result, StreamError};

/// Inflates gzip-encoded body chunks as they arrive.
///
/// One decoder instance lives for the lifetime of one connection: gzip
/// state carries across chunk boundaries, so a frame split mid-chunk by the
/// transport inflates correctly once the rest arrives. When the response is
/// not gzip-encoded, [`feed`](Self::feed) is the identity function.
pub struct GzipFrameDecoder {
    inner: Option<GzDecoder<Vec<u8>>>,
}

impl GzipFrameDecoder {
    /// Create a decoder; `is_gzip` comes from the response's
    /// `content-encoding` header.
    pub fn new(is_gzip: bool) -> Self {
        Self {
            inner: is_gzip.then(|| GzDecoder::new(Vec::new())),
        }
    }

    pub fn is_gzip(&self) -> bool {
        self.inner.is_some()
    }

    /// Feed one raw chunk, returning whatever decoded bytes it yields.
    ///
    /// An empty result is normal: a chunk may end in the middle of a
    /// compressed block. Malformed compressed data fails with
    /// [`StreamError::Decompress`], which forces a full reconnect upstream.
    pub fn feed(&mut self, raw: Bytes) -> Result<Bytes> {
        let Some(decoder) = self.inner.as_mut() else {
            return Ok(raw);
        };

        decoder
            .write_all(&raw)
            .and_then(|_| decoder.flush())
            .map_err(|err| StreamError::Decompress(err.to_string()))?;

        Ok(Bytes::from(std::mem::take(decoder.get_mut())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use pretty_assertions::assert_eq;

    fn gzip(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_identity_when_not_gzip() {
        let mut decoder = GzipFrameDecoder::new(false);
        let out = decoder.feed(Bytes::from_static(b"plain bytes")).unwrap();
        assert_eq!(&out[..], b"plain bytes");
    }

    #[test]
    fn test_inflates_across_chunk_boundaries() {
        let payload = b"{\"id\":1}\r\n{\"id\":2}\r\n".repeat(50);
        let compressed = gzip(&payload);
        let split = compressed.len() / 3;

        let mut decoder = GzipFrameDecoder::new(true);
        let mut out = Vec::new();
        out.extend_from_slice(&decoder.feed(Bytes::copy_from_slice(&compressed[..split])).unwrap());
        out.extend_from_slice(&decoder.feed(Bytes::copy_from_slice(&compressed[split..])).unwrap());

        assert_eq!(out, payload);
    }

    #[test]
    fn test_empty_frame_yields_empty_without_error() {
        let mut decoder = GzipFrameDecoder::new(true);
        let out = decoder.feed(Bytes::new()).unwrap();
        assert!(out.is_empty());

        // A complete gzip member with no content also decodes to nothing
        let empty_member = gzip(b"");
        let out = decoder.feed(Bytes::from(empty_member)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_data_is_a_decompress_error() {
        let mut decoder = GzipFrameDecoder::new(true);
        let err = decoder
            .feed(Bytes::from_static(b"definitely not gzip"))
            .unwrap_err();
        assert!(matches!(err, StreamError::Decompress(_)));
    }
}
