//! PEM block decoding and encoding.
//!
//! Decoding is lazy: [`blocks`] yields one [`PemBlock`] at a time and stops
//! at the first data that does not form a PEM block, so a trailing footer or
//! other junk after the last block is ignored.

use crate::util::base64_wrap;
use std::io::Cursor;
use x509_parser::pem::{Pem, PemIterator};

/// Label used for certificate blocks.
pub const CERTIFICATE: &str = "CERTIFICATE";

/// One decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// Text between `-----BEGIN ` and `-----`, e.g. `CERTIFICATE`.
    pub label: String,
    /// Base64-decoded payload.
    pub contents: Vec<u8>,
}

/// Iterator over the PEM blocks in a buffer. See [`blocks`].
pub struct Blocks<'a> {
    inner: PemIterator<Cursor<&'a [u8]>>,
    done: bool,
}

impl std::fmt::Debug for Blocks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blocks").field("done", &self.done).finish()
    }
}

impl Iterator for Blocks<'_> {
    type Item = PemBlock;

    fn next(&mut self) -> Option<PemBlock> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(pem)) => Some(PemBlock {
                label: pem.label,
                contents: pem.contents,
            }),
            Some(Err(e)) => {
                tracing::debug!("stopping PEM scan at undecodable data: {}", e);
                self.done = true;
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Scan `data` for PEM blocks, in order.
pub fn blocks(data: &[u8]) -> Blocks<'_> {
    Blocks {
        inner: Pem::iter_from_buffer(data),
        done: false,
    }
}

/// Encode `der` as a PEM block with the given label.
pub fn encode(label: &str, der: &[u8]) -> String {
    format!(
        "-----BEGIN {label}-----\n{}\n-----END {label}-----\n",
        base64_wrap(der)
    )
}

/// Encode DER certificate bytes as a `CERTIFICATE` PEM block.
pub fn der_to_pem(der: &[u8]) -> String {
    encode(CERTIFICATE, der)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_wraps_and_frames() {
        let pem = der_to_pem(&[0x30; 60]);
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines.first(), Some(&"-----BEGIN CERTIFICATE-----"));
        assert_eq!(lines.last(), Some(&"-----END CERTIFICATE-----"));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].len(), 64);
        assert!(pem.ends_with("-----\n"));
    }

    #[test]
    fn decode_reads_blocks_in_order() {
        let mut text = encode("CERTIFICATE", b"first");
        text.push_str(&encode("PRIVATE KEY", b"second"));
        let found: Vec<PemBlock> = blocks(text.as_bytes()).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].label, "CERTIFICATE");
        assert_eq!(found[0].contents, b"first");
        assert_eq!(found[1].label, "PRIVATE KEY");
        assert_eq!(found[1].contents, b"second");
    }

    #[test]
    fn trailing_junk_is_ignored() {
        let mut text = der_to_pem(b"payload");
        text.push_str("this is a footer, not PEM\n");
        let found: Vec<PemBlock> = blocks(text.as_bytes()).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].contents, b"payload");
    }

    #[test]
    fn no_blocks_in_plain_text() {
        assert_eq!(blocks(b"hello world\n").count(), 0);
        assert_eq!(blocks(b"").count(), 0);
    }

    #[test]
    fn scan_stops_at_broken_block() {
        let mut text = der_to_pem(b"ok");
        text.push_str("-----BEGIN CERTIFICATE-----\n!!!not base64!!!\n-----END CERTIFICATE-----\n");
        text.push_str(&der_to_pem(b"unreached"));
        let found: Vec<PemBlock> = blocks(text.as_bytes()).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].contents, b"ok");
    }
}
