//! Shared encoding utilities.

use base64::Engine;

/// Format bytes as colon-separated lowercase hex (e.g., "1a:2b:3c").
///
/// An empty slice yields an empty string.
pub fn hex_colon(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Drop leading zero bytes from a big-endian integer encoding.
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes.get(start..).unwrap_or_default()
}

/// Encode bytes as base64 with PEM-style 64-character line wrapping.
pub(crate) fn base64_wrap(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(64)
        .filter_map(|c| std::str::from_utf8(c).ok())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hex_colon_pairs() {
        assert_eq!(hex_colon(&[0x1a, 0x2b, 0x3c]), "1a:2b:3c");
    }

    #[test]
    fn hex_colon_single_byte_has_no_separator() {
        assert_eq!(hex_colon(&[0x00]), "00");
    }

    #[test]
    fn hex_colon_empty() {
        assert_eq!(hex_colon(&[]), "");
    }

    #[test]
    fn hex_colon_length_and_no_trailing_colon() {
        for len in 0..64usize {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37) as u8).collect();
            let s = hex_colon(&bytes);
            assert_eq!(s.len(), 2 * len + len.saturating_sub(1), "len {}", len);
            assert!(!s.ends_with(':'));
            assert!(!s.starts_with(':'));
        }
    }

    #[test]
    fn strip_leading_zeros_keeps_significant_bytes() {
        assert_eq!(strip_leading_zeros(&[0, 0, 1, 0]), &[1, 0]);
        assert_eq!(strip_leading_zeros(&[0x80]), &[0x80]);
        assert_eq!(strip_leading_zeros(&[0, 0]), &[] as &[u8]);
        assert_eq!(strip_leading_zeros(&[]), &[] as &[u8]);
    }

    #[test]
    fn base64_wrap_breaks_at_64_columns() {
        let wrapped = base64_wrap(&[0u8; 100]);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 64);
        assert!(lines.iter().all(|l| l.len() <= 64));
    }
}
