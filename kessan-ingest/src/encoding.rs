//! Text-encoding detection for exports that may not be UTF-8.

use kessan_core::ParseError;

use crate::types::TextEncoding;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Pick the encoding to read `bytes` with.
///
/// The first candidate that decodes the whole buffer wins. Failing that, the
/// first candidate that decodes the header line is used and malformed rows
/// are reported one by one.
pub fn detect(bytes: &[u8], candidates: &[TextEncoding]) -> Result<TextEncoding, ParseError> {
    if let Some(enc) = candidates.iter().find(|enc| enc.decode(bytes).is_some()) {
        return Ok(*enc);
    }

    let header = header_line(bytes);
    candidates
        .iter()
        .find(|enc| enc.decode(header).is_some())
        .copied()
        .ok_or_else(|| ParseError::MalformedEncoding {
            tried: candidates
                .iter()
                .map(|enc| enc.label())
                .collect::<Vec<_>>()
                .join(" or "),
        })
}

fn header_line(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|b| *b == b'\n') {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;

    const BOTH: &[TextEncoding] = &[TextEncoding::Utf8, TextEncoding::ShiftJis];

    fn sjis(s: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = SHIFT_JIS.encode(s);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_utf8_preferred() {
        let text = "注文番号,注文日\n1,2024/06/01\n";
        assert_eq!(detect(text.as_bytes(), BOTH), Ok(TextEncoding::Utf8));
    }

    #[test]
    fn test_shift_jis_fallback() {
        let bytes = sjis("注文番号,注文日\n1,2024/06/01\n");
        assert!(std::str::from_utf8(&bytes).is_err());
        assert_eq!(detect(&bytes, BOTH), Ok(TextEncoding::ShiftJis));
    }

    #[test]
    fn test_header_decides_when_body_is_broken() {
        let mut bytes = b"orderId,orderedAt\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, b',', b'x', b'\n']);
        assert_eq!(
            detect(&bytes, &[TextEncoding::Utf8]),
            Ok(TextEncoding::Utf8)
        );
    }

    #[test]
    fn test_unreadable_header() {
        let bytes = [0xFF, 0xFF, b',', 0xFF, b'\n'];
        assert_eq!(
            detect(&bytes, BOTH),
            Err(ParseError::MalformedEncoding {
                tried: "UTF-8 or Shift_JIS".to_string()
            })
        );
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBFabc"), b"abc");
        assert_eq!(strip_bom(b"abc"), b"abc");
    }
}
