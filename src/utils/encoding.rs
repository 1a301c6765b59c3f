use std::io::Read;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::read::GzDecoder;

/// Decode a base64-encoded, gzipped text blob.
///
/// Operators ship large CIDR lists through the property system as
/// `base64(gzip(text))` to stay under manifest size limits. Whitespace in the
/// base64 input (line-wrapped encoders) is ignored. Returns `None` when the
/// input is not valid base64, not gzip, or not UTF-8 so callers can fall back
/// to cleartext parsing.
pub fn decode_gzip_base64(input: &str) -> Option<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let compressed = STANDARD.decode(compact).ok()?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut text = String::new();
    decoder.read_to_string(&mut text).ok()?;
    Some(text)
}

/// Split free-form config text into trimmed, non-empty lines.
pub fn config_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};

    use super::*;

    fn gzip_and_b64(input: &str) -> String {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(input.as_bytes()).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn test_decode_round_trip() {
        let encoded = gzip_and_b64("10.0.0.0/8\n192.168.2.0/24\n");
        assert_eq!(
            decode_gzip_base64(&encoded).unwrap(),
            "10.0.0.0/8\n192.168.2.0/24\n"
        );
    }

    #[test]
    fn test_decode_ignores_line_wrapping() {
        let mut encoded = gzip_and_b64("10.0.0.0/8");
        encoded.insert(10, '\n');
        assert_eq!(decode_gzip_base64(&encoded).unwrap(), "10.0.0.0/8");
    }

    #[test]
    fn test_decode_rejects_cleartext() {
        assert!(decode_gzip_base64("10.0.0.0/8 192.168.2.0/24").is_none());
    }

    #[test]
    fn test_config_lines() {
        assert_eq!(
            config_lines("\n\n  line 1\nline 2  \n\n"),
            vec!["line 1", "line 2"]
        );
    }
}
