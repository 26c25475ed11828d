//! Attendance token codec.
//!
//! A token is the plain concatenation of single-character event codes in
//! insertion order. No separators, no escaping: codes are drawn from an
//! alphabet disjoint from [`RESERVED`]. Decoding never fails; validation
//! against the catalog happens at render time.

/// Characters used by the postback envelope; never valid event codes.
pub const RESERVED: [char; 2] = [':', '&'];

pub fn encode(codes: &[char]) -> String {
    codes.iter().collect()
}

pub fn decode(token: &str) -> Vec<char> {
    token.chars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_order() {
        assert_eq!(encode(&['D', 'C', 'H']), "DCH");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_keeps_unknown_characters() {
        assert_eq!(decode("C?D"), vec!['C', '?', 'D']);
    }

    #[test]
    fn test_decode_is_stable_after_reencoding() {
        for token in ["", "C", "CDH", "CCD", "主C"] {
            let codes = decode(token);
            assert_eq!(decode(&encode(&codes)), codes);
        }
    }
}
