//! Folding a button press into a new token.
//!
//! Pressing a toggle appends its code once; pressing it again leaves the
//! token unchanged, so a token never holds the same code twice. There is no
//! per-code removal: reset clears the whole token.

use crate::codec;

pub fn apply(token: &str, code: char) -> String {
    let mut codes = codec::decode(token);
    if !codes.contains(&code) {
        codes.push(code);
    }
    codec::encode(&codes)
}

pub fn reset() -> String {
    codec::encode(&[])
}
