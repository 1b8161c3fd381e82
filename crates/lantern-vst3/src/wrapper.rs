//! VST3-specific plugin configuration.
//!
//! Complements the format-independent [`lantern_core::Config`].

use vst3::Steinberg::TUID;

/// VST3 class identity.
///
/// ```ignore
/// pub static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Vst3Config {
    /// Class ID of the combined component.
    pub component_uid: TUID,
}

impl Vst3Config {
    /// Parse a UUID in the form `"XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"`.
    ///
    /// Fails to compile when used in a `static` with a malformed UUID.
    pub const fn new(uuid: &'static str) -> Self {
        Self {
            component_uid: parse_uuid(uuid),
        }
    }
}

const fn hex_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("invalid hex character in UUID"),
    }
}

// Reads eight hex digits starting at `start`, skipping dashes.
const fn parse_u32(bytes: &[u8], start: usize) -> u32 {
    let mut result: u32 = 0;
    let mut i = 0;
    let mut digits = 0;
    while digits < 8 {
        let c = bytes[start + i];
        if c != b'-' {
            result = (result << 4) | (hex_to_u8(c) as u32);
            digits += 1;
        }
        i += 1;
    }
    result
}

const fn parse_uuid(uuid: &str) -> TUID {
    let bytes = uuid.as_bytes();
    if bytes.len() != 36 {
        panic!("UUID must have 36 characters");
    }
    vst3::uid(
        parse_u32(bytes, 0),
        parse_u32(bytes, 9),
        parse_u32(bytes, 19),
        parse_u32(bytes, 28),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_uid_words() {
        let config = Vst3Config::new("DCDDB4BA-2D6A-4EC3-A526-D3E7244FAAE3");
        let expected = vst3::uid(0xDCDDB4BA, 0x2D6A4EC3, 0xA526D3E7, 0x244FAAE3);
        assert_eq!(config.component_uid, expected);
    }

    #[test]
    fn test_lowercase_hex() {
        let upper = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
        let lower = Vst3Config::new("6e1b3c52-8f0a-4d7b-9c21-5a4f0e7d3b19");
        assert_eq!(upper.component_uid, lower.component_uid);
    }

    #[test]
    #[should_panic]
    fn test_rejects_short_uuid() {
        let _ = Vst3Config::new("6E1B3C52-8F0A");
    }
}
