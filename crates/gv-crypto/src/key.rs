//! Master key: 256-bit AES-GCM key supplied as 64 lowercase hex characters.

use zeroize::Zeroize;

use gv_core::{GvError, GvResult};

use crate::KEY_SIZE;

/// The repository-wide AES-256-GCM key.
///
/// Parsed from hex once per invocation, never persisted by this crate, and
/// zeroized on drop.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Parse a key from its canonical form: exactly 64 lowercase hex chars.
    pub fn from_hex(raw: &str) -> GvResult<Self> {
        let raw = raw.trim();
        if raw.len() != KEY_SIZE * 2 {
            return Err(GvError::InvalidKey);
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(GvError::InvalidKey);
        }
        let mut bytes = [0u8; KEY_SIZE];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| GvError::InvalidKey)?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_key() {
        let hex = "0f".repeat(32);
        let key = MasterKey::from_hex(&hex).unwrap();
        assert_eq!(key.as_bytes()[0], 0x0f);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            MasterKey::from_hex("abcd"),
            Err(GvError::InvalidKey)
        ));
        assert!(matches!(
            MasterKey::from_hex(&"00".repeat(33)),
            Err(GvError::InvalidKey)
        ));
    }

    #[test]
    fn rejects_non_hex_and_uppercase() {
        assert!(MasterKey::from_hex(&"zz".repeat(32)).is_err());
        assert!(MasterKey::from_hex(&"AB".repeat(32)).is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let hex = format!("  {}\n", "a1".repeat(32));
        assert!(MasterKey::from_hex(&hex).is_ok());
    }

    #[test]
    fn debug_is_redacted() {
        let key = MasterKey::from_hex(&"ab".repeat(32)).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("ab"));
    }
}
