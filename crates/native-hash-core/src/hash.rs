// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Native hash values and the textual tokens that carry them.
//!
//! Input files spell hashes in whatever case and prefix style their producer
//! used. [`HashToken`] keeps that text untouched so artifacts that echo input
//! tokens stay byte-faithful, while [`HashToken::key`] gives the normalised
//! form used for every equality check and map lookup.

use std::fmt;
use std::str::FromStr;

/// Errors raised when text is not a hex hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// Token is empty, longer than 16 digits, or contains non-hex characters.
    #[error("[UNPARSABLE_HASH_TOKEN] {token:?} is not a 1-16 digit hex value")]
    Unparsable {
        /// The offending token, as written.
        token: String,
    },
}

/// A 64-bit native hash.
///
/// `Display` renders the 18-character literal form used in headers
/// (`0x` + 16 upper-case digits).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct HexHash(pub u64);

impl HexHash {
    /// Length of the rendered literal, `0x` prefix included.
    pub const LITERAL_LEN: usize = 18;

    /// Number of hex digits in the canonical rendering.
    pub const DIGITS: usize = 16;

    /// Raw numeric value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` for the all-zero hash.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The 16 upper-case digits without a prefix.
    pub fn digits(self) -> String {
        format!("{:016X}", self.0)
    }
}

impl fmt::Display for HexHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl FromStr for HexHash {
    type Err = HashError;

    /// Accepts 1-16 hex digits, optionally prefixed with `0x` or `0X`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        let well_formed = !digits.is_empty()
            && digits.len() <= Self::DIGITS
            && digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(HashError::Unparsable {
                token: s.to_owned(),
            });
        }
        u64::from_str_radix(digits, 16)
            .map(HexHash)
            .map_err(|_| HashError::Unparsable {
                token: s.to_owned(),
            })
    }
}

/// A hash exactly as it appears in an input file (surrounding whitespace trimmed).
///
/// Equality via `==` is textual. Use [`HashToken::same_hash`] or compare
/// [`HashToken::key`] values when the question is "same native?".
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct HashToken(String);

impl HashToken {
    /// Wrap a token, trimming surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.len() == text.len() {
            Self(text)
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the token as a hash value.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Unparsable`] when the token is not 1-16 hex digits.
    pub fn parse(&self) -> Result<HexHash, HashError> {
        self.0.parse()
    }

    /// Lookup key: 16 upper-case digits for well-formed tokens, otherwise the
    /// upper-cased text with any `0x` prefix removed.
    pub fn key(&self) -> String {
        match self.parse() {
            Ok(hash) => hash.digits(),
            Err(_) => strip_hex_prefix(&self.0).to_ascii_uppercase(),
        }
    }

    /// Returns `true` if both tokens name the same hash.
    pub fn same_hash(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for HashToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HexHash> for HashToken {
    fn from(hash: HexHash) -> Self {
        Self(hash.to_string())
    }
}

impl From<&str> for HashToken {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_tokens() {
        let prefixed: HexHash = "0x4EDE34FBADD967A6".parse().unwrap();
        let bare: HexHash = "4ede34fbadd967a6".parse().unwrap();
        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.value(), 0x4EDE_34FB_ADD9_67A6);
    }

    #[test]
    fn short_tokens_are_zero_extended() {
        let zero: HexHash = "0".parse().unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "0x0000000000000000");
        assert_eq!("0xABC".parse::<HexHash>().unwrap().digits(), "0000000000000ABC");
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "0x", "0x4EDE34FBADD967A6FF", "0xZZZZ", "12 34", "-1"] {
            assert!(bad.parse::<HexHash>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn rendered_literal_has_fixed_width() {
        let hash = HexHash(0x1122_3344_5566_7788);
        assert_eq!(hash.to_string().len(), HexHash::LITERAL_LEN);
    }

    #[test]
    fn token_keys_ignore_case_and_prefix() {
        let a = HashToken::new(" 0xaabbccddeeff0011 ");
        let b = HashToken::new("AABBCCDDEEFF0011");
        assert_eq!(a.as_str(), "0xaabbccddeeff0011");
        assert!(a.same_hash(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn unparsable_token_still_has_a_key() {
        let token = HashToken::new("0xnot-a-hash");
        assert!(token.parse().is_err());
        assert_eq!(token.key(), "NOT-A-HASH");
    }
}
