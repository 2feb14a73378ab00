use serde::{Deserialize, Serialize};
use std::fmt;

/// Content address of a Git object, as printed by git.
///
/// The empty string is reserved for [`Hash::ZERO`] and never names an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash(String);

impl Hash {
    pub const ZERO: Hash = Hash(String::new());

    pub fn new(s: impl Into<String>) -> Self {
        Hash(s.into())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Hash {
    fn from(s: &str) -> Self {
        Hash(s.to_string())
    }
}

impl From<String> for Hash {
    fn from(s: String) -> Self {
        Hash(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_empty() {
        assert!(Hash::ZERO.is_zero());
        assert!(Hash::default().is_zero());
        assert!(!Hash::from("abc123").is_zero());
    }

    #[test]
    fn equality_is_by_value() {
        let a = Hash::from("8ab686eafeb1f44702738c8b0f24f2567c36da6d");
        let b = Hash::new(String::from("8ab686eafeb1f44702738c8b0f24f2567c36da6d"));
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Hash::from("deadbeef")).unwrap();
        assert_eq!(json, "\"deadbeef\"");
    }
}
