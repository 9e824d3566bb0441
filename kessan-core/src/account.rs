//! Seller accounts and the tags that name them.
//!
//! Upload slots and embedded row markers both spell accounts as free-form tags
//! (`a_m`, `A-M`, `O_AA`, ...). They go through the same normalisation so the
//! two sources can be compared.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two managed seller identities.
///
/// Declaration order is the report order: A_M before O_AA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountId {
    #[serde(rename = "A_M")]
    Am,
    #[serde(rename = "O_AA")]
    Oaa,
}

impl AccountId {
    pub const ALL: [AccountId; 2] = [AccountId::Am, AccountId::Oaa];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountId::Am => "A_M",
            AccountId::Oaa => "O_AA",
        }
    }

    /// Parse a built-in tag. Aliases from configuration are handled by
    /// [`crate::config::EngineConfig::resolve_tag`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match normalize_tag(tag).as_str() {
            "A_M" | "AM" => Some(AccountId::Am),
            "O_AA" | "OAA" => Some(AccountId::Oaa),
            _ => None,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::from_tag(s).ok_or_else(|| format!("unknown account tag: {s}"))
    }
}

/// Uppercase, trim, and fold `-` and spaces into `_`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' | '－' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
