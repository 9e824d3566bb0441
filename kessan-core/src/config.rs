//! Engine configuration (TOML).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::account::{AccountId, normalize_tag};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub accounts: AccountsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Data rows read per file before the rest is reported and skipped.
    pub max_rows: usize,
    /// Files above this size are rejected as a whole.
    pub max_file_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rows: 50_000,
            max_file_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountsSection {
    /// Extra slot / marker tags, e.g. `"amazon2" = "O_AA"`.
    pub aliases: BTreeMap<String, AccountId>,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve an account tag: built-in spellings first, then aliases.
    pub fn resolve_tag(&self, tag: &str) -> Option<AccountId> {
        if let Some(account) = AccountId::from_tag(tag) {
            return Some(account);
        }
        let wanted = normalize_tag(tag);
        self.accounts
            .aliases
            .iter()
            .find(|(alias, _)| normalize_tag(alias) == wanted)
            .map(|(_, account)| *account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.limits.max_rows, 50_000);
        assert_eq!(cfg.limits.max_file_bytes, 52_428_800);
    }

    #[test]
    fn test_partial_limits_keep_defaults() {
        let cfg = EngineConfig::from_toml_str("[limits]\nmax_rows = 10\n").unwrap();
        assert_eq!(cfg.limits.max_rows, 10);
        assert_eq!(cfg.limits.max_file_bytes, 52_428_800);
    }

    #[test]
    fn test_aliases() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[accounts.aliases]
"amazon2" = "O_AA"
"Main Store" = "A_M"
"#,
        )
        .unwrap();
        assert_eq!(cfg.resolve_tag("AMAZON2"), Some(AccountId::Oaa));
        assert_eq!(cfg.resolve_tag("main-store"), Some(AccountId::Am));
        assert_eq!(cfg.resolve_tag("a_m"), Some(AccountId::Am));
        assert_eq!(cfg.resolve_tag("amazon3"), None);
    }

    #[test]
    fn test_rejects_unknown_keys_and_targets() {
        assert!(EngineConfig::from_toml_str("[limits]\nmax_colums = 3\n").is_err());
        assert!(EngineConfig::from_toml_str("[accounts.aliases]\nx = \"B_B\"\n").is_err());
    }

    #[test]
    fn test_round_trip() {
        let mut cfg = EngineConfig::default();
        cfg.accounts.aliases.insert("amazon2".to_string(), AccountId::Oaa);
        let s = cfg.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&s).unwrap(), cfg);
    }
}
